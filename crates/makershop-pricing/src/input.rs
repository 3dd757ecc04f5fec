use serde::{Deserialize, Serialize};

use makershop_core::attrs::{attr_bool, attr_f64, attr_str, AttributeMap};

/// Per-product cost drivers, derived once per merge pass from staging
/// attributes (imports) or stored product attributes (repricing).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingInput {
    /// Material type matched against the config's material rate keys,
    /// e.g. `"PLA"`.
    pub material: Option<String>,
    /// Material mass in grams. Takes precedence over volume when a per-kg
    /// rate exists for the material type.
    pub material_g: f64,
    /// Material volume in milliliters, used when mass pricing is unavailable.
    pub material_ml: f64,
    /// Printing time in minutes.
    pub print_min: f64,
    /// Post-processing minutes; falls back to the configured default.
    pub postprocess_min: Option<f64>,
    pub packaging_cost: f64,
    pub shipping_cost: f64,
    /// Shipping cost enters the cost base only when the product explicitly
    /// bundles shipping into its price.
    pub shipping_included: bool,
    /// Per-product fractional margin override; config default otherwise.
    pub margin_override: Option<f64>,
}

impl PricingInput {
    /// Derive cost drivers from a product/staging attribute map.
    ///
    /// Recognized keys: `material`, `material_g`, `material_ml`,
    /// `print_time_min`, `postprocess_min`, `packaging_cost`,
    /// `shipping_cost`, `shipping_included`, `margin_override`. Missing or
    /// malformed numeric values degrade to zero/absent, never error.
    #[must_use]
    pub fn from_attributes(attrs: &AttributeMap) -> Self {
        Self {
            material: attr_str(attrs, "material").map(str::to_string),
            material_g: attr_f64(attrs, "material_g").unwrap_or(0.0),
            material_ml: attr_f64(attrs, "material_ml").unwrap_or(0.0),
            print_min: attr_f64(attrs, "print_time_min").unwrap_or(0.0),
            postprocess_min: attr_f64(attrs, "postprocess_min"),
            packaging_cost: attr_f64(attrs, "packaging_cost").unwrap_or(0.0),
            shipping_cost: attr_f64(attrs, "shipping_cost").unwrap_or(0.0),
            shipping_included: attr_bool(attrs, "shipping_included"),
            margin_override: attr_f64(attrs, "margin_override"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_attributes_reads_all_recognized_keys() {
        let attrs = json!({
            "material": "pla",
            "material_g": "50",
            "print_time_min": 120,
            "postprocess_min": "20",
            "packaging_cost": "15,5",
            "shipping_cost": 60,
            "shipping_included": "yes",
            "margin_override": 0.4
        });
        let input = PricingInput::from_attributes(attrs.as_object().unwrap());
        assert_eq!(input.material.as_deref(), Some("pla"));
        assert_eq!(input.material_g, 50.0);
        assert_eq!(input.material_ml, 0.0);
        assert_eq!(input.print_min, 120.0);
        assert_eq!(input.postprocess_min, Some(20.0));
        assert_eq!(input.packaging_cost, 15.5);
        assert_eq!(input.shipping_cost, 60.0);
        assert!(input.shipping_included);
        assert_eq!(input.margin_override, Some(0.4));
    }

    #[test]
    fn from_attributes_degrades_malformed_values_to_defaults() {
        let attrs = json!({"material_g": "lots", "print_time_min": null});
        let input = PricingInput::from_attributes(attrs.as_object().unwrap());
        assert_eq!(input.material_g, 0.0);
        assert_eq!(input.print_min, 0.0);
        assert!(input.postprocess_min.is_none());
        assert!(!input.shipping_included);
    }
}
