//! Cost-plus pricing configuration, loaded from a YAML document.
//!
//! The document is consumed, never produced, by the pipeline. It is loaded
//! once at process bootstrap and passed explicitly into the pricing engine —
//! there is no module-level global.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// ISO 4217 code applied to computed prices, e.g. `"UAH"`.
    pub currency: String,
    pub energy: EnergyConfig,
    pub labor: LaborConfig,
    pub machine: MachineConfig,
    /// Material rates keyed `<TYPE>_kg` (price per kilogram) or `<TYPE>_L`
    /// (price per liter), e.g. `PLA_kg: 650` or `RESIN_L: 1800`.
    #[serde(default)]
    pub materials: BTreeMap<String, f64>,
    pub overhead: OverheadConfig,
    pub profit: ProfitConfig,
    pub fees: FeesConfig,
    pub rounding: RoundingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyConfig {
    pub kwh_rate: f64,
    pub printer_power_w: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborConfig {
    pub hourly_rate: f64,
    /// Fixed preparation minutes charged on every product.
    pub prepare_min: f64,
    /// Post-processing minutes used when the product does not override them.
    pub postprocess_min_default: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MachineConfig {
    /// Depreciation rate per printing hour.
    pub hourly_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverheadConfig {
    /// Fractional overhead applied to the summed cost base, e.g. `0.10`.
    pub percent_of_cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitConfig {
    /// Default fractional margin, e.g. `0.30`. Per-product overrides win.
    pub target_margin_pct: f64,
}

/// Fee rates, all fractional. Fees reduce net revenue, so the sticker price
/// is grossed up by their additive total (see the pricing engine).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeesConfig {
    pub acquiring_pct: f64,
    pub marketplace_pct: f64,
    pub single_tax_pct: f64,
    pub war_tax_pct: f64,
    pub vat_pct: f64,
    /// When `true`, VAT participates in the gross-up; otherwise the sticker
    /// price is VAT-exclusive and `vat_pct` is informational only.
    pub include_vat_in_price: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundingConfig {
    pub strategy: RoundingStrategy,
    /// Floor applied to every computed price.
    pub min_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingStrategy {
    /// Round to 2 decimals.
    None,
    /// Ceiling to the next whole unit.
    #[serde(rename = "up_1")]
    Up1,
    /// Ceiling to the next multiple of 5.
    #[serde(rename = "up_5")]
    Up5,
    /// Ceiling to a whole unit, then pull exact multiples of 10 down by 1
    /// so prices end in 9 rather than a round number.
    #[serde(rename = "nearest_9")]
    Nearest9,
}

impl PricingConfig {
    /// Per-kilogram rate for a material type, if configured.
    ///
    /// The lookup key is `<TYPE>_kg` with the type uppercased, so staging
    /// values like `pla` and `PLA` resolve identically.
    #[must_use]
    pub fn per_kg_rate(&self, material: &str) -> Option<f64> {
        self.materials
            .get(&format!("{}_kg", material.trim().to_uppercase()))
            .copied()
    }

    /// Per-liter rate for a material type, if configured (`<TYPE>_L`).
    #[must_use]
    pub fn per_liter_rate(&self, material: &str) -> Option<f64> {
        self.materials
            .get(&format!("{}_L", material.trim().to_uppercase()))
            .copied()
    }

    /// Additive fee fraction applied in the price gross-up.
    #[must_use]
    pub fn fee_pct_total(&self) -> f64 {
        let f = &self.fees;
        let mut total = f.acquiring_pct + f.marketplace_pct + f.single_tax_pct + f.war_tax_pct;
        if f.include_vat_in_price {
            total += f.vat_pct;
        }
        total
    }
}

/// Load and validate the pricing configuration document.
///
/// # Errors
///
/// Returns [`ConfigError::PricingFileIo`] if the file cannot be read,
/// [`ConfigError::PricingFileParse`] if it is not valid YAML for the schema,
/// or [`ConfigError::Validation`] if values are out of range.
pub fn load_pricing_config(path: &Path) -> Result<PricingConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PricingFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    let config: PricingConfig =
        serde_yaml::from_str(&content).map_err(|e| ConfigError::PricingFileParse {
            path: path.display().to_string(),
            source: e,
        })?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &PricingConfig) -> Result<(), ConfigError> {
    let non_negative = [
        ("energy.kwh_rate", config.energy.kwh_rate),
        ("energy.printer_power_w", config.energy.printer_power_w),
        ("labor.hourly_rate", config.labor.hourly_rate),
        ("labor.prepare_min", config.labor.prepare_min),
        (
            "labor.postprocess_min_default",
            config.labor.postprocess_min_default,
        ),
        ("machine.hourly_rate", config.machine.hourly_rate),
        ("rounding.min_price", config.rounding.min_price),
    ];
    for (name, value) in non_negative {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::Validation(format!(
                "{name} must be a non-negative number, got {value}"
            )));
        }
    }

    for (key, value) in &config.materials {
        if !value.is_finite() || *value < 0.0 {
            return Err(ConfigError::Validation(format!(
                "materials.{key} must be a non-negative number, got {value}"
            )));
        }
    }

    let fractions = [
        ("overhead.percent_of_cost", config.overhead.percent_of_cost),
        ("profit.target_margin_pct", config.profit.target_margin_pct),
        ("fees.acquiring_pct", config.fees.acquiring_pct),
        ("fees.marketplace_pct", config.fees.marketplace_pct),
        ("fees.single_tax_pct", config.fees.single_tax_pct),
        ("fees.war_tax_pct", config.fees.war_tax_pct),
        ("fees.vat_pct", config.fees.vat_pct),
    ];
    for (name, value) in fractions {
        if !value.is_finite() || !(0.0..1.0).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{name} must be a fraction in [0, 1), got {value}"
            )));
        }
    }

    if config.fee_pct_total() >= 1.0 {
        return Err(ConfigError::Validation(format!(
            "total fee fraction {} leaves no net revenue",
            config.fee_pct_total()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_YAML: &str = r"
currency: UAH
energy:
  kwh_rate: 7.5
  printer_power_w: 350
labor:
  hourly_rate: 250
  prepare_min: 10
  postprocess_min_default: 15
machine:
  hourly_rate: 30
materials:
  PLA_kg: 650
  PETG_kg: 720
  RESIN_L: 1800
overhead:
  percent_of_cost: 0.10
profit:
  target_margin_pct: 0.30
fees:
  acquiring_pct: 0.018
  marketplace_pct: 0.05
  single_tax_pct: 0.05
  war_tax_pct: 0.01
  vat_pct: 0.20
  include_vat_in_price: false
rounding:
  strategy: nearest_9
  min_price: 50
";

    fn sample() -> PricingConfig {
        serde_yaml::from_str(SAMPLE_YAML).unwrap()
    }

    #[test]
    fn parses_sample_document() {
        let config = sample();
        assert_eq!(config.currency, "UAH");
        assert_eq!(config.rounding.strategy, RoundingStrategy::Nearest9);
        assert_eq!(config.per_kg_rate("pla"), Some(650.0));
        assert_eq!(config.per_kg_rate("PLA"), Some(650.0));
        assert_eq!(config.per_liter_rate("resin"), Some(1800.0));
        assert_eq!(config.per_kg_rate("resin"), None);
    }

    #[test]
    fn fee_total_excludes_vat_unless_included() {
        let mut config = sample();
        let without_vat = config.fee_pct_total();
        assert!((without_vat - 0.128).abs() < 1e-12);
        config.fees.include_vat_in_price = true;
        assert!((config.fee_pct_total() - 0.328).abs() < 1e-12);
    }

    #[test]
    fn validate_accepts_sample() {
        assert!(validate(&sample()).is_ok());
    }

    #[test]
    fn validate_rejects_negative_material_rate() {
        let mut config = sample();
        config.materials.insert("ABS_kg".to_string(), -1.0);
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("ABS_kg")));
    }

    #[test]
    fn validate_rejects_fee_fraction_of_one_or_more() {
        let mut config = sample();
        config.fees.marketplace_pct = 1.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn validate_rejects_confiscatory_fee_total() {
        let mut config = sample();
        config.fees.include_vat_in_price = true;
        config.fees.vat_pct = 0.5;
        config.fees.marketplace_pct = 0.45;
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("net revenue")));
    }

    #[test]
    fn load_from_file_round_trips() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_YAML.as_bytes()).unwrap();
        let config = load_pricing_config(file.path()).unwrap();
        assert_eq!(config.currency, "UAH");
    }

    #[test]
    fn rounding_strategy_names_are_snake_case() {
        for (raw, expected) in [
            ("none", RoundingStrategy::None),
            ("up_1", RoundingStrategy::Up1),
            ("up_5", RoundingStrategy::Up5),
            ("nearest_9", RoundingStrategy::Nearest9),
        ] {
            let parsed: RoundingStrategy = serde_yaml::from_str(raw).unwrap();
            assert_eq!(parsed, expected);
        }
    }
}
