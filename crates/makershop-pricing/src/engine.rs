use serde::{Deserialize, Serialize};

use makershop_core::pricing_config::{PricingConfig, RoundingStrategy};

use crate::input::PricingInput;

/// Full cost/price breakdown produced by [`compute_cost_plus`].
///
/// Every intermediate value is kept for audit and display; only
/// `price_final` is consumed downstream, but the whole object is persisted
/// in the product's `pricing` column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub material_cost: f64,
    pub energy_cost: f64,
    pub machine_cost: f64,
    pub labor_cost: f64,
    pub packaging_cost: f64,
    pub shipping_cost: f64,
    pub cost_base: f64,
    pub overhead: f64,
    pub cost_total: f64,
    pub margin: f64,
    pub target_profit: f64,
    pub base_before_fees: f64,
    pub acquiring_pct: f64,
    pub marketplace_pct: f64,
    pub single_tax_pct: f64,
    pub war_tax_pct: f64,
    pub vat_pct: f64,
    pub vat_included_in_price: bool,
    pub fee_pct_total: f64,
    pub price_before_round: f64,
    pub rounding: RoundingStrategy,
    pub min_price: f64,
    pub price_final: f64,
    pub currency: String,
}

/// Compute the cost-plus price for one product.
///
/// Material selection is mass-first: grams with a per-kg rate win, volume
/// with a per-liter rate is the fallback, otherwise material cost is zero.
/// Fees are modeled as reducing net revenue, so the customer-facing price is
/// grossed up by the additive fee fraction. The result is rounded per the
/// configured strategy and floored at the configured minimum price.
#[must_use]
pub fn compute_cost_plus(config: &PricingConfig, input: &PricingInput) -> PricingBreakdown {
    let material_cost = material_cost(config, input);

    let print_hours = input.print_min / 60.0;
    let energy_cost = (config.energy.printer_power_w / 1000.0) * print_hours * config.energy.kwh_rate;
    let machine_cost = config.machine.hourly_rate * print_hours;

    let postprocess_min = input
        .postprocess_min
        .unwrap_or(config.labor.postprocess_min_default);
    let labor_cost =
        config.labor.hourly_rate * ((config.labor.prepare_min + postprocess_min) / 60.0);

    let packaging_cost = input.packaging_cost;
    let shipping_cost = if input.shipping_included {
        input.shipping_cost
    } else {
        0.0
    };

    let cost_base = material_cost + energy_cost + machine_cost + labor_cost + packaging_cost
        + shipping_cost;
    let overhead = cost_base * config.overhead.percent_of_cost;
    let cost_total = cost_base + overhead;

    let margin = input
        .margin_override
        .unwrap_or(config.profit.target_margin_pct);
    let target_profit = cost_total * margin;
    let base_before_fees = cost_total + target_profit;

    let fee_pct_total = config.fee_pct_total();
    let price_before_round = base_before_fees / (1.0 - fee_pct_total).max(0.0001);

    let rounded = apply_rounding(config.rounding.strategy, price_before_round);
    let price_final = rounded.max(config.rounding.min_price);

    PricingBreakdown {
        material_cost,
        energy_cost,
        machine_cost,
        labor_cost,
        packaging_cost,
        shipping_cost,
        cost_base,
        overhead,
        cost_total,
        margin,
        target_profit,
        base_before_fees,
        acquiring_pct: config.fees.acquiring_pct,
        marketplace_pct: config.fees.marketplace_pct,
        single_tax_pct: config.fees.single_tax_pct,
        war_tax_pct: config.fees.war_tax_pct,
        vat_pct: config.fees.vat_pct,
        vat_included_in_price: config.fees.include_vat_in_price,
        fee_pct_total,
        price_before_round,
        rounding: config.rounding.strategy,
        min_price: config.rounding.min_price,
        price_final,
        currency: config.currency.clone(),
    }
}

fn material_cost(config: &PricingConfig, input: &PricingInput) -> f64 {
    let Some(material) = input.material.as_deref() else {
        return 0.0;
    };
    if input.material_g > 0.0 {
        if let Some(per_kg) = config.per_kg_rate(material) {
            return (input.material_g / 1000.0) * per_kg;
        }
    }
    if input.material_ml > 0.0 {
        if let Some(per_liter) = config.per_liter_rate(material) {
            return (input.material_ml / 1000.0) * per_liter;
        }
    }
    0.0
}

/// Apply a rounding strategy to a pre-rounding price.
#[must_use]
pub fn apply_rounding(strategy: RoundingStrategy, value: f64) -> f64 {
    match strategy {
        RoundingStrategy::None => (value * 100.0).round() / 100.0,
        RoundingStrategy::Up1 => value.ceil(),
        RoundingStrategy::Up5 => (value / 5.0).ceil() * 5.0,
        RoundingStrategy::Nearest9 => {
            let whole = value.ceil();
            // Exact multiples of 10 become ...9 endings; 190 -> 189, 188 stays.
            if whole % 10.0 == 0.0 {
                whole - 1.0
            } else {
                whole
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
