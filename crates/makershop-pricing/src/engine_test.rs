use super::*;

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

fn config() -> PricingConfig {
    serde_yaml::from_str(SAMPLE_YAML).unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn rounding_none_rounds_to_two_decimals() {
    assert_close(apply_rounding(RoundingStrategy::None, 12.345), 12.35);
    assert_close(apply_rounding(RoundingStrategy::None, 12.344), 12.34);
}

#[test]
fn rounding_up_1_is_ceiling() {
    assert_close(apply_rounding(RoundingStrategy::Up1, 12.01), 13.0);
    assert_close(apply_rounding(RoundingStrategy::Up1, 13.0), 13.0);
}

#[test]
fn rounding_up_5_is_ceiling_to_multiple_of_5() {
    assert_close(apply_rounding(RoundingStrategy::Up5, 46.2), 50.0);
    assert_close(apply_rounding(RoundingStrategy::Up5, 50.0), 50.0);
    assert_close(apply_rounding(RoundingStrategy::Up5, 51.0), 55.0);
}

#[test]
fn rounding_nearest_9_avoids_round_numbers() {
    // 187.3 ceils to 188, which is not a multiple of 10 and stays.
    assert_close(apply_rounding(RoundingStrategy::Nearest9, 187.3), 188.0);
    // 190 is an exact multiple of 10 and is pulled down to 189.
    assert_close(apply_rounding(RoundingStrategy::Nearest9, 190.0), 189.0);
    assert_close(apply_rounding(RoundingStrategy::Nearest9, 189.2), 189.0);
    // 99.5 ceils to 100, a multiple of 10, and lands on 99.
    assert_close(apply_rounding(RoundingStrategy::Nearest9, 99.5), 99.0);
}

#[test]
fn worked_example_mass_based_pla() {
    let input = PricingInput {
        material: Some("PLA".to_string()),
        material_g: 50.0,
        print_min: 120.0,
        ..PricingInput::default()
    };
    let b = compute_cost_plus(&config(), &input);

    assert_close(b.material_cost, 32.5); // 50g at 650/kg
    assert_close(b.energy_cost, 5.25); // 0.35 kW * 2h * 7.5
    assert_close(b.machine_cost, 60.0); // 30/h * 2h
    assert_close(b.labor_cost, 250.0 * 25.0 / 60.0); // prepare 10 + default 15
    assert_close(b.cost_base, 32.5 + 5.25 + 60.0 + 250.0 * 25.0 / 60.0);
    assert_close(b.overhead, b.cost_base * 0.10);
    assert_close(b.cost_total, b.cost_base + b.overhead);
    assert_close(b.target_profit, b.cost_total * 0.30);
    assert_close(b.base_before_fees, b.cost_total + b.target_profit);
    assert_close(b.fee_pct_total, 0.128);
    assert_close(b.price_before_round, b.base_before_fees / 0.872);
    assert_close(b.price_final, 332.0);
    assert_eq!(b.currency, "UAH");
}

#[test]
fn volume_pricing_is_fallback_when_no_kg_rate() {
    let input = PricingInput {
        material: Some("resin".to_string()),
        material_g: 80.0, // no RESIN_kg rate configured
        material_ml: 100.0,
        ..PricingInput::default()
    };
    let b = compute_cost_plus(&config(), &input);
    assert_close(b.material_cost, 180.0); // 100 ml at 1800/L
}

#[test]
fn mass_wins_over_volume_when_kg_rate_exists() {
    let input = PricingInput {
        material: Some("PLA".to_string()),
        material_g: 100.0,
        material_ml: 500.0,
        ..PricingInput::default()
    };
    let b = compute_cost_plus(&config(), &input);
    assert_close(b.material_cost, 65.0);
}

#[test]
fn unknown_material_costs_nothing() {
    let input = PricingInput {
        material: Some("UNOBTAINIUM".to_string()),
        material_g: 100.0,
        material_ml: 100.0,
        ..PricingInput::default()
    };
    let b = compute_cost_plus(&config(), &input);
    assert_close(b.material_cost, 0.0);
}

#[test]
fn postprocess_override_replaces_default() {
    let input = PricingInput {
        postprocess_min: Some(45.0),
        ..PricingInput::default()
    };
    let b = compute_cost_plus(&config(), &input);
    assert_close(b.labor_cost, 250.0 * 55.0 / 60.0);
}

#[test]
fn shipping_only_included_when_flagged() {
    let base = PricingInput {
        shipping_cost: 70.0,
        ..PricingInput::default()
    };
    let excluded = compute_cost_plus(&config(), &base);
    assert_close(excluded.shipping_cost, 0.0);

    let included = compute_cost_plus(
        &config(),
        &PricingInput {
            shipping_included: true,
            ..base
        },
    );
    assert_close(included.shipping_cost, 70.0);
    assert_close(included.cost_base - excluded.cost_base, 70.0);
}

#[test]
fn margin_override_beats_config_default() {
    let input = PricingInput {
        margin_override: Some(0.5),
        ..PricingInput::default()
    };
    let b = compute_cost_plus(&config(), &input);
    assert_close(b.margin, 0.5);
    assert_close(b.target_profit, b.cost_total * 0.5);
}

#[test]
fn vat_joins_fee_total_only_when_included() {
    let mut cfg = config();
    cfg.fees.include_vat_in_price = true;
    let b = compute_cost_plus(&cfg, &PricingInput::default());
    assert_close(b.fee_pct_total, 0.328);
    assert!(b.vat_included_in_price);
}

#[test]
fn final_price_is_floored_at_min_price() {
    let mut cfg = config();
    cfg.rounding.min_price = 500.0;
    let b = compute_cost_plus(&cfg, &PricingInput::default());
    assert!(b.price_before_round < 500.0);
    assert_close(b.price_final, 500.0);
}

#[test]
fn fee_total_of_one_clamps_the_denominator() {
    let mut cfg = config();
    cfg.fees.acquiring_pct = 0.5;
    cfg.fees.marketplace_pct = 0.5;
    cfg.fees.single_tax_pct = 0.0;
    cfg.fees.war_tax_pct = 0.0;
    let input = PricingInput {
        packaging_cost: 10.0,
        ..PricingInput::default()
    };
    let b = compute_cost_plus(&cfg, &input);
    assert_close(b.price_before_round, b.base_before_fees / 0.0001);
}

#[test]
fn breakdown_survives_json_round_trip() {
    let b = compute_cost_plus(
        &config(),
        &PricingInput {
            material: Some("PLA".to_string()),
            material_g: 50.0,
            print_min: 120.0,
            ..PricingInput::default()
        },
    );
    let json = serde_json::to_string(&b).unwrap();
    let back: PricingBreakdown = serde_json::from_str(&json).unwrap();
    assert_close(back.price_final, b.price_final);
    assert_eq!(back.rounding, RoundingStrategy::Nearest9);
}
