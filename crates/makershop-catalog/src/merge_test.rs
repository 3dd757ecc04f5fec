use super::*;

use makershop_core::StagingRow;
use serde_json::json;

const UP5_CONFIG: &str = r"
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
  strategy: up_5
  min_price: 50
";

fn config() -> PricingConfig {
    serde_yaml::from_str(UP5_CONFIG).unwrap()
}

fn row(sku: &str, price: &str) -> StagingRow {
    StagingRow {
        sku: sku.to_string(),
        name: format!("{sku} name"),
        price: price.to_string(),
        ..StagingRow::default()
    }
}

#[test]
fn supplied_price_is_manual() {
    let planned = plan_row(&config(), &row("B", "49.99")).unwrap();
    assert_eq!(planned.upsert.pricing_method, PricingMethod::Manual);
    assert_eq!(planned.upsert.price, Some(49.99));
    assert!(planned.upsert.pricing.is_none());
}

#[test]
fn empty_price_computes_cost_plus() {
    let mut staged = row("A", "");
    staged.attributes = json!({
        "material": "PLA",
        "material_g": "50",
        "print_time_min": "120"
    })
    .as_object()
    .unwrap()
    .clone();

    let planned = plan_row(&config(), &staged).unwrap();
    assert_eq!(planned.upsert.pricing_method, PricingMethod::CostPlus);
    let price = planned.upsert.price.unwrap();
    // up_5 strategy: price is a positive multiple of 5.
    assert!(price > 0.0);
    assert!((price % 5.0).abs() < 1e-9);
    // The full breakdown is persisted as an audit trail.
    let pricing = planned.upsert.pricing.unwrap();
    assert!(pricing["material_cost"].as_f64().unwrap() > 0.0);
    assert_eq!(pricing["price_final"].as_f64().unwrap(), price);
}

#[test]
fn unparsable_price_rejects_the_row() {
    let err = plan_row(&config(), &row("INVALID", "abc")).unwrap_err();
    assert!(err.contains("unparsable price"));
}

#[test]
fn non_positive_price_rejects_the_row() {
    let err = plan_row(&config(), &row("Z", "0")).unwrap_err();
    assert!(err.contains("positive"));
    let err = plan_row(&config(), &row("Z", "-5")).unwrap_err();
    assert!(err.contains("positive"));
}

#[test]
fn zero_cost_breakdown_never_binds_a_price() {
    // All cost drivers zeroed: the breakdown comes out at 0.0, which must
    // not be written. A `None` price leaves the stored value in place via
    // the upsert's SQL fallback instead of zeroing a live product.
    let mut cfg = config();
    cfg.labor.hourly_rate = 0.0;
    cfg.rounding.min_price = 0.0;

    let planned = plan_row(&cfg, &row("A", "")).unwrap();
    assert_eq!(planned.upsert.pricing_method, PricingMethod::CostPlus);
    assert_eq!(planned.upsert.price, None);
    // The breakdown is still persisted as the audit trail.
    let pricing = planned.upsert.pricing.unwrap();
    assert_eq!(pricing["price_final"].as_f64(), Some(0.0));
}

#[test]
fn fallback_price_is_the_configured_minimum() {
    let planned = plan_row(&config(), &row("A", "")).unwrap();
    assert!((planned.upsert.fallback_price - 50.0).abs() < 1e-9);

    let mut cfg = config();
    cfg.rounding.min_price = 120.0;
    let planned = plan_row(&cfg, &row("A", "")).unwrap();
    assert!((planned.upsert.fallback_price - 120.0).abs() < 1e-9);
}

#[test]
fn missing_sku_rejects_the_row() {
    let err = plan_row(&config(), &row("  ", "10")).unwrap_err();
    assert_eq!(err, "missing sku");
}

#[test]
fn comma_decimal_price_is_accepted_as_manual() {
    let planned = plan_row(&config(), &row("C", "49,99")).unwrap();
    assert_eq!(planned.upsert.price, Some(49.99));
}

#[test]
fn planned_row_carries_media_hint_and_categories() {
    let mut staged = row("D", "10");
    staged.image_url = Some("https://cdn.test/d.jpg".to_string());
    staged.categories = Some("figurines|fantasy".to_string());
    let planned = plan_row(&config(), &staged).unwrap();
    assert_eq!(planned.media_hint.as_deref(), Some("https://cdn.test/d.jpg"));
    assert_eq!(planned.category_slugs, vec!["figurines", "fantasy"]);
}

#[test]
fn currency_defaults_flow_from_config() {
    let planned = plan_row(&config(), &row("E", "10")).unwrap();
    assert_eq!(planned.upsert.default_currency, "UAH");
    assert!((planned.upsert.fallback_price - 50.0).abs() < 1e-9);
}
