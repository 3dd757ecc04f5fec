//! Operator-triggered full-catalog repricing for cost-plus products.

use sqlx::PgPool;

use makershop_core::PricingConfig;
use makershop_pricing::{compute_cost_plus, PricingInput};

use crate::CatalogError;

/// Recompute the price of every `cost_plus` product from its stored
/// attributes under the current pricing configuration.
///
/// Per-product failures are logged and skipped so one broken attribute map
/// never aborts the run. Returns the number of products repriced.
///
/// # Errors
///
/// Returns [`CatalogError::Db`] when the product listing itself fails.
pub async fn reprice_catalog(
    pool: &PgPool,
    pricing_cfg: &PricingConfig,
) -> Result<u64, CatalogError> {
    let products = makershop_db::products::list_cost_plus_products(pool).await?;
    let total = products.len();
    let mut repriced: u64 = 0;

    for product in products {
        let input = PricingInput::from_attributes(&product.attribute_map());
        let breakdown = compute_cost_plus(pricing_cfg, &input);
        if !breakdown.price_final.is_finite() || breakdown.price_final <= 0.0 {
            tracing::warn!(sku = %product.sku, "repricing produced no valid price; skipped");
            continue;
        }
        let pricing = match serde_json::to_value(&breakdown) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(sku = %product.sku, error = %e, "breakdown serialization failed");
                continue;
            }
        };

        let mut conn = pool.acquire().await?;
        match makershop_db::products::update_pricing(
            &mut *conn,
            product.id,
            breakdown.price_final,
            &pricing,
        )
        .await
        {
            Ok(()) => repriced += 1,
            Err(e) => {
                tracing::warn!(sku = %product.sku, error = %e, "reprice update failed; skipped");
            }
        }
    }

    tracing::info!(repriced, total, "catalog repricing complete");
    Ok(repriced)
}
