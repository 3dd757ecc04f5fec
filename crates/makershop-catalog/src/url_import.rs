//! Direct single-product import from a URL submission.
//!
//! Bypasses the staging table: the payload is validated, merged with any
//! existing product for the same SKU, and upserted in one transaction.

use serde_json::Value;
use sqlx::PgPool;

use makershop_core::links::{classify_image_link, classify_model_link};
use makershop_core::{merge_attributes, parse_flexible_number, ImportUrlJob, MediaJob, PricingConfig};
use makershop_db::products::PricingMethod;
use makershop_db::ProductUpsert;
use makershop_pricing::{compute_cost_plus, PricingInput};

use crate::{CatalogError, MediaQueue};

/// Result of a URL import, echoed back to the submitting job.
#[derive(Debug)]
pub struct UrlImportResult {
    pub product_id: i64,
    pub image_url: Option<String>,
    pub model_url: Option<String>,
}

/// Upsert a single product from a URL submission and enqueue its media sync.
///
/// The SKU comes from the payload or, failing that, is derived from the
/// source URL's file name. Attributes are merged union-style with any
/// existing product so a partial submission never clobbers curated data.
///
/// # Errors
///
/// Returns [`CatalogError::NoSku`] when no SKU can be derived,
/// [`CatalogError::InvalidPrice`] for a supplied price that is not a
/// positive number, or [`CatalogError::Db`] on database failures.
pub async fn upsert_from_url(
    pool: &PgPool,
    pricing_cfg: &PricingConfig,
    queue: &MediaQueue,
    job: &ImportUrlJob,
) -> Result<UrlImportResult, CatalogError> {
    let sku = job
        .sku
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| sku_from_source_url(&job.source_url))
        .ok_or_else(|| CatalogError::NoSku(job.source_url.clone()))?;

    let image_url = job.image_url.as_deref().and_then(classify_image_link);
    let model_url = job
        .model_url
        .as_deref()
        .and_then(classify_model_link)
        .or_else(|| classify_model_link(&job.source_url));

    let mut incoming = job.attributes.clone();
    incoming.insert(
        "source_url".to_string(),
        Value::String(job.source_url.clone()),
    );
    let existing = {
        let mut conn = pool.acquire().await?;
        makershop_db::products::get_product_by_sku(&mut *conn, &sku).await?
    };
    let attributes = match existing {
        Some(existing) => merge_attributes(&existing.attribute_map(), &incoming),
        None => incoming,
    };

    let supplied_price = job
        .price
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let (pricing_method, price, pricing) = match supplied_price {
        Some(raw) => match parse_flexible_number(raw) {
            Some(p) if p > 0.0 && p.is_finite() => (PricingMethod::Manual, Some(p), None),
            _ => {
                return Err(CatalogError::InvalidPrice {
                    raw: raw.to_string(),
                    reason: "must be a positive number".to_string(),
                })
            }
        },
        None => {
            let input = PricingInput::from_attributes(&attributes);
            let breakdown = compute_cost_plus(pricing_cfg, &input);
            let price = (breakdown.price_final.is_finite() && breakdown.price_final > 0.0)
                .then_some(breakdown.price_final);
            let pricing = serde_json::to_value(&breakdown)
                .map_err(|e| CatalogError::InvalidPrice {
                    raw: String::new(),
                    reason: e.to_string(),
                })?;
            (PricingMethod::CostPlus, price, Some(pricing))
        }
    };

    let slugs: Vec<String> = job
        .categories
        .as_deref()
        .unwrap_or_default()
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let categories = makershop_db::categories::ensure_categories(pool, &slugs).await?;

    let upsert = ProductUpsert {
        sku: sku.clone(),
        name: job
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&sku)
            .to_string(),
        description: None,
        price,
        fallback_price: pricing_cfg.rounding.min_price,
        currency: job.currency.clone(),
        default_currency: pricing_cfg.currency.clone(),
        stock: job.stock,
        image_url: image_url.clone(),
        model_url: model_url.clone(),
        attributes,
        pricing_method,
        pricing,
    };

    let mut tx = pool.begin().await?;
    let product_id = makershop_db::products::upsert_product(&mut *tx, &upsert).await?;
    for category in &categories {
        makershop_db::categories::link_product_category(&mut *tx, product_id, category.id)
            .await?;
    }
    tx.commit().await?;

    queue.enqueue(MediaJob {
        sku: sku.clone(),
        prefer_url: image_url.clone(),
    })?;

    tracing::info!(%sku, product_id, "url import upserted");
    Ok(UrlImportResult {
        product_id,
        image_url,
        model_url,
    })
}

/// Derive a SKU from the source URL's file name, e.g.
/// `https://maker.example/parts/dragon_v2.stl` → `DRAGON-V2`.
fn sku_from_source_url(source_url: &str) -> Option<String> {
    let without_fragment = source_url.split(['#', '?']).next().unwrap_or(source_url);
    let after_scheme = without_fragment
        .split_once("://")
        .map_or(without_fragment, |(_, rest)| rest);
    // Host-only URLs carry no usable file name.
    let (_, path) = after_scheme.split_once('/')?;
    let last_segment = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    let stem = last_segment
        .rsplit_once('.')
        .map_or(last_segment, |(stem, _)| stem);
    let sku: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '-'
            }
        })
        .collect();
    let sku = sku.trim_matches('-').to_string();
    (!sku.is_empty()).then_some(sku)
}

#[cfg(test)]
mod tests {
    use super::sku_from_source_url;

    #[test]
    fn sku_derived_from_file_stem() {
        assert_eq!(
            sku_from_source_url("https://maker.example/parts/dragon_v2.stl"),
            Some("DRAGON-V2".to_string())
        );
        assert_eq!(
            sku_from_source_url("https://maker.example/parts/Benchy.3mf?dl=1"),
            Some("BENCHY".to_string())
        );
    }

    #[test]
    fn trailing_slash_and_empty_paths_yield_none() {
        assert_eq!(
            sku_from_source_url("https://maker.example/parts/widget/"),
            Some("WIDGET".to_string())
        );
        assert_eq!(sku_from_source_url("https://maker.example"), None);
        assert_eq!(sku_from_source_url(""), None);
    }
}
