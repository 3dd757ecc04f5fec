//! Batch merge: staging rows → canonical products.

use std::collections::{HashMap, HashSet};

use sqlx::{Acquire, PgPool, Postgres, Transaction};

use makershop_core::{
    parse_flexible_number, AppConfig, MediaJob, PricingConfig, RowError, StagingRow,
};
use makershop_db::products::PricingMethod;
use makershop_db::ProductUpsert;
use makershop_pricing::{compute_cost_plus, PricingInput};

use crate::{CatalogError, MediaQueue, ReportSink};

/// Outcome of one `merge_batch` run.
#[derive(Debug)]
pub struct MergeReport {
    pub upserted: u64,
    pub errors: usize,
    /// Location of the CSV error report, when any row was rejected.
    pub report_location: Option<String>,
}

/// A staging row that passed classification and is ready to upsert.
#[derive(Debug)]
struct PlannedRow {
    upsert: ProductUpsert,
    media_hint: Option<String>,
    category_slugs: Vec<String>,
}

/// Classify one staging row: manual price, cost-plus computation, or reject.
///
/// An empty price field selects cost-plus pricing; a parsable positive price
/// is taken as manual; anything else rejects the row with a reason for the
/// error report.
fn plan_row(pricing_cfg: &PricingConfig, row: &StagingRow) -> Result<PlannedRow, String> {
    if row.sku.trim().is_empty() {
        return Err("missing sku".to_string());
    }

    let raw_price = row.price.trim();
    let (pricing_method, price, pricing) = if raw_price.is_empty() {
        let input = PricingInput::from_attributes(&row.attributes);
        let breakdown = compute_cost_plus(pricing_cfg, &input);
        // Guard against a breakdown gone non-finite; the SQL fallback then
        // keeps the stored price (or substitutes the minimum on insert).
        let price = (breakdown.price_final.is_finite() && breakdown.price_final > 0.0)
            .then_some(breakdown.price_final);
        let pricing = serde_json::to_value(&breakdown).map_err(|e| e.to_string())?;
        (PricingMethod::CostPlus, price, Some(pricing))
    } else {
        match parse_flexible_number(raw_price) {
            Some(p) if p > 0.0 && p.is_finite() => (PricingMethod::Manual, Some(p), None),
            Some(p) => return Err(format!("price must be positive, got {p}")),
            None => return Err(format!("unparsable price {raw_price:?}")),
        }
    };

    Ok(PlannedRow {
        upsert: ProductUpsert {
            sku: row.sku.clone(),
            name: if row.name.trim().is_empty() {
                row.sku.clone()
            } else {
                row.name.clone()
            },
            description: row.description.clone(),
            price,
            fallback_price: pricing_cfg.rounding.min_price,
            currency: row.currency.clone(),
            default_currency: pricing_cfg.currency.clone(),
            stock: row.stock,
            image_url: row.image_url.clone(),
            model_url: row.model_url.clone(),
            attributes: row.attributes.clone(),
            pricing_method,
            pricing,
        },
        media_hint: row.image_url.clone(),
        category_slugs: row.category_slugs(),
    })
}

/// Merge every staging row of a batch into the canonical catalog.
///
/// Rows are processed in fixed-size chunks, one transaction per chunk, with
/// a savepoint around each row so a single bad row never aborts its chunk.
/// Re-running the merge for the same batch re-upserts identical results.
/// `carried_errors` (from the ingest stage) are folded into the single CSV
/// error report.
///
/// # Errors
///
/// Returns [`CatalogError`] on resource-level failures (database, report
/// store); row-level data problems are collected, never propagated.
pub async fn merge_batch(
    pool: &PgPool,
    app: &AppConfig,
    pricing_cfg: &PricingConfig,
    queue: &MediaQueue,
    reports: &dyn ReportSink,
    batch_id: &str,
    carried_errors: Vec<RowError>,
) -> Result<MergeReport, CatalogError> {
    let records = makershop_db::staging::fetch_staging_rows(pool, batch_id).await?;
    let rows: Vec<StagingRow> = records
        .into_iter()
        .map(makershop_db::StagingRecord::into_staging_row)
        .collect();

    // All referenced categories are created up front; per-row processing
    // only consults this map.
    let slugs: Vec<String> = rows
        .iter()
        .flat_map(StagingRow::category_slugs)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let category_ids: HashMap<String, i64> =
        makershop_db::categories::ensure_categories(pool, &slugs)
            .await?
            .into_iter()
            .map(|c| (c.slug, c.id))
            .collect();

    let mut errors = carried_errors;
    let mut upserted: u64 = 0;
    let total = rows.len();
    let mut processed = 0usize;

    for chunk in rows.chunks(app.merge_chunk_size.max(1)) {
        let mut tx = pool.begin().await?;
        let mut chunk_jobs: Vec<MediaJob> = Vec::with_capacity(chunk.len());

        for row in chunk {
            processed += 1;
            let planned = match plan_row(pricing_cfg, row) {
                Ok(planned) => planned,
                Err(reason) => {
                    tracing::warn!(batch = %batch_id, sku = %row.sku, %reason, "row rejected");
                    errors.push(row_error(row, reason));
                    continue;
                }
            };

            match merge_one(&mut tx, &planned, &category_ids).await {
                Ok(_id) => {
                    upserted += 1;
                    chunk_jobs.push(MediaJob {
                        sku: planned.upsert.sku.clone(),
                        prefer_url: planned.media_hint.clone(),
                    });
                }
                Err(e) => {
                    tracing::warn!(batch = %batch_id, sku = %row.sku, error = %e, "row merge failed");
                    errors.push(row_error(row, e.to_string()));
                }
            }
        }

        tx.commit().await?;

        // Enqueue only after the chunk is durable; the sync is idempotent,
        // so retried merges at worst re-enqueue the same SKUs.
        for job in chunk_jobs {
            queue.enqueue(job)?;
        }

        #[allow(clippy::cast_precision_loss)]
        let progress_pct = if total == 0 {
            100.0
        } else {
            processed as f64 / total as f64 * 100.0
        };
        tracing::info!(batch = %batch_id, processed, total, progress_pct, "merge progress");
    }

    let report_location = if errors.is_empty() {
        None
    } else {
        let key = format!("import-errors-{batch_id}.csv");
        Some(reports.put_csv(&key, &errors)?)
    };

    makershop_db::products::refresh_search_view(pool).await;

    tracing::info!(
        batch = %batch_id,
        upserted,
        errors = errors.len(),
        "merge complete"
    );
    Ok(MergeReport {
        upserted,
        errors: errors.len(),
        report_location,
    })
}

/// Upsert one planned row and its category links under a savepoint.
async fn merge_one(
    tx: &mut Transaction<'_, Postgres>,
    planned: &PlannedRow,
    category_ids: &HashMap<String, i64>,
) -> Result<i64, CatalogError> {
    let mut sp = tx.begin().await?;
    let product_id = makershop_db::products::upsert_product(&mut *sp, &planned.upsert).await?;
    for slug in &planned.category_slugs {
        // Unresolved slugs are a catalog omission, not a row failure.
        if let Some(category_id) = category_ids.get(slug) {
            makershop_db::categories::link_product_category(&mut *sp, product_id, *category_id)
                .await?;
        } else {
            tracing::debug!(sku = %planned.upsert.sku, %slug, "unknown category slug skipped");
        }
    }
    sp.commit().await?;
    Ok(product_id)
}

fn row_error(row: &StagingRow, reason: String) -> RowError {
    RowError {
        line: 0,
        sku: row.sku.clone(),
        reason,
        raw: format!(
            "sku={};name={};price={}",
            row.sku, row.name, row.price
        ),
    }
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
