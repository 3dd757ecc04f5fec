//! Import command handlers for the CLI.
//!
//! Each handler owns the full job lifecycle: load the pricing document,
//! run the pipeline stage, then drain the media queue so every merged SKU
//! gets its gallery reconciled before the process exits.

use std::path::Path;

use sqlx::PgPool;

use makershop_catalog::{FsReportSink, MediaQueue};
use makershop_core::{AppConfig, AttributeMap, ImportCsvJob, ImportUrlJob};

use crate::media::drain_media_jobs;

/// Ingest a CSV/XLSX file into staging and merge the batch into the catalog.
///
/// Ingest-time rejections are carried into the merge so the batch produces a
/// single error report covering both stages.
pub(crate) async fn run_import_csv(
    pool: &PgPool,
    config: &AppConfig,
    file: &Path,
    batch: Option<String>,
    prune_staging: bool,
) -> anyhow::Result<()> {
    // The CLI builds the same payload a queue consumer would receive, so the
    // import path is identical either way.
    let job = ImportCsvJob {
        csv_path: file.display().to_string(),
        batch_id: batch.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
    };
    let pricing_cfg = makershop_core::load_pricing_config(&config.pricing_config_path)?;

    let outcome = makershop_ingest::ingest(pool, Path::new(&job.csv_path), &job.batch_id).await?;

    let (queue, mut jobs) = MediaQueue::new();
    let reports = FsReportSink::new(config.report_dir.clone());
    let report = makershop_catalog::merge_batch(
        pool,
        config,
        &pricing_cfg,
        &queue,
        &reports,
        &job.batch_id,
        outcome.errors,
    )
    .await?;
    drop(queue);

    drain_media_jobs(pool, config, &mut jobs).await;

    // Staging rows stay in place by default; a retried merge for the same
    // batch re-upserts the same results.
    if prune_staging {
        let pruned = makershop_db::staging::prune_batch(pool, &job.batch_id).await?;
        tracing::debug!(batch = %job.batch_id, pruned, "staging rows pruned");
    }

    println!(
        "batch {}: staged {}, upserted {}, {} rejected row(s)",
        job.batch_id, outcome.staged, report.upserted, report.errors
    );
    if let Some(location) = report.report_location {
        println!("error report: {location}");
    }
    Ok(())
}

/// Assemble an [`ImportUrlJob`] from CLI flags.
///
/// # Errors
///
/// Returns an error when `--attributes` is not a JSON object.
#[allow(clippy::too_many_arguments)]
pub(crate) fn build_url_job(
    url: String,
    sku: Option<String>,
    name: Option<String>,
    price: Option<String>,
    currency: Option<String>,
    stock: Option<i32>,
    categories: Option<String>,
    image_url: Option<String>,
    model_url: Option<String>,
    attributes: Option<String>,
) -> anyhow::Result<ImportUrlJob> {
    let attributes = match attributes {
        Some(raw) => serde_json::from_str::<AttributeMap>(&raw)
            .map_err(|e| anyhow::anyhow!("--attributes must be a JSON object: {e}"))?,
        None => AttributeMap::new(),
    };
    Ok(ImportUrlJob {
        source_url: url,
        sku,
        name,
        price,
        currency,
        stock,
        categories,
        image_url,
        model_url,
        attributes,
    })
}

/// Upsert one product from a URL submission, then sync its media.
pub(crate) async fn run_import_url(
    pool: &PgPool,
    config: &AppConfig,
    job: &ImportUrlJob,
) -> anyhow::Result<()> {
    let pricing_cfg = makershop_core::load_pricing_config(&config.pricing_config_path)?;

    let (queue, mut jobs) = MediaQueue::new();
    let result = makershop_catalog::upsert_from_url(pool, &pricing_cfg, &queue, job).await?;
    drop(queue);

    drain_media_jobs(pool, config, &mut jobs).await;

    println!("upserted product {}", result.product_id);
    if let Some(url) = result.model_url {
        println!("model: {url}");
    }
    Ok(())
}

/// Recompute every cost-plus product's price under the current pricing
/// document.
pub(crate) async fn run_reprice(pool: &PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let pricing_cfg = makershop_core::load_pricing_config(&config.pricing_config_path)?;
    let repriced = makershop_catalog::reprice_catalog(pool, &pricing_cfg).await?;
    println!("repriced {repriced} product(s)");
    Ok(())
}
