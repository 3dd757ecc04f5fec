//! Media command handlers and queue draining for the CLI.

use futures::{stream, StreamExt};
use sqlx::PgPool;
use tokio::sync::mpsc::UnboundedReceiver;

use makershop_core::{AppConfig, MediaJob};

/// Reconcile one SKU's gallery on demand.
pub(crate) async fn run_sync_media(
    pool: &PgPool,
    config: &AppConfig,
    sku: String,
    prefer: Option<String>,
) -> anyhow::Result<()> {
    let job = MediaJob {
        sku,
        prefer_url: prefer,
    };
    let outcome = makershop_media::sync_media(pool, config, &job).await?;
    if outcome.synced {
        println!(
            "synced {}: {} candidate(s), {} inserted, {} deleted",
            job.sku, outcome.candidates, outcome.inserted, outcome.deleted
        );
    } else {
        println!("no product for sku {}", job.sku);
    }
    Ok(())
}

/// Run every queued media job, `media_concurrency` at a time.
///
/// Per-job failures are logged and skipped; distinct SKUs run in parallel
/// while the per-SKU advisory lock serializes duplicates.
pub(crate) async fn drain_media_jobs(
    pool: &PgPool,
    config: &AppConfig,
    jobs: &mut UnboundedReceiver<MediaJob>,
) {
    let mut pending = Vec::new();
    while let Some(job) = jobs.recv().await {
        pending.push(job);
    }
    if pending.is_empty() {
        return;
    }
    let total = pending.len();

    stream::iter(pending)
        .map(|job| async move {
            let result = makershop_media::sync_media(pool, config, &job).await;
            (job, result)
        })
        .buffer_unordered(config.media_concurrency.max(1))
        .for_each(|(job, result)| async move {
            if let Err(e) = result {
                tracing::warn!(sku = %job.sku, error = %e, "media sync failed");
            }
        })
        .await;

    tracing::info!(total, "media queue drained");
}
