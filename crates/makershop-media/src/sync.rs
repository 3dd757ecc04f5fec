//! Per-SKU sync job: lock, resolve, reconcile, apply.

use sqlx::{Acquire, PgConnection, PgPool};

use makershop_core::{AppConfig, MediaJob};
use makershop_db::locks::sku_lock_key;
use makershop_db::AdvisoryLock;

use crate::candidates::{resolve_candidates, resolve_preferred};
use crate::reconcile::plan_reconcile;
use crate::MediaError;

/// What one sync job did.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    /// `false` when no product exists for the SKU and the job was a no-op.
    pub synced: bool,
    pub candidates: usize,
    pub deleted: u64,
    pub inserted: usize,
}

/// Synchronize one product's gallery with its media candidates.
///
/// The whole job runs under the SKU's advisory lock, so concurrent jobs for
/// the same SKU apply one at a time and the last writer wins. Every query
/// runs on the lock's own pinned connection, so one job never holds more
/// than one pool connection. Gallery mutations happen in a single
/// transaction. An empty candidate list clears the gallery but leaves the
/// primary-image pointer alone.
///
/// # Errors
///
/// Returns [`MediaError`] on lock, scan, or database failures. A SKU with
/// no matching product is not an error; the job logs and skips.
pub async fn sync_media(
    pool: &PgPool,
    app: &AppConfig,
    job: &MediaJob,
) -> Result<SyncOutcome, MediaError> {
    let mut lock = AdvisoryLock::acquire(pool, sku_lock_key(&job.sku)).await?;
    let result = sync_locked(lock.connection(), app, job).await;
    let released = lock.release().await;
    let outcome = result?;
    released?;
    Ok(outcome)
}

async fn sync_locked(
    conn: &mut PgConnection,
    app: &AppConfig,
    job: &MediaJob,
) -> Result<SyncOutcome, MediaError> {
    let Some(product) = makershop_db::products::get_product_by_sku(conn, &job.sku).await? else {
        tracing::warn!(sku = %job.sku, "media sync skipped, no such product");
        return Ok(SyncOutcome::default());
    };

    let candidates = resolve_candidates(
        &app.media_root,
        &app.public_base_url,
        &job.sku,
        job.prefer_url.as_deref(),
    )?;
    let preferred = job
        .prefer_url
        .as_deref()
        .and_then(|p| resolve_preferred(&app.media_root, &app.public_base_url, p));

    let mut tx = conn.begin().await?;
    let existing = makershop_db::images::list_image_urls(&mut *tx, product.id).await?;
    let plan = plan_reconcile(&existing, &candidates);

    let mut deleted: u64 = 0;
    for url in &plan.delete {
        deleted += makershop_db::images::delete_image(&mut *tx, product.id, url).await?;
    }
    for url in &plan.insert {
        // idx is rewritten below for the full ordered set.
        makershop_db::images::insert_image(&mut *tx, product.id, url, 0).await?;
    }
    for (url, idx) in &plan.ordered {
        makershop_db::images::set_image_idx(&mut *tx, product.id, url, *idx).await?;
    }

    // A job-supplied preferred image always takes over as primary; a merely
    // discovered first candidate only fills an empty pointer.
    if let Some(url) = &preferred {
        makershop_db::products::set_primary_image(&mut *tx, product.id, url).await?;
    } else if let Some(first) = candidates.first() {
        makershop_db::products::set_primary_image_if_empty(&mut *tx, product.id, first).await?;
    }
    tx.commit().await?;

    tracing::info!(
        sku = %job.sku,
        candidates = candidates.len(),
        deleted,
        inserted = plan.insert.len(),
        "media sync applied"
    );
    Ok(SyncOutcome {
        synced: true,
        candidates: candidates.len(),
        deleted,
        inserted: plan.insert.len(),
    })
}
