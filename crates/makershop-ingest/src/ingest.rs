use std::path::Path;

use sqlx::PgPool;

use makershop_core::{RowError, StagingRow};

use crate::{normalize_row, IngestError, RowSource};

/// Rows buffered per staging insert statement.
const STAGING_INSERT_CHUNK: usize = 500;

/// Result of one ingest pass over a source file.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub staged: u64,
    /// Rows rejected before staging (no SKU, undecodable record), destined
    /// for the batch error report.
    pub errors: Vec<RowError>,
}

/// Stream a CSV/XLSX source into the staging table under `batch_id`.
///
/// Row-level problems are logged with their raw content, collected, and
/// skipped; the ingest itself fails only on I/O-level errors (unreadable or
/// truncated source, database down). Retried ingests may duplicate staging
/// rows for the batch — the merge upsert makes that harmless.
///
/// # Errors
///
/// Returns [`IngestError`] on source I/O failures or staging insert failures.
pub async fn ingest(
    pool: &PgPool,
    source_path: &Path,
    batch_id: &str,
) -> Result<IngestOutcome, IngestError> {
    let source = RowSource::open(source_path)?;

    let mut outcome = IngestOutcome::default();
    let mut buffer: Vec<StagingRow> = Vec::with_capacity(STAGING_INSERT_CHUNK);

    for item in source {
        let raw = match item {
            Ok(raw) => raw,
            Err(IngestError::Csv(e)) if !matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                let line = e.position().map_or(0, csv::Position::line);
                tracing::warn!(batch = %batch_id, line, error = %e, "undecodable row skipped");
                outcome.errors.push(RowError {
                    line,
                    sku: String::new(),
                    reason: format!("undecodable row: {e}"),
                    raw: String::new(),
                });
                continue;
            }
            Err(e) => return Err(e),
        };

        match normalize_row(&raw) {
            Ok(row) => {
                buffer.push(row);
                if buffer.len() >= STAGING_INSERT_CHUNK {
                    outcome.staged +=
                        makershop_db::staging::insert_staging_rows(pool, batch_id, &buffer).await?;
                    buffer.clear();
                }
            }
            Err(reason) => {
                tracing::warn!(
                    batch = %batch_id,
                    line = raw.line,
                    raw = %raw.raw_text(),
                    %reason,
                    "row rejected during ingest"
                );
                outcome.errors.push(RowError {
                    line: raw.line,
                    sku: raw.get("sku").unwrap_or_default().to_string(),
                    reason,
                    raw: raw.raw_text(),
                });
            }
        }
    }

    if !buffer.is_empty() {
        outcome.staged +=
            makershop_db::staging::insert_staging_rows(pool, batch_id, &buffer).await?;
    }

    tracing::info!(
        batch = %batch_id,
        staged = outcome.staged,
        rejected = outcome.errors.len(),
        "ingest complete"
    );
    Ok(outcome)
}
