//! Database operations for the `staging_rows` landing zone.
//!
//! Staging rows carry no foreign keys and are never deleted by the merge —
//! re-running a merge for the same batch must see identical input. Duplicate
//! rows for a batch are tolerated; the merge upsert makes them harmless.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, QueryBuilder};

use makershop_core::{AttributeMap, StagingRow};

use crate::DbError;

/// A row from the `staging_rows` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StagingRecord {
    pub id: i64,
    pub import_batch_id: String,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
    pub currency: Option<String>,
    pub stock: Option<i32>,
    pub image_url: Option<String>,
    pub model_url: Option<String>,
    pub categories: Option<String>,
    pub attributes: Value,
    pub created_at: DateTime<Utc>,
}

impl StagingRecord {
    /// Convert back to the normalized in-memory shape consumed by the merger.
    #[must_use]
    pub fn into_staging_row(self) -> StagingRow {
        let attributes = match self.attributes {
            Value::Object(map) => map,
            _ => AttributeMap::new(),
        };
        StagingRow {
            sku: self.sku,
            name: self.name,
            description: self.description,
            price: self.price,
            currency: self.currency,
            stock: self.stock,
            image_url: self.image_url,
            model_url: self.model_url,
            categories: self.categories,
            attributes,
        }
    }
}

/// Insert a chunk of normalized rows tagged with `batch_id`.
///
/// One multi-row statement per call; callers bound the chunk size.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_staging_rows(
    pool: &PgPool,
    batch_id: &str,
    rows: &[StagingRow],
) -> Result<u64, DbError> {
    if rows.is_empty() {
        return Ok(0);
    }

    let mut builder: QueryBuilder<'_, sqlx::Postgres> = QueryBuilder::new(
        "INSERT INTO staging_rows \
             (import_batch_id, sku, name, description, price, currency, stock, \
              image_url, model_url, categories, attributes) ",
    );
    builder.push_values(rows, |mut b, row| {
        b.push_bind(batch_id)
            .push_bind(&row.sku)
            .push_bind(&row.name)
            .push_bind(&row.description)
            .push_bind(&row.price)
            .push_bind(&row.currency)
            .push_bind(row.stock)
            .push_bind(&row.image_url)
            .push_bind(&row.model_url)
            .push_bind(&row.categories)
            .push_bind(Value::Object(row.attributes.clone()));
    });

    let result = builder.build().execute(pool).await?;
    Ok(result.rows_affected())
}

/// Fetch every staging row for a batch, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn fetch_staging_rows(
    pool: &PgPool,
    batch_id: &str,
) -> Result<Vec<StagingRecord>, DbError> {
    let rows = sqlx::query_as::<_, StagingRecord>(
        "SELECT id, import_batch_id, sku, name, description, price, currency, stock, \
                image_url, model_url, categories, attributes, created_at \
         FROM staging_rows \
         WHERE import_batch_id = $1 \
         ORDER BY id",
    )
    .bind(batch_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Delete staged rows for a batch (maintenance pruning; not called by merge).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn prune_batch(pool: &PgPool, batch_id: &str) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM staging_rows WHERE import_batch_id = $1")
        .bind(batch_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
