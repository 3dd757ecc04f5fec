//! Database operations for the `product_images` gallery association table.
//!
//! `(product_id, url)` is unique; `idx` is the explicit display order. All
//! mutations here are building blocks for the media synchronizer's
//! whitelist reconciliation and run inside its per-SKU transaction.

use sqlx::PgConnection;

use crate::DbError;

/// URLs currently associated with a product, in display order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_image_urls(
    conn: &mut PgConnection,
    product_id: i64,
) -> Result<Vec<String>, DbError> {
    let urls = sqlx::query_scalar::<_, String>(
        "SELECT url FROM product_images WHERE product_id = $1 ORDER BY idx, id",
    )
    .bind(product_id)
    .fetch_all(conn)
    .await?;
    Ok(urls)
}

/// Delete one association; returns the number of rows removed (0 or 1).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_image(
    conn: &mut PgConnection,
    product_id: i64,
    url: &str,
) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM product_images WHERE product_id = $1 AND url = $2")
        .bind(product_id)
        .bind(url)
        .execute(conn)
        .await?;
    Ok(result.rows_affected())
}

/// Insert an association, ignoring duplicates.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_image(
    conn: &mut PgConnection,
    product_id: i64,
    url: &str,
    idx: i32,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO product_images (product_id, url, idx) VALUES ($1, $2, $3) \
         ON CONFLICT (product_id, url) DO NOTHING",
    )
    .bind(product_id)
    .bind(url)
    .bind(idx)
    .execute(conn)
    .await?;
    Ok(())
}

/// Rewrite the display order of one association.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn set_image_idx(
    conn: &mut PgConnection,
    product_id: i64,
    url: &str,
    idx: i32,
) -> Result<(), DbError> {
    sqlx::query("UPDATE product_images SET idx = $3 WHERE product_id = $1 AND url = $2")
        .bind(product_id)
        .bind(url)
        .bind(idx)
        .execute(conn)
        .await?;
    Ok(())
}
