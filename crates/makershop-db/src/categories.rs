//! Database operations for `categories` and the product/category join table.

use sqlx::{PgConnection, PgPool};

use crate::DbError;

/// A row from the `categories` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

/// Fetch every category matching one of `slugs` in a single query.
///
/// Callers resolve all referenced slugs up front, so per-row processing
/// never does its own category lookups.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_categories_by_slugs(
    pool: &PgPool,
    slugs: &[String],
) -> Result<Vec<CategoryRow>, DbError> {
    if slugs.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query_as::<_, CategoryRow>(
        "SELECT id, slug, name FROM categories WHERE slug = ANY($1)",
    )
    .bind(slugs)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Create any missing categories for `slugs` and return the full set.
///
/// Both the batch merger and the URL-import path call this up front, so
/// imports may name categories that do not exist yet. The slug doubles as
/// the initial display name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert or lookup fails.
pub async fn ensure_categories(
    pool: &PgPool,
    slugs: &[String],
) -> Result<Vec<CategoryRow>, DbError> {
    if slugs.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query(
        "INSERT INTO categories (slug, name) \
         SELECT s, s FROM UNNEST($1::text[]) AS s \
         ON CONFLICT (slug) DO NOTHING",
    )
    .bind(slugs)
    .execute(pool)
    .await?;
    get_categories_by_slugs(pool, slugs).await
}

/// Idempotently link a product to a category.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn link_product_category(
    conn: &mut PgConnection,
    product_id: i64,
    category_id: i64,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO product_categories (product_id, category_id) VALUES ($1, $2) \
         ON CONFLICT (product_id, category_id) DO NOTHING",
    )
    .bind(product_id)
    .bind(category_id)
    .execute(conn)
    .await?;
    Ok(())
}
