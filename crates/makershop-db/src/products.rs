//! Database operations for the canonical `products` table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgConnection, PgPool};

use makershop_core::AttributeMap;

use crate::DbError;

/// How a product's price was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingMethod {
    Manual,
    CostPlus,
}

impl PricingMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PricingMethod::Manual => "manual",
            PricingMethod::CostPlus => "cost_plus",
        }
    }
}

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub currency: String,
    pub stock: i32,
    pub attributes: Value,
    /// `"manual"` or `"cost_plus"`.
    pub pricing_method: String,
    /// Last computed pricing breakdown, kept as an audit trail.
    pub pricing: Option<Value>,
    /// Denormalized pointer to the primary gallery image.
    pub image_url: Option<String>,
    pub model_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductRow {
    /// Stored attributes as a map; non-object JSON degrades to empty.
    #[must_use]
    pub fn attribute_map(&self) -> AttributeMap {
        match &self.attributes {
            Value::Object(map) => map.clone(),
            _ => AttributeMap::new(),
        }
    }
}

/// Input to [`upsert_product`], already validated by the merger.
///
/// `price` is `Some` only for a finite positive value; `None` triggers the
/// merge-safety fallback (the `fallback_price` floor on insert, the existing
/// stored price on conflict). A malformed import row can therefore never
/// zero out a live product's price.
#[derive(Debug, Clone)]
pub struct ProductUpsert {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub fallback_price: f64,
    pub currency: Option<String>,
    pub default_currency: String,
    pub stock: Option<i32>,
    /// Already validated against the image extension allow-list; `None`
    /// preserves any existing pointer.
    pub image_url: Option<String>,
    pub model_url: Option<String>,
    pub attributes: AttributeMap,
    pub pricing_method: PricingMethod,
    pub pricing: Option<Value>,
}

/// Idempotent insert-or-update keyed by `sku`; returns the product id.
///
/// Conflict behavior: `name` and `pricing_method` are overwritten;
/// `description`, `currency`, `stock`, `image_url`, `model_url`, and
/// `pricing` fall back to the stored value when absent from the payload;
/// `attributes` merge by key union with incoming keys winning; `price`
/// keeps the stored value unless the payload carries a valid one.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_product(conn: &mut PgConnection, input: &ProductUpsert) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar::<_, i64>(
        "INSERT INTO products \
             (sku, name, description, price, currency, stock, attributes, \
              pricing_method, pricing, image_url, model_url) \
         VALUES ($1, $2, $3, COALESCE($4, $5), COALESCE($6, $7), COALESCE($8, 0), \
                 $9::jsonb, $10, $11::jsonb, $12, $13) \
         ON CONFLICT (sku) DO UPDATE SET \
             name           = EXCLUDED.name, \
             description    = COALESCE($3, products.description), \
             price          = COALESCE($4, products.price), \
             currency       = COALESCE($6, products.currency), \
             stock          = COALESCE($8, products.stock), \
             attributes     = products.attributes || $9::jsonb, \
             pricing_method = EXCLUDED.pricing_method, \
             pricing        = COALESCE($11::jsonb, products.pricing), \
             image_url      = COALESCE($12, products.image_url), \
             model_url      = COALESCE($13, products.model_url), \
             updated_at     = NOW() \
         RETURNING id",
    )
    .bind(&input.sku)
    .bind(&input.name)
    .bind(&input.description)
    .bind(input.price)
    .bind(input.fallback_price)
    .bind(&input.currency)
    .bind(&input.default_currency)
    .bind(input.stock)
    .bind(Value::Object(input.attributes.clone()))
    .bind(input.pricing_method.as_str())
    .bind(&input.pricing)
    .bind(&input.image_url)
    .bind(&input.model_url)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Fetch a product by SKU.
///
/// Takes a connection so callers already holding one (the media sync's
/// advisory-lock connection) do not draw a second from the pool.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_product_by_sku(
    conn: &mut PgConnection,
    sku: &str,
) -> Result<Option<ProductRow>, DbError> {
    let row = sqlx::query_as::<_, ProductRow>(
        "SELECT id, sku, name, description, price, currency, stock, attributes, \
                pricing_method, pricing, image_url, model_url, created_at, updated_at \
         FROM products WHERE sku = $1",
    )
    .bind(sku)
    .fetch_optional(conn)
    .await?;
    Ok(row)
}

/// List every product priced by the cost-plus engine, for repricing runs.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_cost_plus_products(pool: &PgPool) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, sku, name, description, price, currency, stock, attributes, \
                pricing_method, pricing, image_url, model_url, created_at, updated_at \
         FROM products WHERE pricing_method = 'cost_plus' ORDER BY sku",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Write a recomputed price and its breakdown for one product.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the product no longer exists, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_pricing(
    conn: &mut PgConnection,
    product_id: i64,
    price: f64,
    pricing: &Value,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE products SET price = $2, pricing = $3::jsonb, updated_at = NOW() WHERE id = $1",
    )
    .bind(product_id)
    .bind(price)
    .bind(pricing)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Unconditionally point the product's primary image at `url`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn set_primary_image(
    conn: &mut PgConnection,
    product_id: i64,
    url: &str,
) -> Result<(), DbError> {
    sqlx::query("UPDATE products SET image_url = $2, updated_at = NOW() WHERE id = $1")
        .bind(product_id)
        .bind(url)
        .execute(conn)
        .await?;
    Ok(())
}

/// Point the primary image at `url` only when no primary is set yet.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn set_primary_image_if_empty(
    conn: &mut PgConnection,
    product_id: i64,
    url: &str,
) -> Result<(), DbError> {
    sqlx::query(
        "UPDATE products SET image_url = $2, updated_at = NOW() \
         WHERE id = $1 AND (image_url IS NULL OR image_url = '')",
    )
    .bind(product_id)
    .bind(url)
    .execute(conn)
    .await?;
    Ok(())
}

/// Best-effort refresh of the `products_search` materialized view.
///
/// A read optimization, not a correctness requirement: failures are logged
/// at `warn` and swallowed.
pub async fn refresh_search_view(pool: &PgPool) {
    if let Err(e) = sqlx::query("REFRESH MATERIALIZED VIEW CONCURRENTLY products_search")
        .execute(pool)
        .await
    {
        tracing::warn!(error = %e, "products_search refresh failed; continuing");
    }
}
