//! Normalization from raw source rows to [`StagingRow`]s.

use serde_json::Value;

use makershop_core::links::{classify_image_link, classify_model_link};
use makershop_core::{parse_flexible_number, AttributeMap, StagingRow};

use crate::RawRow;

/// Columns mapped onto dedicated staging fields; everything else passes
/// through into the attributes map.
const RESERVED_COLUMNS: &[&str] = &[
    "sku",
    "name",
    "description",
    "price",
    "currency",
    "stock",
    "image_url",
    "model_url",
    "categories",
];

/// Normalize one raw row into a staging record.
///
/// Only a missing SKU rejects the row. Every other malformed field degrades:
/// unparsable stock becomes `NULL`, a URL failing its role's extension
/// allow-list becomes `NULL`, and the price is carried as raw text for the
/// merger to classify.
///
/// # Errors
///
/// Returns a human-readable reason when the row has no usable SKU.
pub fn normalize_row(row: &RawRow) -> Result<StagingRow, String> {
    let sku = row
        .get("sku")
        .ok_or_else(|| "missing sku".to_string())?
        .to_string();
    let name = row.get("name").unwrap_or(&sku).to_string();

    let stock = row
        .get("stock")
        .and_then(parse_flexible_number)
        .and_then(|v| {
            let rounded = v.round();
            (rounded >= 0.0 && rounded <= f64::from(i32::MAX)).then_some(rounded)
        })
        .map(|v| {
            #[allow(clippy::cast_possible_truncation)]
            let stock = v as i32;
            stock
        });

    let mut attributes = AttributeMap::new();
    let mut extra_keys: Vec<&String> = row
        .fields()
        .keys()
        .filter(|k| !RESERVED_COLUMNS.contains(&k.as_str()))
        .collect();
    extra_keys.sort();
    for key in extra_keys {
        if let Some(value) = row.get(key) {
            attributes.insert(key.clone(), Value::String(value.to_string()));
        }
    }

    Ok(StagingRow {
        sku,
        name,
        description: row.get("description").map(str::to_string),
        price: row.get("price").unwrap_or_default().to_string(),
        currency: row.get("currency").map(str::to_string),
        stock,
        image_url: row.get("image_url").and_then(classify_image_link),
        model_url: row.get("model_url").and_then(classify_model_link),
        categories: row.get("categories").map(str::to_string),
        attributes,
    })
}
