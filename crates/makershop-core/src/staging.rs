//! The loosely typed staging record one import row normalizes into.

use serde::{Deserialize, Serialize};

use crate::attrs::AttributeMap;

/// One CSV/XLSX line (or URL-derived record) after normalization, before
/// merging into the canonical catalog.
///
/// `price` stays a raw string: empty means "compute cost-plus", a parsable
/// positive number means "manual price", anything else is rejected at merge
/// time. `sku` must be non-empty for the row to be merge-eligible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StagingRow {
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    /// Raw price text exactly as supplied (trimmed), or empty.
    pub price: String,
    pub currency: Option<String>,
    pub stock: Option<i32>,
    /// Already validated against the image extension allow-list.
    pub image_url: Option<String>,
    /// Already validated against the 3D-model extension allow-list.
    pub model_url: Option<String>,
    /// Pipe-delimited category slugs, e.g. `"figurines|fantasy"`.
    pub categories: Option<String>,
    pub attributes: AttributeMap,
}

/// One rejected import row, destined for the batch error report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    /// 1-based source line (0 for rows that only exist in staging).
    pub line: u64,
    pub sku: String,
    pub reason: String,
    /// Raw row content, for operator diagnosis.
    pub raw: String,
}

impl StagingRow {
    /// Category slugs referenced by this row, trimmed and de-emptied.
    #[must_use]
    pub fn category_slugs(&self) -> Vec<String> {
        self.categories
            .as_deref()
            .unwrap_or_default()
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
