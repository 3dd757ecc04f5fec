//! Job payload shapes consumed from the external queue.
//!
//! Enqueue/dequeue semantics, retries, and backoff belong to the queue
//! collaborator; these types only fix the wire shape. Every job must be safe
//! to retry from scratch — the merge and media-sync operations are
//! idempotent by construction.

use serde::{Deserialize, Serialize};

use crate::attrs::AttributeMap;

/// Bulk import of a CSV/XLSX file already uploaded to local storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportCsvJob {
    pub csv_path: String,
    pub batch_id: String,
}

/// Single-product import from a URL submission; bypasses the staging table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportUrlJob {
    pub source_url: String,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub stock: Option<i32>,
    /// Pipe-delimited category slugs.
    pub categories: Option<String>,
    pub image_url: Option<String>,
    pub model_url: Option<String>,
    #[serde(default)]
    pub attributes: AttributeMap,
}

/// Per-SKU gallery reconciliation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaJob {
    pub sku: String,
    /// Validated image hint promoted to the front of the candidate list and,
    /// when present, written as the product's primary image.
    pub prefer_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_job_wire_shape_is_camel_case() {
        let job = MediaJob {
            sku: "SKU-1".to_string(),
            prefer_url: Some("https://x.test/a.jpg".to_string()),
        };
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["sku"], "SKU-1");
        assert_eq!(json["preferUrl"], "https://x.test/a.jpg");
    }

    #[test]
    fn import_csv_job_wire_shape_is_camel_case() {
        let job: ImportCsvJob = serde_json::from_str(
            r#"{"csvPath": "/uploads/batch.csv", "batchId": "b-1"}"#,
        )
        .unwrap();
        assert_eq!(job.csv_path, "/uploads/batch.csv");
        assert_eq!(job.batch_id, "b-1");

        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["csvPath"], "/uploads/batch.csv");
        assert_eq!(json["batchId"], "b-1");
    }

    #[test]
    fn import_url_job_tolerates_minimal_payload() {
        let job: ImportUrlJob =
            serde_json::from_str(r#"{"sourceUrl": "https://maker.example/part.stl"}"#).unwrap();
        assert_eq!(job.source_url, "https://maker.example/part.stl");
        assert!(job.sku.is_none());
        assert!(job.attributes.is_empty());
    }
}
