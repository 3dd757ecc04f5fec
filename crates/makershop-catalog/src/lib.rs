//! Catalog Merger: turns staged import rows into canonical product records,
//! pricing them through the cost-plus engine when no manual price is given,
//! and schedules a media-sync job for every merged SKU.

mod error;
mod merge;
mod queue;
mod report;
mod reprice;
mod url_import;

pub use error::CatalogError;
pub use merge::{merge_batch, MergeReport};
pub use queue::MediaQueue;
pub use report::{FsReportSink, ReportSink};
pub use reprice::reprice_catalog;
pub use url_import::{upsert_from_url, UrlImportResult};
