//! Staging Ingestor: streams CSV/XLSX sources row by row, normalizes each
//! line into a loosely typed [`makershop_core::StagingRow`], and lands it in
//! the batch-scoped staging table.

mod error;
mod ingest;
mod normalize;
mod source;

pub use error::IngestError;
pub use ingest::{ingest, IngestOutcome};
pub use normalize::normalize_row;
pub use source::{RawRow, RowSource};
