//! Per-SKU media synchronization.
//!
//! Each sync job gathers image candidates for one SKU (a preferred remote
//! URL plus the SKU's directory under the media root), reconciles them
//! against the stored gallery, and applies the difference under a per-SKU
//! advisory lock so concurrent jobs for the same SKU serialize.

mod candidates;
mod error;
mod reconcile;
mod sync;

pub use candidates::resolve_candidates;
pub use error::MediaError;
pub use reconcile::{plan_reconcile, ReconcilePlan};
pub use sync::{sync_media, SyncOutcome};
