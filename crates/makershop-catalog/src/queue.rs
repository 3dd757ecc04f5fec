//! Seam between the merger and the external media-job queue.
//!
//! Queue semantics (retry, backoff, timeouts) belong to the external broker;
//! in a single-process deployment the jobs flow through an in-process
//! channel drained by the media workers.

use tokio::sync::mpsc;

use makershop_core::MediaJob;

use crate::CatalogError;

/// Producer handle for media-sync jobs.
#[derive(Debug, Clone)]
pub struct MediaQueue {
    tx: mpsc::UnboundedSender<MediaJob>,
}

impl MediaQueue {
    /// Create a queue and the receiver its workers drain.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MediaJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueue one media-sync job.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::QueueClosed`] when all workers are gone.
    pub fn enqueue(&self, job: MediaJob) -> Result<(), CatalogError> {
        self.tx.send(job).map_err(|_| CatalogError::QueueClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueued_jobs_arrive_in_order() {
        let (queue, mut rx) = MediaQueue::new();
        for sku in ["A", "B"] {
            queue
                .enqueue(MediaJob {
                    sku: sku.to_string(),
                    prefer_url: None,
                })
                .unwrap();
        }
        assert_eq!(rx.try_recv().unwrap().sku, "A");
        assert_eq!(rx.try_recv().unwrap().sku, "B");
    }

    #[test]
    fn enqueue_after_receiver_drop_reports_closed() {
        let (queue, rx) = MediaQueue::new();
        drop(rx);
        let err = queue
            .enqueue(MediaJob {
                sku: "A".to_string(),
                prefer_url: None,
            })
            .unwrap_err();
        assert!(matches!(err, CatalogError::QueueClosed));
    }
}
