//! Progress tracking types and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Progress update sent from the batch runner to observers.
///
/// One update is produced per aggregated dataset, so `completed` runs from
/// 1 to `total` on a clean batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Number of datasets aggregated so far.
    pub completed: usize,
    /// Number of datasets in the batch.
    pub total: usize,
    /// File name of the dataset that was just aggregated.
    pub dataset: String,
}

impl ProgressUpdate {
    /// Create a new progress update.
    #[must_use]
    pub fn new(completed: usize, total: usize, dataset: impl Into<String>) -> Self {
        Self {
            completed,
            total,
            dataset: dataset.into(),
        }
    }

    /// Progress as a fraction in [0.0, 1.0].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }

    /// Whether this update completes the batch.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.completed >= self.total
    }
}

/// Cooperative cancellation token.
///
/// The caller keeps a clone and calls [`cancel`](Self::cancel); the batch
/// runner only ever reads it, once per poll tick.
///
/// # Example
/// ```
/// use fdbatch_core::progress::CancellationToken;
///
/// let token = CancellationToken::new();
/// let runner_view = token.clone();
/// assert!(!runner_view.is_cancelled());
///
/// token.cancel();
/// assert!(runner_view.is_cancelled());
/// ```
#[derive(Clone, Debug)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
