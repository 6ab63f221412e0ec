//! Observer pattern for batch progress and tool output.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::progress::ProgressUpdate;

/// Observer trait for receiving batch events.
pub trait ProgressObserver: Send + Sync {
    /// Receive a progress update (one per aggregated dataset).
    fn on_progress(&self, update: &ProgressUpdate);

    /// Receive a block of text destined for the console log
    /// (captured tool output, per-item failures).
    fn on_log(&self, message: &str);
}

/// Subject that fans events out to a collection of observers.
pub struct ProgressSubject {
    observers: RwLock<Vec<Arc<dyn ProgressObserver>>>,
}

impl ProgressSubject {
    /// Create a new subject with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer.
    pub fn register(&self, observer: Arc<dyn ProgressObserver>) {
        self.observers.write().push(observer);
    }

    /// Unregister all observers.
    pub fn clear(&self) {
        self.observers.write().clear();
    }

    /// Get the number of registered observers.
    #[must_use]
    pub fn count(&self) -> usize {
        self.observers.read().len()
    }
}

impl Default for ProgressSubject {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ProgressSubject {
    fn on_progress(&self, update: &ProgressUpdate) {
        for observer in self.observers.read().iter() {
            observer.on_progress(update);
        }
    }

    fn on_log(&self, message: &str) {
        for observer in self.observers.read().iter() {
            observer.on_log(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingObserver {
        progress: AtomicUsize,
        logs: AtomicUsize,
    }

    impl CountingObserver {
        fn new() -> Self {
            Self {
                progress: AtomicUsize::new(0),
                logs: AtomicUsize::new(0),
            }
        }
    }

    impl ProgressObserver for CountingObserver {
        fn on_progress(&self, _update: &ProgressUpdate) {
            self.progress.fetch_add(1, Ordering::Relaxed);
        }

        fn on_log(&self, _message: &str) {
            self.logs.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn subject_register_and_clear() {
        let subject = ProgressSubject::new();
        assert_eq!(subject.count(), 0);
        subject.register(Arc::new(CountingObserver::new()));
        subject.register(Arc::new(CountingObserver::new()));
        assert_eq!(subject.count(), 2);
        subject.clear();
        assert_eq!(subject.count(), 0);
    }

    #[test]
    fn subject_fans_out_progress_and_logs() {
        let subject = ProgressSubject::default();
        let obs1 = Arc::new(CountingObserver::new());
        let obs2 = Arc::new(CountingObserver::new());
        subject.register(obs1.clone());
        subject.register(obs2.clone());

        subject.on_progress(&ProgressUpdate::new(1, 2, "s1.dat"));
        subject.on_log("fast-dm output");
        subject.on_log("more output");

        assert_eq!(obs1.progress.load(Ordering::Relaxed), 1);
        assert_eq!(obs2.progress.load(Ordering::Relaxed), 1);
        assert_eq!(obs1.logs.load(Ordering::Relaxed), 2);
        assert_eq!(obs2.logs.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn subject_notify_empty_does_not_panic() {
        let subject = ProgressSubject::new();
        subject.on_progress(&ProgressUpdate::new(1, 1, "s1.dat"));
        subject.on_log("ignored");
    }
}
