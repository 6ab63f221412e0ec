//! Concrete observer implementations.

use crossbeam_channel::Sender;
use tracing::{debug, info};

use crate::observer::ProgressObserver;
use crate::progress::ProgressUpdate;

/// Event forwarded by [`ChannelObserver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// A dataset was aggregated.
    Progress(ProgressUpdate),
    /// Console text.
    Log(String),
}

/// Observer that sends events through a channel (non-blocking).
pub struct ChannelObserver {
    sender: Sender<BatchEvent>,
}

impl ChannelObserver {
    /// Create a new channel observer.
    #[must_use]
    pub fn new(sender: Sender<BatchEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_progress(&self, update: &ProgressUpdate) {
        let _ = self.sender.try_send(BatchEvent::Progress(update.clone()));
    }

    fn on_log(&self, message: &str) {
        let _ = self.sender.try_send(BatchEvent::Log(message.to_string()));
    }
}

/// Observer that forwards events to `tracing`.
pub struct LoggingObserver;

impl LoggingObserver {
    /// Create a new logging observer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for LoggingObserver {
    fn on_progress(&self, update: &ProgressUpdate) {
        if update.is_last() {
            info!(total = update.total, "All datasets aggregated");
        } else {
            debug!(
                dataset = %update.dataset,
                completed = update.completed,
                total = update.total,
                "Dataset aggregated"
            );
        }
    }

    fn on_log(&self, message: &str) {
        for line in message.lines().filter(|l| !l.trim().is_empty()) {
            debug!(target: "fdbatch::tool", "{line}");
        }
    }
}

/// Observer that ignores every event.
pub struct NoOpObserver;

impl NoOpObserver {
    /// Create a new no-op observer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for NoOpObserver {
    fn on_progress(&self, _update: &ProgressUpdate) {}

    fn on_log(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_observer_does_nothing() {
        let observer = NoOpObserver::default();
        observer.on_progress(&ProgressUpdate::new(1, 2, "s1.dat"));
        observer.on_log("text");
    }

    #[test]
    fn channel_observer_sends_in_order() {
        let (tx, rx) = crossbeam_channel::bounded(10);
        let observer = ChannelObserver::new(tx);

        observer.on_log("fast-dm 30.2");
        observer.on_progress(&ProgressUpdate::new(1, 3, "s1.dat"));

        assert_eq!(rx.try_recv().unwrap(), BatchEvent::Log("fast-dm 30.2".into()));
        assert_eq!(
            rx.try_recv().unwrap(),
            BatchEvent::Progress(ProgressUpdate::new(1, 3, "s1.dat"))
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_observer_full_channel_does_not_panic() {
        let (tx, _rx) = crossbeam_channel::bounded(1);
        let observer = ChannelObserver::new(tx);
        observer.on_log("first");
        observer.on_log("dropped");
    }

    #[test]
    fn channel_observer_disconnected_does_not_panic() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        drop(rx);
        let observer = ChannelObserver::new(tx);
        observer.on_progress(&ProgressUpdate::new(1, 1, "s1.dat"));
    }

    #[test]
    fn logging_observer_handles_all_events() {
        let observer = LoggingObserver::new();
        observer.on_progress(&ProgressUpdate::new(1, 2, "s1.dat"));
        observer.on_progress(&ProgressUpdate::new(2, 2, "s2.dat"));
        observer.on_log("line one\n\nline two\n");
    }
}
