//! Broadcast of iteration status changes.

use tokio::sync::broadcast;

use sift_core::models::StatusChange;

/// Fan-out of [`StatusChange`] events to every subscriber. Slow
/// subscribers lag and miss events rather than block the store.
pub struct StatusNotifier {
    sender: broadcast::Sender<StatusChange>,
}

impl StatusNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, change: StatusChange) {
        // Err only means nobody is listening.
        let _ = self.sender.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusChange> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
