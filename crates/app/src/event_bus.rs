//! Event fan-out for everything the registry publishes.
//!
//! Subscribers only see events sent after they subscribed. A subscriber that
//! falls more than `capacity` events behind loses the oldest ones and is told
//! so on its next receive.

use std::future::Future;

use tokio::sync::broadcast;

use rollerhub_domain::error::RollerHubError;
use rollerhub_domain::event::Event;

use crate::ports::EventPublisher;

/// [`EventPublisher`] over a tokio [`broadcast`] channel.
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    /// Never fails: an event nobody listens to is dropped.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), RollerHubError>> + Send {
        match self.sender.send(event) {
            Ok(receivers) => tracing::trace!(receivers, "event published"),
            Err(_) => tracing::trace!("event dropped, no subscribers"),
        }
        std::future::ready(Ok(()))
    }
}
