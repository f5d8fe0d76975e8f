//! Event port: where registrations and state changes are announced.

use std::future::Future;

use rollerhub_domain::error::RollerHubError;
use rollerhub_domain::event::Event;

/// Sink for domain events. Implementations decide who hears them.
pub trait EventPublisher {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), RollerHubError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), RollerHubError>> + Send {
        (**self).publish(event)
    }
}
