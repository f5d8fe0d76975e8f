//! State notification port: how a device tells the host its state moved.

use std::future::Future;

use rollerhub_domain::entity::Entity;
use rollerhub_domain::error::RollerHubError;

/// Receives entity snapshots after every state transition of a device.
///
/// Injected into device controllers at construction; the host decides what a
/// notification means (refresh a registry, publish an event, …).
pub trait StateNotifier: Send + Sync {
    fn state_changed(
        &self,
        entity: Entity,
    ) -> impl Future<Output = Result<(), RollerHubError>> + Send;
}

impl<T: StateNotifier> StateNotifier for std::sync::Arc<T> {
    fn state_changed(
        &self,
        entity: Entity,
    ) -> impl Future<Output = Result<(), RollerHubError>> + Send {
        (**self).state_changed(entity)
    }
}
