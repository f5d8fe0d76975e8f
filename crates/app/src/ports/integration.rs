//! Integration port: lifecycle and service-call handling for device integrations.
//!
//! An integration bridges some hardware (GPIO relays, …) into the host. It
//! builds its devices on startup, registers them with the host and handles
//! service calls directed at entities it owns.

use std::future::Future;

use rollerhub_domain::device::Device;
use rollerhub_domain::entity::Entity;
use rollerhub_domain::error::RollerHubError;
use rollerhub_domain::event::Event;
use rollerhub_domain::id::EntityId;

/// Context provided to integrations for registering what they set up.
///
/// This is a **port**: adapters call it to persist devices and entities.
/// The in-memory registry in [`services::registry`](crate::services::registry)
/// is the concrete implementation used by the daemon.
pub trait IntegrationContext: Send + Sync {
    /// Register a device (create or update by `integration`+`unique_id`).
    fn upsert_device(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, RollerHubError>> + Send;

    /// Register an entity (create or update by `entity_id` string).
    ///
    /// Also publishes `EntityCreated` / `StateChanged` events when appropriate.
    fn upsert_entity(
        &self,
        entity: Entity,
    ) -> impl Future<Output = Result<Entity, RollerHubError>> + Send;

    /// Publish a domain event.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), RollerHubError>> + Send;

    /// Convenience: persist a full [`DiscoveredDevice`] (device + all entities).
    fn persist_discovered(
        &self,
        dd: DiscoveredDevice,
    ) -> impl Future<Output = Result<(), RollerHubError>> + Send {
        async move {
            let device = self.upsert_device(dd.device).await?;
            for mut entity in dd.entities {
                entity.device_id = Some(device.id);
                self.upsert_entity(entity).await?;
            }
            Ok(())
        }
    }
}

impl<T: IntegrationContext> IntegrationContext for std::sync::Arc<T> {
    fn upsert_device(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, RollerHubError>> + Send {
        (**self).upsert_device(device)
    }

    fn upsert_entity(
        &self,
        entity: Entity,
    ) -> impl Future<Output = Result<Entity, RollerHubError>> + Send {
        (**self).upsert_entity(entity)
    }

    fn publish(&self, event: Event) -> impl Future<Output = Result<(), RollerHubError>> + Send {
        (**self).publish(event)
    }
}

/// A pluggable device integration.
///
/// The daemon calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup): build devices and register them via `ctx`
/// 2. (commands are forwarded via [`handle_service_call`](Self::handle_service_call))
/// 3. [`teardown`](Self::teardown): release hardware
pub trait Integration {
    /// Unique name identifying this integration (e.g. `"rpi_gpio_roller"`).
    fn name(&self) -> &'static str;

    /// Initialise hardware and register every device via `ctx`.
    fn setup(
        &mut self,
        ctx: &impl IntegrationContext,
    ) -> impl Future<Output = Result<(), RollerHubError>> + Send;

    /// Handle a service call (e.g. `open_cover`, `stop_cover`) for an entity
    /// owned by this integration.
    ///
    /// Returns the [`Entity`] snapshot after handling the call.
    fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Entity, RollerHubError>> + Send;

    /// Called on graceful shutdown. Leave the hardware in a safe state.
    fn teardown(&mut self) -> impl Future<Output = Result<(), RollerHubError>> + Send;
}

/// A device and its associated entities built during integration setup.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    pub device: Device,
    pub entities: Vec<Entity>,
}
