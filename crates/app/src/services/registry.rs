//! In-memory registry: the host side of device and entity registration.
//!
//! Keeps the latest [`Device`] and [`Entity`] snapshot registered by every
//! integration and publishes an [`Event`] for each registration and each
//! entity state change. Nothing is persisted: the registry lives as long as
//! the daemon.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rollerhub_domain::device::Device;
use rollerhub_domain::entity::Entity;
use rollerhub_domain::error::{NotFoundError, RollerHubError};
use rollerhub_domain::event::{Event, EventType};
use rollerhub_domain::time::now;

use crate::ports::{EventPublisher, IntegrationContext, StateNotifier};

/// Devices are keyed by `(integration, unique_id)`.
type DeviceKey = (String, String);

/// Registry backed by two mutex-guarded maps and an [`EventPublisher`].
pub struct InMemoryRegistry<EP> {
    devices: Mutex<HashMap<DeviceKey, Device>>,
    entities: Mutex<HashMap<String, Entity>>,
    publisher: EP,
}

impl<EP> InMemoryRegistry<EP> {
    /// Create an empty registry publishing through `publisher`.
    pub fn new(publisher: EP) -> Self {
        Self {
            devices: Mutex::new(HashMap::new()),
            entities: Mutex::new(HashMap::new()),
            publisher,
        }
    }

    /// Look up an entity by its `entity_id` string (e.g. `cover.blind1`).
    #[must_use]
    pub fn find_entity(&self, entity_id: &str) -> Option<Entity> {
        lock(&self.entities).get(entity_id).cloned()
    }

    /// Like [`find_entity`](Self::find_entity) but fails when absent.
    ///
    /// # Errors
    ///
    /// Returns [`RollerHubError::NotFound`] when nothing is registered under
    /// `entity_id`.
    pub fn get_entity(&self, entity_id: &str) -> Result<Entity, RollerHubError> {
        self.find_entity(entity_id).ok_or_else(|| {
            NotFoundError {
                entity: "Entity",
                id: entity_id.to_string(),
            }
            .into()
        })
    }

    /// All entities, ordered by `entity_id`.
    #[must_use]
    pub fn list_entities(&self) -> Vec<Entity> {
        let mut entities: Vec<Entity> = lock(&self.entities).values().cloned().collect();
        entities.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        entities
    }

    /// All devices, ordered by name.
    #[must_use]
    pub fn list_devices(&self) -> Vec<Device> {
        let mut devices: Vec<Device> = lock(&self.devices).values().cloned().collect();
        devices.sort_by(|a, b| a.name.cmp(&b.name));
        devices
    }

    /// Store `device`, keeping the id of an earlier registration with the
    /// same key. Returns the stored device and whether it is new.
    fn store_device(&self, mut device: Device) -> (Device, bool) {
        let key = (device.integration.clone(), device.unique_id.clone());
        let mut devices = lock(&self.devices);
        let created = match devices.get(&key) {
            Some(existing) => {
                device.id = existing.id;
                false
            }
            None => true,
        };
        devices.insert(key, device.clone());
        (device, created)
    }

    /// Store `entity` and return the stored snapshot plus the event the
    /// change warrants, if any.
    fn store_entity(&self, entity: Entity) -> (Entity, Option<Event>) {
        let mut entities = lock(&self.entities);
        let Some(existing) = entities.get(&entity.entity_id) else {
            let event = Event::new(
                EventType::EntityCreated,
                Some(entity.id),
                serde_json::json!({
                    "entity_id": entity.entity_id,
                    "state": entity.state,
                }),
            );
            entities.insert(entity.entity_id.clone(), entity.clone());
            return (entity, Some(event));
        };

        let mut stored = existing.clone();
        let previous = stored.state.clone();
        stored.friendly_name = entity.friendly_name;
        stored.attributes = entity.attributes;
        stored.device_id = entity.device_id.or(stored.device_id);
        stored.update_state(entity.state, now());

        let event = (previous != stored.state).then(|| {
            Event::new(
                EventType::StateChanged,
                Some(stored.id),
                serde_json::json!({
                    "entity_id": stored.entity_id,
                    "from": previous,
                    "to": stored.state,
                }),
            )
        });
        entities.insert(stored.entity_id.clone(), stored.clone());
        (stored, event)
    }
}

impl<EP> IntegrationContext for InMemoryRegistry<EP>
where
    EP: EventPublisher + Send + Sync,
{
    #[tracing::instrument(skip(self, device), fields(device_name = %device.name))]
    async fn upsert_device(&self, device: Device) -> Result<Device, RollerHubError> {
        device.validate()?;
        let (device, created) = self.store_device(device);
        if created {
            tracing::debug!(unique_id = %device.unique_id, "device registered");
            let event = Event::new(
                EventType::DeviceRegistered,
                None,
                serde_json::json!({
                    "device_id": device.id,
                    "name": device.name,
                    "integration": device.integration,
                    "unique_id": device.unique_id,
                }),
            );
            self.publisher.publish(event).await?;
        }
        Ok(device)
    }

    #[tracing::instrument(skip(self, entity), fields(entity_id = %entity.entity_id))]
    async fn upsert_entity(&self, entity: Entity) -> Result<Entity, RollerHubError> {
        entity.validate()?;
        let (entity, event) = self.store_entity(entity);
        if let Some(event) = event {
            tracing::debug!(event_type = %event.event_type, state = %entity.state, "entity updated");
            self.publisher.publish(event).await?;
        }
        Ok(entity)
    }

    async fn publish(&self, event: Event) -> Result<(), RollerHubError> {
        self.publisher.publish(event).await
    }
}

impl<EP> StateNotifier for InMemoryRegistry<EP>
where
    EP: EventPublisher + Send + Sync,
{
    async fn state_changed(&self, entity: Entity) -> Result<(), RollerHubError> {
        self.upsert_entity(entity).await.map(|_| ())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
