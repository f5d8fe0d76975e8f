//! Roller cover controller.
//!
//! Open and close assert one relay, hold it for the configured relay time and
//! rest it again; stop rests both relays at once. The believed position only
//! changes once a full travel completes, and every transition is reported to
//! the injected [`StateNotifier`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rollerhub_app::ports::integration::DiscoveredDevice;
use rollerhub_app::ports::{GpioDriver, StateNotifier};
use rollerhub_domain::cover::{CoverState, Direction};
use rollerhub_domain::device::Device;
use rollerhub_domain::entity::Entity;
use rollerhub_domain::id::{DeviceId, EntityId};

use crate::config::{CoverConfig, RelaySettings};
use crate::error::RollerError;
use crate::hold::{HoldOutcome, StopSignal};
use crate::relay::RelayPair;

/// Prefix of the stable per-cover identifier reported to the host.
const UNIQUE_ID_KIND: &str = "RollerCover";
const MODEL: &str = "GPIO relay roller";

/// One roller cover driven by an up/down relay pair.
pub struct RollerCover<G, N> {
    name: String,
    unique_id: String,
    entity_id: String,
    id: EntityId,
    device_id: DeviceId,
    relay_time: Duration,
    relays: tokio::sync::Mutex<RelayPair<G>>,
    state: Mutex<CoverState>,
    stop: StopSignal,
    notifier: N,
}

impl<G, N> RollerCover<G, N>
where
    G: GpioDriver,
    N: StateNotifier,
{
    /// Claim the relay pins and drive both relays to rest. The position
    /// starts unknown.
    ///
    /// # Errors
    ///
    /// Returns [`RollerError::Gpio`] if a pin cannot be configured or written.
    pub fn new(
        config: &CoverConfig,
        settings: RelaySettings,
        gpio: Arc<G>,
        notifier: N,
    ) -> Result<Self, RollerError> {
        let relays = RelayPair::new(
            gpio,
            config.relay_pin_up,
            config.relay_pin_down,
            settings.logic,
        )?;
        tracing::debug!(
            cover = %config.name,
            up = config.relay_pin_up,
            down = config.relay_pin_down,
            logic = ?settings.logic,
            "relays at rest"
        );
        Ok(Self {
            name: config.name.clone(),
            unique_id: format!("{UNIQUE_ID_KIND}.{}", config.name),
            entity_id: format!("cover.{}", slugify(&config.name)),
            id: EntityId::new(),
            device_id: DeviceId::new(),
            relay_time: settings.relay_time,
            relays: tokio::sync::Mutex::new(relays),
            state: Mutex::new(CoverState::Unknown),
            stop: StopSignal::new(),
            notifier,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Host-facing key, e.g. `cover.living_room`.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> CoverState {
        *self.lock_state()
    }

    /// `None` while the position is unknown.
    #[must_use]
    pub fn is_closed(&self) -> Option<bool> {
        self.state().is_closed()
    }

    #[must_use]
    pub fn current_position(&self) -> Option<u8> {
        self.state().position()
    }

    /// Raise the cover: assert the up relay for the relay time.
    ///
    /// Returns once the hold is over. A [`stop_cover`](Self::stop_cover)
    /// issued meanwhile ends the hold early and leaves the state to the stop.
    ///
    /// # Errors
    ///
    /// Returns [`RollerError::Gpio`] on a failed pin write (the state is left
    /// unchanged), or [`RollerError::Domain`] if the host rejects the update.
    #[tracing::instrument(skip(self), fields(cover = %self.name))]
    pub async fn open_cover(&self) -> Result<Entity, RollerError> {
        self.travel(Direction::Up).await
    }

    /// Lower the cover: assert the down relay for the relay time.
    ///
    /// # Errors
    ///
    /// Same as [`open_cover`](Self::open_cover).
    #[tracing::instrument(skip(self), fields(cover = %self.name))]
    pub async fn close_cover(&self) -> Result<Entity, RollerError> {
        self.travel(Direction::Down).await
    }

    /// Rest both relays immediately. The position becomes unknown.
    ///
    /// # Errors
    ///
    /// Returns [`RollerError::Gpio`] on a failed pin write, or
    /// [`RollerError::Domain`] if the host rejects the update.
    #[tracing::instrument(skip(self), fields(cover = %self.name))]
    pub async fn stop_cover(&self) -> Result<Entity, RollerError> {
        self.stop.raise();
        let relays = self.relays.lock().await;
        relays.rest_both()?;
        tracing::info!("cover stopped");
        let entity = self.transition(CoverState::Unknown).await;
        drop(relays);
        entity
    }

    // The relay guard is held until the host has been notified, so the state
    // reached by one operation is never reported after that of a later one.
    async fn travel(&self, direction: Direction) -> Result<Entity, RollerError> {
        let listener = self.stop.listen();
        let relays = self.relays.lock().await;
        if listener.is_stopped() {
            tracing::debug!(?direction, "stopped before the relay was asserted");
            return self.snapshot();
        }
        relays.engage(direction)?;
        tracing::debug!(
            ?direction,
            hold_secs = self.relay_time.as_secs(),
            "relay asserted"
        );
        let outcome = listener.hold(self.relay_time).await;
        relays.release(direction)?;

        let entity = match outcome {
            HoldOutcome::Elapsed => {
                let target = direction.target();
                tracing::info!(state = ?target, "travel complete");
                self.transition(target).await
            }
            HoldOutcome::Stopped => {
                tracing::info!(?direction, "travel interrupted by stop");
                self.snapshot()
            }
        };
        drop(relays);
        entity
    }

    async fn transition(&self, state: CoverState) -> Result<Entity, RollerError> {
        *self.lock_state() = state;
        let entity = self.snapshot()?;
        self.notifier.state_changed(entity.clone()).await?;
        Ok(entity)
    }

    /// Entity as the host should currently display it.
    ///
    /// # Errors
    ///
    /// Returns [`RollerError::Domain`] if the entity fails validation.
    pub fn snapshot(&self) -> Result<Entity, RollerError> {
        let state = self.state();
        let mut builder = Entity::builder()
            .id(self.id)
            .device_id(self.device_id)
            .entity_id(self.entity_id.as_str())
            .friendly_name(self.name.as_str())
            .state(state.into());
        if let Some(position) = state.position() {
            builder = builder.attribute("current_position", position);
        }
        Ok(builder.build()?)
    }

    /// Device and entity descriptors for registration with the host.
    ///
    /// # Errors
    ///
    /// Returns [`RollerError::Domain`] if a descriptor fails validation.
    pub fn discover(&self, integration: &str) -> Result<DiscoveredDevice, RollerError> {
        let device = Device::builder()
            .id(self.device_id)
            .name(self.name.as_str())
            .model(MODEL)
            .integration(integration)
            .unique_id(self.unique_id.as_str())
            .build()?;
        Ok(DiscoveredDevice {
            device,
            entities: vec![self.snapshot()?],
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, CoverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lowercase ASCII alphanumerics; every other run of characters becomes one
/// `_`, trimmed at both ends.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}
