//! # rollerhub-adapter-rpi-gpio-roller
//!
//! Roller cover integration: drives blinds and shutters through two relays
//! per cover on GPIO pins.
//!
//! ## How it works
//!
//! Each configured cover owns an up relay and a down relay wired to the two
//! windings of its motor. Opening asserts the up relay for `relay_time`
//! seconds, closing does the same with the down relay, stopping rests both.
//! There is no position feedback: a cover is *open* or *closed* only after a
//! full travel, and *unknown* on startup and after a stop.
//!
//! ## Services
//!
//! | Service | Effect |
//! |---------|--------|
//! | `open_cover` | Pulse the up relay, state becomes `open` |
//! | `close_cover` | Pulse the down relay, state becomes `closed` |
//! | `stop_cover` | Rest both relays (cuts a running travel short), state becomes `unknown` |
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `rollerhub-app` and `rollerhub-domain`.

mod config;
mod cover;
mod error;
mod hold;
mod relay;
#[cfg(test)]
mod testing;

pub use config::{CoverConfig, DEFAULT_RELAY_TIME_SECS, RelaySettings, RollerConfig};
pub use cover::{RollerCover, slugify};
pub use error::RollerError;

use std::collections::HashMap;
use std::sync::Arc;

use rollerhub_app::ports::{GpioDriver, Integration, IntegrationContext, StateNotifier};
use rollerhub_domain::entity::Entity;
use rollerhub_domain::error::{NotFoundError, RollerHubError};
use rollerhub_domain::id::EntityId;
use rollerhub_domain::service::CoverService;

const INTEGRATION_NAME: &str = "rpi_gpio_roller";

/// Integration owning every configured roller cover.
pub struct RollerIntegration<G, N> {
    config: RollerConfig,
    gpio: Arc<G>,
    notifier: N,
    covers: HashMap<EntityId, Arc<RollerCover<G, N>>>,
}

impl<G, N> RollerIntegration<G, N> {
    /// Create the integration. No pin is touched before [`Integration::setup`].
    #[must_use]
    pub fn new(config: RollerConfig, gpio: Arc<G>, notifier: N) -> Self {
        Self {
            config,
            gpio,
            notifier,
            covers: HashMap::new(),
        }
    }

    /// Check whether this integration owns the given entity.
    #[must_use]
    pub fn owns_entity(&self, entity_id: EntityId) -> bool {
        self.covers.contains_key(&entity_id)
    }

    #[must_use]
    pub fn cover(&self, entity_id: EntityId) -> Option<&Arc<RollerCover<G, N>>> {
        self.covers.get(&entity_id)
    }

    pub fn covers(&self) -> impl Iterator<Item = &Arc<RollerCover<G, N>>> {
        self.covers.values()
    }
}

impl<G, N> Integration for RollerIntegration<G, N>
where
    G: GpioDriver + 'static,
    N: StateNotifier + Clone + 'static,
{
    fn name(&self) -> &'static str {
        INTEGRATION_NAME
    }

    async fn setup(&mut self, ctx: &impl IntegrationContext) -> Result<(), RollerHubError> {
        self.config.validate()?;
        let settings = self.config.relay_settings();
        self.covers.clear();

        for cover_config in &self.config.covers {
            let cover = RollerCover::new(
                cover_config,
                settings,
                Arc::clone(&self.gpio),
                self.notifier.clone(),
            )?;
            ctx.persist_discovered(cover.discover(INTEGRATION_NAME)?)
                .await?;
            tracing::debug!(
                cover = cover.name(),
                entity_id = cover.entity_id(),
                "cover registered"
            );
            self.covers.insert(cover.id(), Arc::new(cover));
        }

        tracing::info!(
            count = self.covers.len(),
            relay_time_secs = self.config.relay_time,
            invert_logic = self.config.invert_logic,
            "roller covers ready"
        );
        Ok(())
    }

    async fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        _data: serde_json::Value,
    ) -> Result<Entity, RollerHubError> {
        let cover = self.covers.get(&entity_id).ok_or_else(|| NotFoundError {
            entity: "Entity",
            id: entity_id.to_string(),
        })?;
        let service: CoverService = service.parse()?;
        tracing::debug!(cover = cover.name(), %service, "service call");

        let entity = match service {
            CoverService::OpenCover => cover.open_cover().await?,
            CoverService::CloseCover => cover.close_cover().await?,
            CoverService::StopCover => cover.stop_cover().await?,
        };
        Ok(entity)
    }

    async fn teardown(&mut self) -> Result<(), RollerHubError> {
        for cover in self.covers.values() {
            if let Err(err) = cover.stop_cover().await {
                tracing::warn!(cover = cover.name(), error = %err, "failed to rest relays");
            }
        }
        self.covers.clear();
        tracing::info!("roller integration stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollerhub_adapter_gpio_virtual::VirtualGpio;
    use rollerhub_app::event_bus::InProcessEventBus;
    use rollerhub_app::services::registry::InMemoryRegistry;
    use rollerhub_domain::entity::EntityState;
    use rollerhub_domain::error::ValidationError;
    use rollerhub_domain::gpio::Level;

    use crate::testing::RecordingNotifier;

    type Registry = Arc<InMemoryRegistry<Arc<InProcessEventBus>>>;

    fn config(covers: &[(&str, u8, u8)]) -> RollerConfig {
        RollerConfig {
            covers: covers
                .iter()
                .map(|&(name, up, down)| CoverConfig {
                    name: name.to_string(),
                    relay_pin_up: up,
                    relay_pin_down: down,
                })
                .collect(),
            relay_time: 2,
            invert_logic: false,
            platform: None,
        }
    }

    fn registry() -> Registry {
        Arc::new(InMemoryRegistry::new(Arc::new(InProcessEventBus::new(64))))
    }

    async fn ready(
        covers: &[(&str, u8, u8)],
    ) -> (RollerIntegration<VirtualGpio, Registry>, Arc<VirtualGpio>, Registry) {
        let gpio = Arc::new(VirtualGpio::new());
        let registry = registry();
        let mut integration =
            RollerIntegration::new(config(covers), Arc::clone(&gpio), Arc::clone(&registry));
        integration.setup(&registry).await.unwrap();
        (integration, gpio, registry)
    }

    fn entity_id_of(
        integration: &RollerIntegration<VirtualGpio, Registry>,
        key: &str,
    ) -> EntityId {
        integration
            .covers()
            .find(|cover| cover.entity_id() == key)
            .unwrap()
            .id()
    }

    #[test]
    fn should_return_rpi_gpio_roller_as_name() {
        let integration = RollerIntegration::new(
            config(&[("Blind1", 17, 18)]),
            Arc::new(VirtualGpio::new()),
            RecordingNotifier::default(),
        );
        assert_eq!(integration.name(), "rpi_gpio_roller");
    }

    #[test]
    fn should_not_touch_pins_before_setup() {
        let gpio = Arc::new(VirtualGpio::new());
        let _integration = RollerIntegration::new(
            config(&[("Blind1", 17, 18)]),
            Arc::clone(&gpio),
            RecordingNotifier::default(),
        );
        assert!(gpio.history().is_empty());
    }

    #[tokio::test]
    async fn should_build_one_cover_per_config_entry() {
        let (integration, gpio, registry) =
            ready(&[("Blind1", 17, 18), ("Blind2", 22, 23), ("Shutter", 5, 6)]).await;

        assert_eq!(integration.covers().count(), 3);
        assert_eq!(registry.list_devices().len(), 3);
        assert_eq!(registry.list_entities().len(), 3);
        for pin in [17, 18, 22, 23, 5, 6] {
            assert_eq!(gpio.level(pin), Some(Level::Low), "pin {pin}");
        }
    }

    #[tokio::test]
    async fn should_register_covers_in_unknown_state() {
        let (_integration, _gpio, registry) = ready(&[("Blind1", 17, 18)]).await;
        let entity = registry.get_entity("cover.blind1").unwrap();
        assert_eq!(entity.state, EntityState::Unknown);
        assert_eq!(entity.friendly_name, "Blind1");
        assert_eq!(registry.list_devices()[0].unique_id, "RollerCover.Blind1");
    }

    #[tokio::test]
    async fn should_reject_invalid_config_during_setup() {
        let gpio = Arc::new(VirtualGpio::new());
        let registry = registry();
        let mut integration =
            RollerIntegration::new(config(&[]), Arc::clone(&gpio), Arc::clone(&registry));

        let result = integration.setup(&registry).await;
        assert!(matches!(
            result,
            Err(RollerHubError::Validation(ValidationError::NoCovers))
        ));
        assert!(gpio.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_open_cover_and_update_registry() {
        let (integration, _gpio, registry) = ready(&[("Blind1", 17, 18)]).await;
        let id = entity_id_of(&integration, "cover.blind1");

        let entity = integration
            .handle_service_call(id, "open_cover", serde_json::json!({}))
            .await
            .unwrap();

        assert_eq!(entity.state, EntityState::Open);
        assert_eq!(
            registry.get_entity("cover.blind1").unwrap().state,
            EntityState::Open
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_accept_short_service_names() {
        let (integration, _gpio, _registry) = ready(&[("Blind1", 17, 18)]).await;
        let id = entity_id_of(&integration, "cover.blind1");

        let entity = integration
            .handle_service_call(id, "close", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(entity.state, EntityState::Closed);
    }

    #[tokio::test]
    async fn should_reject_unknown_service() {
        let (integration, gpio, _registry) = ready(&[("Blind1", 17, 18)]).await;
        let id = entity_id_of(&integration, "cover.blind1");
        gpio.clear_history();

        let result = integration
            .handle_service_call(id, "turn_on", serde_json::json!({}))
            .await;
        assert!(matches!(
            result,
            Err(RollerHubError::Validation(ValidationError::UnknownService(_)))
        ));
        assert!(gpio.history().is_empty());
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_entity() {
        let (integration, _gpio, _registry) = ready(&[("Blind1", 17, 18)]).await;
        let result = integration
            .handle_service_call(EntityId::new(), "open_cover", serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(RollerHubError::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn should_surface_pin_failure_as_hardware_error() {
        let (integration, gpio, _registry) = ready(&[("Blind1", 17, 18)]).await;
        let id = entity_id_of(&integration, "cover.blind1");
        gpio.fail_writes_on(17);

        let result = integration
            .handle_service_call(id, "open_cover", serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(RollerHubError::Hardware(_))));
    }

    #[tokio::test]
    async fn should_own_registered_covers_only() {
        let (integration, _gpio, _registry) = ready(&[("Blind1", 17, 18)]).await;
        let id = entity_id_of(&integration, "cover.blind1");
        assert!(integration.owns_entity(id));
        assert!(integration.cover(id).is_some());
        assert!(!integration.owns_entity(EntityId::new()));
    }

    #[tokio::test(start_paused = true)]
    async fn should_rest_relays_and_forget_covers_on_teardown() {
        let (mut integration, gpio, registry) = ready(&[("Blind1", 17, 18)]).await;
        let id = entity_id_of(&integration, "cover.blind1");
        integration
            .handle_service_call(id, "close_cover", serde_json::json!({}))
            .await
            .unwrap();
        gpio.clear_history();

        integration.teardown().await.unwrap();

        assert_eq!(gpio.writes(), vec![(17, Level::Low), (18, Level::Low)]);
        assert_eq!(integration.covers().count(), 0);
        assert_eq!(
            registry.get_entity("cover.blind1").unwrap().state,
            EntityState::Unknown
        );
    }
}
