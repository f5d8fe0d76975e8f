//! # rollerhubd: rollerhub daemon
//!
//! Composition root that wires the roller integration to a GPIO backend and
//! drives it from commands read on stdin.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise logging
//! - Pick the GPIO driver (virtual or `rppal`)
//! - Construct the registry and event bus, set up the integration
//! - Run cover commands concurrently so `stop` can cut a travel short
//! - On Ctrl-C or `quit`, abort pending commands and rest every relay
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod command;
mod config;

use std::error::Error;
use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing_subscriber::EnvFilter;

use rollerhub_adapter_gpio_virtual::VirtualGpio;
use rollerhub_adapter_rpi_gpio_roller::RollerIntegration;
use rollerhub_app::event_bus::InProcessEventBus;
use rollerhub_app::ports::{GpioDriver, Integration};
use rollerhub_app::services::registry::InMemoryRegistry;
use rollerhub_domain::cover::POSITION_OPEN;
use rollerhub_domain::event::Event;

use crate::command::Command;
use crate::config::{Config, GpioBackend};

type Registry = Arc<InMemoryRegistry<Arc<InProcessEventBus>>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging.filter);

    match config.gpio.backend {
        GpioBackend::Virtual => {
            tracing::info!("using virtual GPIO");
            run(&config, Arc::new(VirtualGpio::new())).await
        }
        #[cfg(feature = "raspberry_pi")]
        GpioBackend::Rppal => {
            let gpio = rollerhub_adapter_gpio_rppal::RppalGpio::new()
                .context("failed to open the GPIO peripheral")?;
            run(&config, Arc::new(gpio)).await
        }
        #[cfg(not(feature = "raspberry_pi"))]
        GpioBackend::Rppal => anyhow::bail!("rollerhubd was built without the raspberry_pi feature"),
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run<G: GpioDriver + 'static>(config: &Config, gpio: Arc<G>) -> anyhow::Result<()> {
    let bus = Arc::new(InProcessEventBus::new(256));
    let registry: Registry = Arc::new(InMemoryRegistry::new(Arc::clone(&bus)));
    let event_log = tokio::spawn(log_events(bus.subscribe()));
    drop(bus);

    let mut integration =
        RollerIntegration::new(config.roller()?.clone(), gpio, Arc::clone(&registry));
    integration
        .setup(&registry)
        .await
        .context("failed to set up the roller integration")?;
    let integration = Arc::new(integration);

    let mut pending = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    tracing::info!("rollerhubd ready, reading commands from stdin");

    loop {
        if !stdin_open && pending.is_empty() {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
            Some(joined) = pending.join_next(), if !pending.is_empty() => {
                if let Err(err) = joined {
                    if !err.is_cancelled() {
                        tracing::error!(error = %err, "command task failed");
                    }
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("failed to read stdin")? else {
                    tracing::debug!("stdin closed, waiting for running commands");
                    stdin_open = false;
                    continue;
                };
                match command::parse(&line) {
                    Ok(None) => {}
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(Command::List)) => print_covers(&registry),
                    Ok(Some(Command::Call { entity_id, service })) => {
                        let Some(entity) = registry
                            .find_entity(&entity_id)
                            .filter(|entity| integration.owns_entity(entity.id))
                        else {
                            tracing::warn!(%entity_id, "no such cover");
                            continue;
                        };
                        let integration = Arc::clone(&integration);
                        pending.spawn(async move {
                            match integration
                                .handle_service_call(entity.id, service.as_str(), serde_json::Value::Null)
                                .await
                            {
                                Ok(entity) => tracing::info!(
                                    entity_id = %entity.entity_id,
                                    state = %entity.state,
                                    %service,
                                    "command done"
                                ),
                                Err(err) => tracing::error!(
                                    %entity_id,
                                    %service,
                                    error = %report(&err),
                                    "command failed"
                                ),
                            }
                        });
                    }
                    Err(err) => tracing::warn!(error = %err, "ignoring command"),
                }
            }
        }
    }

    pending.abort_all();
    while pending.join_next().await.is_some() {}

    let mut integration = Arc::into_inner(integration)
        .context("integration still shared after every command finished")?;
    integration.teardown().await?;
    drop(integration);
    drop(registry);

    // The log task ends once the last bus handle is gone.
    if let Err(err) = event_log.await {
        tracing::warn!(error = %err, "event log task failed");
    }
    tracing::info!("rollerhubd stopped");
    Ok(())
}

async fn log_events(rx: broadcast::Receiver<Event>) {
    let mut events = BroadcastStream::new(rx);
    while let Some(item) = events.next().await {
        match item {
            Ok(event) => tracing::info!(
                event_type = %event.event_type,
                data = %event.data,
                "event"
            ),
            Err(BroadcastStreamRecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "event log lagged, some events were dropped");
            }
        }
    }
}

fn print_covers(registry: &Registry) {
    for entity in registry.list_entities() {
        let position = entity
            .get_attribute("current_position")
            .map_or_else(|| "?".to_string(), ToString::to_string);
        println!(
            "{:<24} {:<8} {position}/{POSITION_OPEN}  {}",
            entity.entity_id, entity.state, entity.friendly_name
        );
    }
}

fn report(err: &dyn Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, ": {cause}");
        source = cause.source();
    }
    out
}
