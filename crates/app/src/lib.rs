//! # rollerhub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement or consume:
//!   - `GpioDriver`: configure pins as outputs and write levels
//!   - `Integration`: lifecycle and service calls of a device integration
//!   - `IntegrationContext`: where integrations persist what they discover
//!   - `StateNotifier`: how a device reports a state change to the host
//!   - `EventPublisher`: publish domain events
//! - Provide **in-process infrastructure** (event bus, in-memory registry)
//!   that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `rollerhub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod services;
