//! # rollerhub-domain
//!
//! Pure domain model for the rollerhub cover controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (the physical roller motor behind a pair of relays)
//! - Define **Entities** (the state holder the host displays for each cover)
//! - Define **Covers** (the open / closed / unknown state machine and its services)
//! - Define **GPIO levels** and the relay logic that maps asserted/resting to them
//! - Define **Events** (state-change records)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod cover;
pub mod device;
pub mod entity;
pub mod event;
pub mod gpio;
pub mod service;
