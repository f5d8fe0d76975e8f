//! Roller cover configuration.
//!
//! ```toml
//! relay_time = 30        # seconds a relay stays asserted, default 30
//! invert_logic = false   # active-low relay board, default false
//!
//! [[covers]]
//! name = "Living room"
//! relay_pin_up = 17
//! relay_pin_down = 18
//! ```
//!
//! `relay_time` and `invert_logic` are coerced the way a hand-written config
//! file tends to need: `relay_time = "30"` and `invert_logic = "yes"` are
//! accepted. A single `[covers]` table is read as a one-element list.

use std::collections::HashSet;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::Deserialize;

use rollerhub_domain::error::{RollerHubError, ValidationError};
use rollerhub_domain::gpio::{PinNumber, RelayLogic};

use crate::cover::slugify;

pub const DEFAULT_RELAY_TIME_SECS: u64 = 30;

/// Configuration for the roller cover integration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RollerConfig {
    #[serde(deserialize_with = "one_or_many")]
    pub covers: Vec<CoverConfig>,
    /// Seconds a relay is held asserted for a full travel.
    #[serde(default = "default_relay_time", deserialize_with = "coerce_secs")]
    pub relay_time: u64,
    /// Relays switch on a low level.
    #[serde(default, deserialize_with = "coerce_bool")]
    pub invert_logic: bool,
    /// Platform key carried by shared host config files. Read and ignored.
    #[serde(default)]
    pub platform: Option<String>,
}

/// One cover: a name and its relay pins.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoverConfig {
    pub name: String,
    pub relay_pin_up: PinNumber,
    pub relay_pin_down: PinNumber,
}

/// Settings shared by every cover of one integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaySettings {
    pub relay_time: Duration,
    pub logic: RelayLogic,
}

impl RollerConfig {
    #[must_use]
    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            relay_time: Duration::from_secs(self.relay_time),
            logic: RelayLogic::from_invert_flag(self.invert_logic),
        }
    }

    /// Check what serde cannot: a non-empty cover list, usable unique names,
    /// and pins that belong to exactly one relay.
    ///
    /// # Errors
    ///
    /// Returns [`RollerHubError::Validation`] with the first problem found.
    pub fn validate(&self) -> Result<(), RollerHubError> {
        if self.covers.is_empty() {
            return Err(ValidationError::NoCovers.into());
        }
        let mut slugs = HashSet::new();
        let mut pins = HashSet::new();
        for cover in &self.covers {
            let slug = slugify(&cover.name);
            if slug.is_empty() {
                return Err(ValidationError::EmptyName.into());
            }
            if !slugs.insert(slug) {
                return Err(ValidationError::DuplicateName(cover.name.clone()).into());
            }
            for pin in [cover.relay_pin_up, cover.relay_pin_down] {
                if !pins.insert(pin) {
                    return Err(ValidationError::PinConflict {
                        cover: cover.name.clone(),
                        pin,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

fn default_relay_time() -> u64 {
    DEFAULT_RELAY_TIME_SECS
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

fn coerce_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = match Loose::deserialize(deserializer)? {
        Loose::Int(value) => value,
        #[allow(clippy::cast_possible_truncation)]
        Loose::Float(value) if value.is_finite() => value.trunc() as i64,
        Loose::Text(text) => match text.trim().parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                return Err(de::Error::custom(format!(
                    "relay_time {text:?} is not an integer"
                )));
            }
        },
        Loose::Float(_) | Loose::Bool(_) => {
            return Err(de::Error::custom("relay_time must be an integer"));
        }
    };
    u64::try_from(secs).map_err(|_| de::Error::custom("relay_time must not be negative"))
}

fn coerce_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Loose::deserialize(deserializer)? {
        Loose::Bool(value) => Ok(value),
        Loose::Int(0) => Ok(false),
        Loose::Int(1) => Ok(true),
        Loose::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(de::Error::custom(format!(
                "invert_logic {text:?} is not a boolean"
            ))),
        },
        Loose::Int(_) | Loose::Float(_) => Err(de::Error::custom("invert_logic must be a boolean")),
    }
}
