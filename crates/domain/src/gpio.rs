//! GPIO signal levels and the relay logic that maps relay intent onto them.
//!
//! A relay is either *asserted* (motor winding energised) or *resting*.
//! Which electrical level means which depends on the relay board: most boards
//! switch on a high input, "active low" boards switch on a low input and are
//! configured with `invert_logic`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// BCM pin number on the GPIO header.
pub type PinNumber = u8;

/// Binary output level written to a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    High,
}

impl Level {
    #[must_use]
    pub fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

impl std::ops::Not for Level {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => f.write_str("0"),
            Self::High => f.write_str("1"),
        }
    }
}

/// How relay intent maps to electrical levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayLogic {
    /// Asserted = high, resting = low.
    #[default]
    Normal,
    /// Asserted = low, resting = high.
    Inverted,
}

impl RelayLogic {
    #[must_use]
    pub fn from_invert_flag(invert_logic: bool) -> Self {
        if invert_logic {
            Self::Inverted
        } else {
            Self::Normal
        }
    }

    /// Level that energises the relay.
    #[must_use]
    pub fn asserted(self) -> Level {
        !self.resting()
    }

    /// Level that releases the relay. Pins are driven here on construction.
    #[must_use]
    pub fn resting(self) -> Level {
        match self {
            Self::Normal => Level::Low,
            Self::Inverted => Level::High,
        }
    }
}
