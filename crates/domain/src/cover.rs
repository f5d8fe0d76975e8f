//! Cover state machine: where a roller cover is believed to be.
//!
//! There is no position feedback: the state only records which full travel
//! last completed. A stop (or a fresh start) leaves the position unknown.

use serde::{Deserialize, Serialize};

use crate::entity::EntityState;

/// Position reported for a fully open cover.
pub const POSITION_OPEN: u8 = 100;
/// Position reported for a fully closed cover.
pub const POSITION_CLOSED: u8 = 0;

/// Believed position of a cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverState {
    Open,
    Closed,
    /// Entered on construction and after a stop.
    #[default]
    Unknown,
}

impl CoverState {
    /// `Some(100)` when open, `Some(0)` when closed, `None` when unknown.
    #[must_use]
    pub fn position(self) -> Option<u8> {
        match self {
            Self::Open => Some(POSITION_OPEN),
            Self::Closed => Some(POSITION_CLOSED),
            Self::Unknown => None,
        }
    }

    /// `None` when the position is unknown: a stopped cover is not assumed
    /// to be closed.
    #[must_use]
    pub fn is_closed(self) -> Option<bool> {
        self.position().map(|position| position == POSITION_CLOSED)
    }
}

impl From<CoverState> for EntityState {
    fn from(state: CoverState) -> Self {
        match state {
            CoverState::Open => Self::Open,
            CoverState::Closed => Self::Closed,
            CoverState::Unknown => Self::Unknown,
        }
    }
}

/// Direction of travel; selects which relay of the pair drives the motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// State reached once a full travel in this direction completes.
    #[must_use]
    pub fn target(self) -> CoverState {
        match self {
            Self::Up => CoverState::Open,
            Self::Down => CoverState::Closed,
        }
    }
}
