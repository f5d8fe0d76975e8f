//! Entity state: the value the host displays for a cover.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete state of a cover entity.
///
/// `Unavailable` is reserved for the host; the roller integration itself only
/// reports `Open`, `Closed` and `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityState {
    Open,
    Closed,
    #[default]
    Unknown,
    Unavailable,
}

impl EntityState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Unknown => "unknown",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
