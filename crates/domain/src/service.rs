//! Service: a callable command exposed by an integration.
//!
//! Covers understand `open_cover`, `close_cover` and `stop_cover`.

use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Commands a cover entity accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverService {
    OpenCover,
    CloseCover,
    StopCover,
}

impl CoverService {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenCover => "open_cover",
            Self::CloseCover => "close_cover",
            Self::StopCover => "stop_cover",
        }
    }
}

impl FromStr for CoverService {
    type Err = ValidationError;

    /// Accepts the full service names and the short `open` / `close` / `stop`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open_cover" | "open" => Ok(Self::OpenCover),
            "close_cover" | "close" => Ok(Self::CloseCover),
            "stop_cover" | "stop" => Ok(Self::StopCover),
            other => Err(ValidationError::UnknownService(other.to_string())),
        }
    }
}

impl fmt::Display for CoverService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
