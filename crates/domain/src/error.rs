//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`RollerHubError`] at port boundaries (no `String` variants).

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum RollerHubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A GPIO or driver failure. Never retried; surfaced to the caller as-is.
    #[error("hardware error")]
    Hardware(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("entity id must not be empty")]
    EmptyEntityId,

    #[error("at least one cover must be configured")]
    NoCovers,

    #[error("cover name {0:?} is used more than once")]
    DuplicateName(String),

    #[error("pin {pin} is claimed more than once (cover {cover:?})")]
    PinConflict { cover: String, pin: u8 },

    #[error("unknown service {0:?}")]
    UnknownService(String),
}

/// A lookup that found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
