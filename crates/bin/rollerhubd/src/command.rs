//! Line-oriented command protocol read from stdin.
//!
//! ```text
//! cover.living_room open_cover
//! cover.living_room stop
//! list
//! quit
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use rollerhub_domain::error::ValidationError;
use rollerhub_domain::service::CoverService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Invoke `service` on the cover registered as `entity_id`.
    Call {
        entity_id: String,
        service: CoverService,
    },
    /// Print every registered cover and its state.
    List,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("expected `<entity_id> <service>`, `list` or `quit`, got {0:?}")]
    Malformed(String),
    #[error(transparent)]
    Service(#[from] ValidationError),
}

/// Parse one input line. `Ok(None)` means there is nothing to do.
///
/// # Errors
///
/// Returns [`CommandError`] when the line is not a known command.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    let command = match words.as_slice() {
        ["list"] => Command::List,
        ["quit" | "exit"] => Command::Quit,
        [entity_id, service] => Command::Call {
            entity_id: (*entity_id).to_string(),
            service: service.parse()?,
        },
        _ => return Err(CommandError::Malformed(line.to_string())),
    };
    Ok(Some(command))
}
