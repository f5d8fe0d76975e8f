//! Wall-clock timestamps for entity and event records.
//!
//! Relay hold timing does not use these; it runs on the tokio clock so it can
//! be paused in tests.

use chrono::{DateTime, Utc};

/// UTC timestamp stamped on `last_changed`, `last_updated` and events.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_be_monotonic_across_two_calls() {
        let first = now();
        let second = now();
        assert!(second >= first);
    }
}
