//! Cancellable relay hold.
//!
//! A travel keeps its relay asserted for a fixed duration. Instead of an
//! unconditional sleep, the wait races a per-cover stop signal so a stop
//! command can end it early.

use std::time::Duration;

use tokio::sync::watch;

/// Outcome of [`StopListener::hold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HoldOutcome {
    Elapsed,
    Stopped,
}

/// Broadcasts stop requests to every in-flight hold of one cover.
pub(crate) struct StopSignal {
    tx: watch::Sender<u64>,
}

impl StopSignal {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx }
    }

    /// Start listening. Only stops raised after this call are seen.
    pub(crate) fn listen(&self) -> StopListener {
        StopListener {
            rx: self.tx.subscribe(),
        }
    }

    pub(crate) fn raise(&self) {
        self.tx.send_modify(|raised| *raised = raised.wrapping_add(1));
    }
}

pub(crate) struct StopListener {
    rx: watch::Receiver<u64>,
}

impl StopListener {
    /// Whether a stop was raised since [`StopSignal::listen`].
    pub(crate) fn is_stopped(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for `duration`, or less if a stop is raised meanwhile.
    pub(crate) async fn hold(mut self, duration: Duration) -> HoldOutcome {
        tokio::select! {
            () = tokio::time::sleep(duration) => HoldOutcome::Elapsed,
            Ok(()) = self.rx.changed() => HoldOutcome::Stopped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn should_elapse_full_duration_without_stop() {
        let signal = StopSignal::new();
        let started = Instant::now();
        let outcome = signal.listen().hold(Duration::from_secs(30)).await;
        assert_eq!(outcome, HoldOutcome::Elapsed);
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn should_end_early_when_stop_raised() {
        let signal = StopSignal::new();
        let listener = signal.listen();
        let started = Instant::now();

        let (outcome, ()) = tokio::join!(listener.hold(Duration::from_secs(30)), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            signal.raise();
        });

        assert_eq!(outcome, HoldOutcome::Stopped);
        assert!(started.elapsed() < Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn should_ignore_stops_raised_before_listening() {
        let signal = StopSignal::new();
        signal.raise();
        let listener = signal.listen();
        assert!(!listener.is_stopped());
        assert_eq!(
            listener.hold(Duration::from_secs(1)).await,
            HoldOutcome::Elapsed
        );
    }

    #[test]
    fn should_report_stop_raised_after_listening() {
        let signal = StopSignal::new();
        let listener = signal.listen();
        signal.raise();
        assert!(listener.is_stopped());
    }
}
