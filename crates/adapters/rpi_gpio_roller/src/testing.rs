//! Test doubles shared by the unit tests of this crate.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rollerhub_app::ports::StateNotifier;
use rollerhub_domain::entity::Entity;
use rollerhub_domain::error::RollerHubError;

/// Remembers every snapshot it is notified with.
#[derive(Clone, Default)]
pub(crate) struct RecordingNotifier {
    entities: Arc<Mutex<Vec<Entity>>>,
    first_delay: Option<Duration>,
}

impl RecordingNotifier {
    /// A host that takes `delay` to accept its first update.
    pub(crate) fn slow_to_start(delay: Duration) -> Self {
        Self {
            first_delay: Some(delay),
            ..Self::default()
        }
    }

    pub(crate) fn entities(&self) -> Vec<Entity> {
        self.entities.lock().unwrap().clone()
    }
}

impl StateNotifier for RecordingNotifier {
    async fn state_changed(&self, entity: Entity) -> Result<(), RollerHubError> {
        let first = self.entities.lock().unwrap().is_empty();
        if let (true, Some(delay)) = (first, self.first_delay) {
            tokio::time::sleep(delay).await;
        }
        self.entities.lock().unwrap().push(entity);
        Ok(())
    }
}
