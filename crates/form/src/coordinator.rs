use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use frota_core::{EntityKind, Record};
use frota_storage::{EntityId, EntityStore, StorageError, SubmitIntent};
use tokio::time::timeout;

use crate::navigation::Navigator;

/// Store call budget when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Store(#[from] StorageError),

    #[error("timed out after {} ms", .0.as_millis())]
    TimedOut(Duration),
}

/// Runs the create/update call for a form and hands outcomes to the
/// navigator. Cloning shares the store and navigator.
#[derive(Clone)]
pub struct SubmissionCoordinator {
    store: Arc<dyn EntityStore>,
    navigator: Arc<dyn Navigator>,
    timeout: Duration,
}

impl fmt::Debug for SubmissionCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionCoordinator")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl SubmissionCoordinator {
    pub fn new(store: Arc<dyn EntityStore>, navigator: Arc<dyn Navigator>) -> Self {
        SubmissionCoordinator {
            store,
            navigator,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// One store call, bounded by the timeout. Never retried.
    pub async fn perform(
        &self,
        kind: EntityKind,
        intent: SubmitIntent,
        record: &Record,
    ) -> Result<EntityId, SubmissionError> {
        let started = Instant::now();
        let update = matches!(intent, SubmitIntent::Update(_));
        tracing::info!(%kind, update, "submission started");

        match timeout(self.timeout, self.store.perform(kind, intent, record)).await {
            Ok(Ok(id)) => {
                tracing::info!(
                    %kind,
                    %id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "submission succeeded"
                );
                Ok(id)
            }
            Ok(Err(e)) => {
                tracing::warn!(%kind, error = %e, "submission failed");
                Err(SubmissionError::Store(e))
            }
            Err(_) => {
                tracing::warn!(
                    %kind,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "submission timed out"
                );
                Err(SubmissionError::TimedOut(self.timeout))
            }
        }
    }

    pub(crate) fn navigate_success(&self, kind: EntityKind, id: &EntityId) {
        self.navigator.on_success(kind, id);
    }

    pub(crate) fn navigate_cancel(&self) {
        self.navigator.on_cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_the_budget() {
        let err = SubmissionError::TimedOut(Duration::from_millis(250));
        assert_eq!(err.to_string(), "timed out after 250 ms");
    }

    #[test]
    fn store_error_message_passes_through() {
        let err = SubmissionError::from(StorageError::Backend("disk full".to_string()));
        assert!(err.to_string().contains("disk full"));
    }
}
