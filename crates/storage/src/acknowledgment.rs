//! Notification acknowledgments.
//!
//! The back office remembers which notifications a user has already seen,
//! keyed by the notification identifier. The first acknowledgment wins:
//! acknowledging again keeps the original timestamp.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::error::StorageError;

#[async_trait]
pub trait AcknowledgmentStore: Send + Sync + 'static {
    /// Mark `notification_id` as seen at `at`. No-op if already acknowledged.
    async fn acknowledge(&self, notification_id: &str, at: OffsetDateTime)
        -> Result<(), StorageError>;

    /// When `notification_id` was first acknowledged, if ever.
    async fn acknowledged_at(
        &self,
        notification_id: &str,
    ) -> Result<Option<OffsetDateTime>, StorageError>;

    async fn is_acknowledged(&self, notification_id: &str) -> Result<bool, StorageError> {
        Ok(self.acknowledged_at(notification_id).await?.is_some())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAcknowledgments {
    seen: Mutex<HashMap<String, OffsetDateTime>>,
}

impl InMemoryAcknowledgments {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AcknowledgmentStore for InMemoryAcknowledgments {
    async fn acknowledge(
        &self,
        notification_id: &str,
        at: OffsetDateTime,
    ) -> Result<(), StorageError> {
        let mut seen = self.seen.lock().await;
        seen.entry(notification_id.to_string()).or_insert(at);
        tracing::trace!(notification_id, "notification acknowledged");
        Ok(())
    }

    async fn acknowledged_at(
        &self,
        notification_id: &str,
    ) -> Result<Option<OffsetDateTime>, StorageError> {
        Ok(self.seen.lock().await.get(notification_id).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[tokio::test]
    async fn first_acknowledgment_wins() {
        let acks = InMemoryAcknowledgments::new();
        assert!(!acks.is_acknowledged("n-1").await.unwrap());

        acks.acknowledge("n-1", datetime!(2026-03-01 09:00 UTC))
            .await
            .unwrap();
        acks.acknowledge("n-1", datetime!(2026-03-02 09:00 UTC))
            .await
            .unwrap();

        assert!(acks.is_acknowledged("n-1").await.unwrap());
        assert_eq!(
            acks.acknowledged_at("n-1").await.unwrap(),
            Some(datetime!(2026-03-01 09:00 UTC))
        );
        assert!(!acks.is_acknowledged("n-2").await.unwrap());
    }
}
