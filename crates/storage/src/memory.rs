use std::collections::BTreeMap;

use async_trait::async_trait;
use frota_core::{EntityKind, Record};
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::record::{now_rfc3339, EntityId, StoredEntity, SubmitIntent};
use crate::traits::EntityStore;

/// Process-local store. Ids are sequential per kind, starting at 1.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    last_id: BTreeMap<EntityKind, u64>,
    entities: BTreeMap<EntityKind, BTreeMap<u64, StoredEntity>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities held for `kind`.
    pub async fn count(&self, kind: EntityKind) -> usize {
        let inner = self.inner.lock().await;
        inner.entities.get(&kind).map_or(0, BTreeMap::len)
    }
}

fn not_found(kind: EntityKind, id: &EntityId) -> StorageError {
    StorageError::NotFound {
        kind,
        id: id.to_string(),
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn perform(
        &self,
        kind: EntityKind,
        intent: SubmitIntent,
        record: &Record,
    ) -> Result<EntityId, StorageError> {
        let mut inner = self.inner.lock().await;
        let now = now_rfc3339();

        match intent {
            SubmitIntent::Create => {
                let last = inner.last_id.entry(kind).or_insert(0);
                *last += 1;
                let n = *last;
                let id = EntityId(n.to_string());
                inner.entities.entry(kind).or_default().insert(
                    n,
                    StoredEntity {
                        kind,
                        id: id.clone(),
                        record: record.clone(),
                        created_at: now.clone(),
                        updated_at: now,
                    },
                );
                tracing::debug!(%kind, %id, "entity created");
                Ok(id)
            }
            SubmitIntent::Update(id) => {
                let n: u64 = id.as_str().parse().map_err(|_| not_found(kind, &id))?;
                let entity = inner
                    .entities
                    .get_mut(&kind)
                    .and_then(|by_id| by_id.get_mut(&n))
                    .ok_or_else(|| not_found(kind, &id))?;
                entity.record = record.clone();
                entity.updated_at = now;
                tracing::debug!(%kind, %id, "entity updated");
                Ok(id)
            }
        }
    }

    async fn get(&self, kind: EntityKind, id: &EntityId) -> Result<StoredEntity, StorageError> {
        let n: u64 = id.as_str().parse().map_err(|_| not_found(kind, id))?;
        let inner = self.inner.lock().await;
        inner
            .entities
            .get(&kind)
            .and_then(|by_id| by_id.get(&n))
            .cloned()
            .ok_or_else(|| not_found(kind, id))
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<StoredEntity>, StorageError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .entities
            .get(&kind)
            .map(|by_id| by_id.values().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn ids_are_sequential_per_kind() {
        let store = InMemoryStore::new();
        let r = record(json!({ "name": "x" }));
        let a = store.perform(EntityKind::User, SubmitIntent::Create, &r).await.unwrap();
        let b = store.perform(EntityKind::User, SubmitIntent::Create, &r).await.unwrap();
        let c = store.perform(EntityKind::Supplier, SubmitIntent::Create, &r).await.unwrap();
        assert_eq!((a.as_str(), b.as_str(), c.as_str()), ("1", "2", "1"));
        assert_eq!(store.count(EntityKind::User).await, 2);
    }

    #[tokio::test]
    async fn update_keeps_created_at() {
        let store = InMemoryStore::new();
        let id = store
            .perform(EntityKind::Contract, SubmitIntent::Create, &record(json!({ "v": 1 })))
            .await
            .unwrap();
        let before = store.get(EntityKind::Contract, &id).await.unwrap();
        store
            .perform(
                EntityKind::Contract,
                SubmitIntent::Update(id.clone()),
                &record(json!({ "v": 2 })),
            )
            .await
            .unwrap();
        let after = store.get(EntityKind::Contract, &id).await.unwrap();
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.record["v"], json!(2));
    }

    #[tokio::test]
    async fn non_numeric_id_is_not_found() {
        let store = InMemoryStore::new();
        let err = store
            .get(EntityKind::User, &EntityId::from("abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }
}
