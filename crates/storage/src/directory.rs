use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use frota_core::{EntityKind, Record};
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::record::{now_rfc3339, EntityId, StoredEntity, SubmitIntent};
use crate::traits::EntityStore;

/// File-backed store: `<root>/<kind>/<id>.json`, one JSON document per entity.
///
/// Ids are sequential per kind. Writes go to a temporary file first and are
/// renamed into place, so a reader never sees a half-written entity. A single
/// store instance serializes its own writers; two processes sharing a
/// directory are not coordinated.
#[derive(Debug)]
pub struct DirectoryStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryStore {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn kind_dir(&self, kind: EntityKind) -> PathBuf {
        self.root.join(kind.as_str())
    }

    fn entity_path(&self, kind: EntityKind, n: u64) -> PathBuf {
        self.kind_dir(kind).join(format!("{}.json", n))
    }

    /// Numeric ids present on disk for `kind`, ascending.
    async fn ids(&self, kind: EntityKind) -> Result<Vec<u64>, StorageError> {
        let mut entries = match tokio::fs::read_dir(self.kind_dir(kind)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::backend(e)),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(StorageError::backend)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(n) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok())
            {
                ids.push(n);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    async fn read(&self, kind: EntityKind, id: &EntityId) -> Result<StoredEntity, StorageError> {
        let not_found = || StorageError::NotFound {
            kind,
            id: id.to_string(),
        };
        let n: u64 = id.as_str().parse().map_err(|_| not_found())?;
        let bytes = match tokio::fs::read(self.entity_path(kind, n)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(StorageError::backend(e)),
        };
        serde_json::from_slice(&bytes).map_err(StorageError::backend)
    }

    async fn write(&self, n: u64, entity: &StoredEntity) -> Result<(), StorageError> {
        let dir = self.kind_dir(entity.kind);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(StorageError::backend)?;

        let bytes = serde_json::to_vec_pretty(entity).map_err(StorageError::backend)?;
        let tmp = dir.join(format!(".{}.json.tmp", n));
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(StorageError::backend)?;
        tokio::fs::rename(&tmp, self.entity_path(entity.kind, n))
            .await
            .map_err(StorageError::backend)
    }
}

#[async_trait]
impl EntityStore for DirectoryStore {
    async fn perform(
        &self,
        kind: EntityKind,
        intent: SubmitIntent,
        record: &Record,
    ) -> Result<EntityId, StorageError> {
        let _guard = self.write_lock.lock().await;
        let now = now_rfc3339();

        match intent {
            SubmitIntent::Create => {
                let n = self.ids(kind).await?.last().copied().unwrap_or(0) + 1;
                let id = EntityId(n.to_string());
                let entity = StoredEntity {
                    kind,
                    id: id.clone(),
                    record: record.clone(),
                    created_at: now.clone(),
                    updated_at: now,
                };
                self.write(n, &entity).await?;
                tracing::debug!(%kind, %id, root = %self.root.display(), "entity written");
                Ok(id)
            }
            SubmitIntent::Update(id) => {
                let mut entity = self.read(kind, &id).await?;
                entity.record = record.clone();
                entity.updated_at = now;
                // read() succeeded, so the id is numeric.
                let n: u64 = id.as_str().parse().map_err(StorageError::backend)?;
                self.write(n, &entity).await?;
                tracing::debug!(%kind, %id, root = %self.root.display(), "entity rewritten");
                Ok(id)
            }
        }
    }

    async fn get(&self, kind: EntityKind, id: &EntityId) -> Result<StoredEntity, StorageError> {
        self.read(kind, id).await
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<StoredEntity>, StorageError> {
        let mut out = Vec::new();
        for n in self.ids(kind).await? {
            out.push(self.read(kind, &EntityId(n.to_string())).await?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn writes_one_file_per_entity() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let record = json!({ "name": "Gestor" }).as_object().cloned().unwrap();

        let id = store
            .perform(EntityKind::AccessLevel, SubmitIntent::Create, &record)
            .await
            .unwrap();
        assert_eq!(id.as_str(), "1");
        assert!(dir.path().join("access_level").join("1.json").exists());
    }

    #[tokio::test]
    async fn ids_continue_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let record = json!({ "n": 1 }).as_object().cloned().unwrap();
        {
            let store = DirectoryStore::new(dir.path());
            store
                .perform(EntityKind::User, SubmitIntent::Create, &record)
                .await
                .unwrap();
        }
        let reopened = DirectoryStore::new(dir.path());
        let id = reopened
            .perform(EntityKind::User, SubmitIntent::Create, &record)
            .await
            .unwrap();
        assert_eq!(id.as_str(), "2");
    }

    #[tokio::test]
    async fn ignores_stray_files() {
        let dir = tempfile::tempdir().unwrap();
        let kind_dir = dir.path().join("user");
        std::fs::create_dir_all(&kind_dir).unwrap();
        std::fs::write(kind_dir.join("README.txt"), "notes").unwrap();
        std::fs::write(kind_dir.join("draft.json"), "{}").unwrap();

        let store = DirectoryStore::new(dir.path());
        assert!(store.list(EntityKind::User).await.unwrap().is_empty());
    }
}
