use async_trait::async_trait;
use frota_core::{EntityKind, Record};

use crate::error::StorageError;
use crate::record::{EntityId, StoredEntity, SubmitIntent};

/// The create/update operation behind every entity form.
///
/// `perform` receives records that already passed schema validation. It must
/// eventually settle; callers still wrap it in a timeout.
///
/// Implementations must be `Send + Sync + 'static` so a single store can be
/// shared by every open form.
#[async_trait]
pub trait EntityStore: Send + Sync + 'static {
    /// Create a new entity, or replace the record of an existing one.
    ///
    /// Returns the id of the created or updated entity. Updating an id that
    /// does not exist returns `Err(StorageError::NotFound)`.
    async fn perform(
        &self,
        kind: EntityKind,
        intent: SubmitIntent,
        record: &Record,
    ) -> Result<EntityId, StorageError>;

    /// Read one entity. Returns `Err(StorageError::NotFound)` if absent.
    async fn get(&self, kind: EntityKind, id: &EntityId) -> Result<StoredEntity, StorageError>;

    /// All entities of a kind, oldest first.
    async fn list(&self, kind: EntityKind) -> Result<Vec<StoredEntity>, StorageError>;
}
