use frota_core::EntityKind;

/// All errors that can be returned by an [`EntityStore`](crate::EntityStore)
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No entity with this id exists for the kind.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// The backend refused the record (duplicate document, business rule, ...).
    /// `reason` is shown to the user as is.
    #[error("{kind} rejected: {reason}")]
    Rejected { kind: EntityKind, reason: String },

    /// A backend-specific failure (I/O, serialization, connection).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        StorageError::Backend(err.to_string())
    }
}
