//! Entity persistence seam for Frota.
//!
//! [`EntityStore`] is the create/update operation a form submission ends in.
//! Two reference backends are provided: [`InMemoryStore`] and
//! [`DirectoryStore`] (one JSON file per entity). Any backend can be checked
//! with the [`conformance`] suite.
//!
//! [`AcknowledgmentStore`] keeps the per-notification "viewed" flag.

pub mod acknowledgment;
pub mod conformance;
mod directory;
mod error;
mod memory;
mod record;
mod traits;

pub use acknowledgment::{AcknowledgmentStore, InMemoryAcknowledgments};
pub use directory::DirectoryStore;
pub use error::StorageError;
pub use memory::InMemoryStore;
pub use record::{now_rfc3339, EntityId, StoredEntity, SubmitIntent};
pub use traits::EntityStore;
