//! Form state and submission for Frota entities.
//!
//! A [`Form`] holds one in-progress record for an entity kind. Fields are set
//! one at a time, validated on touch or in full, and submitted through a
//! [`SubmissionCoordinator`] that talks to an
//! [`EntityStore`](frota_storage::EntityStore) with at most one call in
//! flight per form. Outcomes reach the UI through a [`Navigator`].

mod coordinator;
mod form;
mod navigation;
mod state;

pub use coordinator::{SubmissionCoordinator, SubmissionError, DEFAULT_TIMEOUT};
pub use form::Form;
pub use navigation::{NavigationEvent, Navigator, NoopNavigator, RecordingNavigator};
pub use state::{SubmissionOutcome, SubmissionState};
