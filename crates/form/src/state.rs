use frota_core::FieldError;
use frota_storage::EntityId;
use serde::Serialize;

/// Where a form is in its submission lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded(EntityId),
    Failed(String),
}

impl SubmissionState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionState::Submitting)
    }
}

/// What one call to [`Form::submit`](crate::Form::submit) came to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Validation failed; the store was never called.
    Invalid { errors: Vec<FieldError> },
    /// A new entity was created.
    Created { id: EntityId },
    /// An existing entity was updated (edit mode).
    Saved { id: EntityId },
    /// The store call failed or timed out. The form keeps its record.
    Failed { reason: String },
    /// The form was left before the store call settled; its result was dropped.
    Abandoned,
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SubmissionOutcome::Created { .. } | SubmissionOutcome::Saved { .. }
        )
    }

    pub fn id(&self) -> Option<&EntityId> {
        match self {
            SubmissionOutcome::Created { id } | SubmissionOutcome::Saved { id } => Some(id),
            _ => None,
        }
    }
}
