use std::sync::{Arc, Mutex, MutexGuard};

use frota_core::{validate, validate_field, EntityKind, FieldError, Record, Schema, ValidationResult};
use frota_storage::{EntityId, SubmitIntent};
use serde_json::{Map, Value};
use tokio::sync::watch;

use crate::coordinator::{SubmissionCoordinator, SubmissionError};
use crate::state::{SubmissionOutcome, SubmissionState};

/// An in-progress entity form.
///
/// Cloning gives another handle to the same form, so every UI callback
/// (including a double-clicked submit button) reaches one record and one
/// submission state. The internal lock is never held across an await.
#[derive(Debug, Clone)]
pub struct Form {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    kind: EntityKind,
    schema: &'static Schema,
    coordinator: SubmissionCoordinator,
    state: Mutex<FormState>,
}

#[derive(Debug, Default)]
struct FormState {
    record: Record,
    errors: Vec<FieldError>,
    submission: SubmissionState,
    editing: Option<EntityId>,
    /// Set while a store call is running; waiters read the settled outcome.
    in_flight: Option<watch::Receiver<Option<SubmissionOutcome>>>,
    left: bool,
}

enum Step {
    Done(SubmissionOutcome),
    Wait(watch::Receiver<Option<SubmissionOutcome>>),
    Start {
        record: Record,
        intent: SubmitIntent,
        settled: watch::Sender<Option<SubmissionOutcome>>,
    },
}

impl Form {
    /// An empty form that creates a new entity.
    pub fn new(kind: EntityKind, coordinator: SubmissionCoordinator) -> Self {
        Self::open(kind, coordinator, Record::new(), None)
    }

    /// A form pre-populated with an existing entity; submitting updates it.
    pub fn edit(
        kind: EntityKind,
        id: EntityId,
        record: Record,
        coordinator: SubmissionCoordinator,
    ) -> Self {
        Self::open(kind, coordinator, record, Some(id))
    }

    fn open(
        kind: EntityKind,
        coordinator: SubmissionCoordinator,
        record: Record,
        editing: Option<EntityId>,
    ) -> Self {
        Form {
            shared: Arc::new(Shared {
                kind,
                schema: kind.schema(),
                coordinator,
                state: Mutex::new(FormState {
                    record,
                    editing,
                    ..FormState::default()
                }),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn kind(&self) -> EntityKind {
        self.shared.kind
    }

    /// The id being edited, if this form was opened in edit mode.
    pub fn editing(&self) -> Option<EntityId> {
        self.lock().editing.clone()
    }

    pub fn record(&self) -> Record {
        self.lock().record.clone()
    }

    pub fn errors(&self) -> Vec<FieldError> {
        self.lock().errors.clone()
    }

    /// Errors recorded for `path` or any field under it.
    pub fn errors_for(&self, path: &str) -> Vec<FieldError> {
        self.lock()
            .errors
            .iter()
            .filter(|e| e.is_under(path))
            .cloned()
            .collect()
    }

    pub fn state(&self) -> SubmissionState {
        self.lock().submission.clone()
    }

    pub fn is_left(&self) -> bool {
        self.lock().left
    }

    /// Set one field by dotted path, creating intermediate objects.
    ///
    /// Only errors recorded at exactly `path` are cleared; nothing is
    /// validated until [`touch`](Self::touch) or submission.
    pub fn set_field(&self, path: &str, value: Value) {
        let mut state = self.lock();
        if state.left {
            return;
        }
        set_path(&mut state.record, path, value);
        state.errors.retain(|e| e.path != path);
    }

    /// Validate only `path` and record its errors, replacing earlier ones
    /// for that field.
    pub fn touch(&self, path: &str) -> Vec<FieldError> {
        let mut state = self.lock();
        if state.left {
            return Vec::new();
        }
        let found = validate_field(self.shared.schema, &state.record, path);
        state.errors.retain(|e| !e.is_under(path));
        state.errors.extend(found.iter().cloned());
        found
    }

    /// Validate the whole record; the result replaces the error state.
    pub fn validate_all(&self) -> ValidationResult {
        let mut state = self.lock();
        let result = validate(self.shared.schema, &state.record);
        state.errors = result.errors().to_vec();
        result
    }

    /// Validate and, when valid, send the record to the store.
    ///
    /// An invalid record never reaches the store. While a call is in flight,
    /// further submits on any handle wait for it and return its outcome
    /// instead of starting another.
    pub async fn submit(&self) -> SubmissionOutcome {
        let step = self.begin();
        match step {
            Step::Done(outcome) => outcome,
            Step::Wait(rx) => wait_settled(rx).await,
            Step::Start {
                record,
                intent,
                settled,
            } => {
                let mut guard = InFlightGuard {
                    form: self,
                    armed: true,
                };
                let result = self
                    .shared
                    .coordinator
                    .perform(self.shared.kind, intent, &record)
                    .await;
                guard.armed = false;
                let outcome = self.settle(result);
                let _ = settled.send(Some(outcome.clone()));
                outcome
            }
        }
    }

    fn begin(&self) -> Step {
        let mut state = self.lock();
        if state.left {
            return Step::Done(SubmissionOutcome::Abandoned);
        }
        // A receiver whose sender is gone belongs to a submit that was
        // cancelled mid-call; it will never settle.
        if let Some(rx) = &state.in_flight {
            if rx.has_changed().is_ok() {
                tracing::debug!(kind = %self.shared.kind, "submit joined in-flight submission");
                return Step::Wait(rx.clone());
            }
        }

        match validate(self.shared.schema, &state.record) {
            ValidationResult::Invalid(errors) => {
                tracing::debug!(
                    kind = %self.shared.kind,
                    errors = errors.len(),
                    "submit blocked by validation"
                );
                state.errors = errors.clone();
                Step::Done(SubmissionOutcome::Invalid { errors })
            }
            ValidationResult::Valid(record) => {
                state.errors.clear();
                state.submission = SubmissionState::Submitting;
                let (settled, rx) = watch::channel(None);
                state.in_flight = Some(rx);
                let intent = match &state.editing {
                    Some(id) => SubmitIntent::Update(id.clone()),
                    None => SubmitIntent::Create,
                };
                Step::Start {
                    record,
                    intent,
                    settled,
                }
            }
        }
    }

    fn settle(&self, result: Result<EntityId, SubmissionError>) -> SubmissionOutcome {
        let kind = self.shared.kind;
        let mut state = self.lock();
        state.in_flight = None;

        if state.left {
            tracing::info!(%kind, "form was left; submission result suppressed");
            return SubmissionOutcome::Abandoned;
        }

        match result {
            Ok(id) => {
                let outcome = if state.editing.is_some() {
                    SubmissionOutcome::Saved { id: id.clone() }
                } else {
                    SubmissionOutcome::Created { id: id.clone() }
                };
                state.submission = SubmissionState::Succeeded(id.clone());
                state.record = Record::new();
                state.errors.clear();
                drop(state);
                self.shared.coordinator.navigate_success(kind, &id);
                outcome
            }
            Err(e) => {
                let reason = e.to_string();
                state.submission = SubmissionState::Failed(reason.clone());
                SubmissionOutcome::Failed { reason }
            }
        }
    }

    /// The user navigated away. Unless the form already succeeded, the
    /// navigator hears `on_cancel` once, and a submission still in flight
    /// will settle as [`Abandoned`](SubmissionOutcome::Abandoned) without
    /// touching the form.
    pub fn leave(&self) {
        let mut state = self.lock();
        if state.left {
            return;
        }
        state.left = true;
        let succeeded = matches!(state.submission, SubmissionState::Succeeded(_));
        drop(state);
        tracing::debug!(kind = %self.shared.kind, succeeded, "form left");
        if !succeeded {
            self.shared.coordinator.navigate_cancel();
        }
    }
}

/// Resets the form if a `submit()` future is dropped while the store call
/// is still pending.
struct InFlightGuard<'a> {
    form: &'a Form,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.form.lock();
        state.in_flight = None;
        if !state.left {
            state.submission = SubmissionState::Failed(INTERRUPTED.to_string());
        }
        tracing::warn!(kind = %self.form.shared.kind, "submission interrupted");
    }
}

const INTERRUPTED: &str = "submission was interrupted";

async fn wait_settled(mut rx: watch::Receiver<Option<SubmissionOutcome>>) -> SubmissionOutcome {
    match rx.wait_for(Option::is_some).await {
        Ok(settled) => settled.clone().unwrap_or(SubmissionOutcome::Abandoned),
        Err(_) => SubmissionOutcome::Failed {
            reason: INTERRUPTED.to_string(),
        },
    }
}

fn set_path(record: &mut Record, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = record;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else {
            return;
        };
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frota_storage::InMemoryStore;
    use serde_json::json;

    use crate::navigation::NoopNavigator;

    fn form(kind: EntityKind) -> Form {
        let coordinator =
            SubmissionCoordinator::new(Arc::new(InMemoryStore::new()), Arc::new(NoopNavigator));
        Form::new(kind, coordinator)
    }

    #[test]
    fn set_field_creates_intermediate_objects() {
        let f = form(EntityKind::Supplier);
        f.set_field("address.zipCode", json!("01310-100"));
        f.set_field("address.city", json!("São Paulo"));
        assert_eq!(
            Value::Object(f.record()),
            json!({ "address": { "zipCode": "01310-100", "city": "São Paulo" } })
        );
    }

    #[test]
    fn set_field_replaces_scalar_on_the_way_down() {
        let f = form(EntityKind::Supplier);
        f.set_field("address", json!("somewhere"));
        f.set_field("address.city", json!("Recife"));
        assert_eq!(f.record()["address"], json!({ "city": "Recife" }));
    }

    #[test]
    fn set_field_clears_only_its_own_errors() {
        let f = form(EntityKind::User);
        assert!(!f.validate_all().is_valid());
        assert!(!f.errors_for("name").is_empty());
        assert!(!f.errors_for("email").is_empty());

        f.set_field("name", json!("Ana"));
        assert!(f.errors_for("name").is_empty());
        assert!(!f.errors_for("email").is_empty());
    }

    #[test]
    fn set_field_does_not_validate() {
        let f = form(EntityKind::User);
        f.set_field("email", json!("not-an-email"));
        assert!(f.errors().is_empty());
    }

    #[test]
    fn touch_records_only_the_touched_field() {
        let f = form(EntityKind::User);
        f.set_field("password", json!("abcdef"));
        let found = f.touch("password");
        assert!(!found.is_empty());
        assert!(found.iter().all(|e| e.is_under("password")));
        assert_eq!(f.errors(), found);

        f.set_field("password", json!("Abcdef1!"));
        assert!(f.touch("password").is_empty());
        assert!(f.errors().is_empty());
    }

    #[test]
    fn touch_on_nested_path_replaces_nested_errors() {
        let f = form(EntityKind::Supplier);
        f.set_field("address.zipCode", json!("123"));
        assert_eq!(f.touch("address.zipCode").len(), 1);
        f.set_field("address.zipCode", json!("01310-100"));
        assert!(f.touch("address.zipCode").is_empty());
        assert!(f.errors_for("address").is_empty());
    }

    #[test]
    fn validate_all_replaces_error_state() {
        let f = form(EntityKind::AccessLevel);
        f.set_field("name", json!("x"));
        f.touch("name");
        assert_eq!(f.errors().len(), 1);

        let result = f.validate_all();
        assert_eq!(f.errors(), result.errors().to_vec());
        assert!(f.errors().iter().any(|e| e.path == "permissions"));
    }

    #[test]
    fn left_form_does_not_record_touch_errors() {
        let f = form(EntityKind::User);
        f.set_field("password", json!("abcdef"));
        f.leave();
        assert!(f.touch("password").is_empty());
        assert!(f.errors().is_empty());
    }

    #[test]
    fn left_form_ignores_field_updates() {
        let f = form(EntityKind::Contract);
        f.leave();
        f.set_field("number", json!("CT-2024-001"));
        assert!(f.record().is_empty());
        assert!(f.is_left());
    }
}
