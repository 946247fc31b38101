use std::path::Path;
use std::process;
use std::sync::Arc;

use frota_core::EntityKind;
use frota_form::{Form, RecordingNavigator, SubmissionCoordinator, SubmissionOutcome};
use frota_storage::{DirectoryStore, EntityId, EntityStore, InMemoryStore};

use super::{print_json, read_record, report_field_errors};
use crate::config::{Config, StoreKind};
use crate::{report_error, OutputFormat};

fn open_store(config: &Config) -> Result<Arc<dyn EntityStore>, String> {
    match config.store.kind {
        StoreKind::Memory => Ok(Arc::new(InMemoryStore::new())),
        StoreKind::Directory => {
            let dir = config
                .store
                .dir
                .clone()
                .ok_or_else(|| "[store] kind = \"directory\" needs a dir".to_string())?;
            Ok(Arc::new(DirectoryStore::new(dir)))
        }
    }
}

pub(crate) fn cmd_submit(
    kind: EntityKind,
    path: &Path,
    id: Option<&str>,
    config: &Config,
    output: OutputFormat,
    quiet: bool,
) {
    let outcome = match run(kind, path, id, config) {
        Ok(outcome) => outcome,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    match outcome {
        SubmissionOutcome::Created { ref id } | SubmissionOutcome::Saved { ref id } => {
            let action = if matches!(outcome, SubmissionOutcome::Created { .. }) {
                "created"
            } else {
                "saved"
            };
            match output {
                OutputFormat::Text => {
                    if quiet {
                        println!("{}", id);
                    } else {
                        println!("{} {} {}", action, kind, id);
                        println!("next: {}", kind.list_route());
                    }
                }
                OutputFormat::Json => print_json(&serde_json::json!({
                    "outcome": action,
                    "kind": kind,
                    "id": id,
                    "route": kind.list_route(),
                })),
            }
        }
        SubmissionOutcome::Invalid { errors } => {
            report_field_errors(&format!("invalid {}", kind), &errors, output, quiet);
            process::exit(1);
        }
        SubmissionOutcome::Failed { reason } => {
            report_error(&format!("submission failed: {}", reason), output, quiet);
            process::exit(1);
        }
        SubmissionOutcome::Abandoned => {
            report_error("submission abandoned", output, quiet);
            process::exit(1);
        }
    }
}

fn run(
    kind: EntityKind,
    path: &Path,
    id: Option<&str>,
    config: &Config,
) -> Result<SubmissionOutcome, String> {
    let record = read_record(path)?;
    let store = open_store(config)?;
    let navigator = Arc::new(RecordingNavigator::new());
    let coordinator =
        SubmissionCoordinator::new(store, navigator.clone()).with_timeout(config.submission.timeout());

    let form = match id {
        Some(id) => Form::edit(kind, EntityId::from(id), record, coordinator),
        None => {
            let form = Form::new(kind, coordinator);
            for (field, value) in record {
                form.set_field(&field, value);
            }
            form
        }
    };

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("failed to create tokio runtime: {}", e))?;
    let outcome = rt.block_on(form.submit());
    for event in navigator.events() {
        tracing::debug!(?event, "navigation requested");
    }
    Ok(outcome)
}
