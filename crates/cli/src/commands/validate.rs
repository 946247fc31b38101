use std::path::Path;
use std::process;

use frota_core::{validate, EntityKind, ValidationResult};

use super::{print_json, read_record, report_field_errors};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_validate(kind: EntityKind, path: &Path, output: OutputFormat, quiet: bool) {
    let record = match read_record(path) {
        Ok(record) => record,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    match validate(kind.schema(), &record) {
        ValidationResult::Valid(normalized) => match output {
            OutputFormat::Text => print_json(&serde_json::Value::Object(normalized)),
            OutputFormat::Json => print_json(&serde_json::json!({
                "valid": true,
                "kind": kind,
                "record": normalized,
            })),
        },
        ValidationResult::Invalid(errors) => {
            tracing::debug!(%kind, errors = errors.len(), "record rejected");
            report_field_errors(&format!("invalid {}", kind), &errors, output, quiet);
            process::exit(1);
        }
    }
}
