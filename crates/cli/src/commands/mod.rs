pub(crate) mod entities;
pub(crate) mod schema;
pub(crate) mod submit;
pub(crate) mod validate;

use std::path::Path;

use frota_core::{FieldError, Record};

use crate::OutputFormat;

/// Read a JSON object from `path`.
pub(crate) fn read_record(path: &Path) -> Result<Record, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("error reading file '{}': {}", path.display(), e))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| format!("error parsing JSON in '{}': {}", path.display(), e))?;
    match value {
        serde_json::Value::Object(record) => Ok(record),
        other => Err(format!(
            "'{}' must contain a JSON object, found {}",
            path.display(),
            json_type(&other)
        )),
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

pub(crate) fn print_json(value: &serde_json::Value) {
    let pretty =
        serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("serialization error: {}", e));
    println!("{}", pretty);
}

/// Field errors on stderr: one `  - path: message` line each in text mode, a
/// `{"valid": false, "errors": [...]}` document in JSON mode.
pub(crate) fn report_field_errors(
    heading: &str,
    errors: &[FieldError],
    output: OutputFormat,
    quiet: bool,
) {
    match output {
        OutputFormat::Text => {
            if !quiet {
                eprintln!("{}", heading);
                for err in errors {
                    eprintln!("  - {}", err);
                }
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "valid": false,
                "errors": errors,
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_default()
            );
        }
    }
}
