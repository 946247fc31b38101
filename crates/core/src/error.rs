use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of rule a field violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// Required field absent or empty.
    Required,
    /// Value has the wrong JSON type or cannot be coerced.
    TypeMismatch,
    /// Length or value outside the declared bounds.
    Bounds,
    /// Text did not match a declared pattern.
    Pattern,
    /// Value not in the declared set (enum value, permission module).
    NotAllowed,
    /// Permission entry names a capability outside view/create/edit/delete/export.
    UnknownCapability,
    /// A check spanning more than one field failed.
    CrossField,
}

/// A single field-level validation failure.
///
/// `path` is the dotted field path (`address.zipCode`,
/// `permissions.fornecedores.view`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub path: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        FieldError {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn required(path: &str) -> Self {
        FieldError::new(path, FieldErrorKind::Required, "is required")
    }

    /// True when this error belongs to `path` itself or to a field nested under it.
    pub fn is_under(&self, path: &str) -> bool {
        self.path == path
            || (self.path.starts_with(path) && self.path.as_bytes().get(path.len()) == Some(&b'.'))
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A schema definition that cannot be used. Raised when the schema is built,
/// never while validating a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("duplicate field '{path}' in {entity} schema")]
    DuplicateField { entity: String, path: String },

    #[error("field '{path}': invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        path: String,
        pattern: String,
        message: String,
    },

    #[error("field '{path}': invalid bounds: {message}")]
    InvalidBounds { path: String, message: String },

    #[error("field '{path}': enum rule declares no values")]
    EmptyEnum { path: String },

    #[error("field '{path}': default {default} does not satisfy its own rule: {message}")]
    InvalidDefault {
        path: String,
        default: String,
        message: String,
    },

    #[error("cross-field check references '{path}', which is not a declared date field")]
    UnknownCheckField { path: String },
}
