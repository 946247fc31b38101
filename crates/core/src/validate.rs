//! Record validation and normalization.
//!
//! For each declared field, in order:
//! - absent or blank: `is required` for required fields, otherwise the
//!   declared default (if any) goes into the normalized record
//! - present: type check (numeric strings are coerced only for number
//!   rules), then bounds, then patterns
//!
//! Every failing field is reported. Within one field, a type mismatch stops
//! further checks; bound and pattern violations are all collected.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use time::macros::format_description;
use time::format_description::well_known::Rfc3339;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use crate::error::{FieldError, FieldErrorKind};
use crate::permissions;
use crate::schema::{
    join_path, CrossFieldCheck, DateRule, EnumRule, FieldRule, NumberRule, Rule, Schema, TextRule,
};

/// A candidate or normalized record: field name to JSON value.
pub type Record = Map<String, Value>;

/// Outcome of validating a record against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid(Record),
    Invalid(Vec<FieldError>),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    /// Field errors in report order; empty when valid.
    pub fn errors(&self) -> &[FieldError] {
        match self {
            ValidationResult::Valid(_) => &[],
            ValidationResult::Invalid(errors) => errors,
        }
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            ValidationResult::Valid(record) => Some(record),
            ValidationResult::Invalid(_) => None,
        }
    }

    pub fn into_result(self) -> Result<Record, Vec<FieldError>> {
        match self {
            ValidationResult::Valid(record) => Ok(record),
            ValidationResult::Invalid(errors) => Err(errors),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ValidationResult::Valid(record) => serde_json::json!({
                "valid": true,
                "record": record,
            }),
            ValidationResult::Invalid(errors) => serde_json::json!({
                "valid": false,
                "errors": errors,
            }),
        }
    }
}

/// Validate `record` against `schema`.
///
/// Pure and deterministic: the same inputs always give the same result.
pub fn validate(schema: &Schema, record: &Record) -> ValidationResult {
    let mut errors = Vec::new();
    let normalized = check_fields(schema, schema.fields(), record, "", &mut errors);

    // Fields that failed on their own are missing from `normalized`, so a
    // cross-field check only runs when both sides are individually valid.
    for check in schema.checks() {
        check_cross_field(check, &normalized, &mut errors);
    }

    if errors.is_empty() {
        ValidationResult::Valid(normalized)
    } else {
        ValidationResult::Invalid(errors)
    }
}

/// Validate and return the normalized record or the field errors.
///
/// Normalizing an already-normalized record returns it unchanged.
pub fn normalize(schema: &Schema, record: &Record) -> Result<Record, Vec<FieldError>> {
    validate(schema, record).into_result()
}

/// Errors for one field path (and anything nested under it) only.
///
/// Used for touch/blur validation. Runs the same checks as [`validate`], so a
/// field that is clean here is clean at submit time too.
pub fn validate_field(schema: &Schema, record: &Record, path: &str) -> Vec<FieldError> {
    match validate(schema, record) {
        ValidationResult::Valid(_) => Vec::new(),
        ValidationResult::Invalid(errors) => {
            errors.into_iter().filter(|e| e.is_under(path)).collect()
        }
    }
}

// ──────────────────────────────────────────────
// Field traversal
// ──────────────────────────────────────────────

fn check_fields(
    schema: &Schema,
    fields: &[FieldRule],
    input: &Record,
    prefix: &str,
    errors: &mut Vec<FieldError>,
) -> Record {
    let mut out = Record::new();
    for field in fields {
        let path = join_path(prefix, &field.name);
        let raw = input.get(&field.name);

        let value = match raw {
            Some(value) if !is_absent(value, field) => value,
            _ => {
                if field.required {
                    errors.push(FieldError::required(&path));
                } else if let Some(default) = &field.default {
                    out.insert(field.name.clone(), default.clone());
                }
                continue;
            }
        };

        if let Some(normalized) = check_value(schema, &field.rule, value, &path, errors) {
            out.insert(field.name.clone(), normalized);
        }
    }
    out
}

/// Blank values count as absent. An optional object whose every member is
/// blank is absent as a whole; a required one is descended into so each
/// missing member is reported. A permission matrix is absent only when it
/// lists no module at all. An object given to any other rule is a value of
/// the wrong type, never blank.
fn is_absent(value: &Value, field: &FieldRule) -> bool {
    match (&field.rule, value) {
        (Rule::Object(_), Value::Object(members)) => {
            !field.required && members.values().all(is_blank)
        }
        (Rule::Permissions(_), Value::Object(modules)) => modules.is_empty(),
        (_, Value::Object(_)) => false,
        (_, other) => is_blank(other),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(members) => members.values().all(is_blank),
        _ => false,
    }
}

/// Check one present value against its rule. Returns the normalized value,
/// or `None` if any error was recorded for it.
pub(crate) fn check_value(
    schema: &Schema,
    rule: &Rule,
    value: &Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let before = errors.len();
    let normalized = match rule {
        Rule::Text(r) => check_text(schema, r, value, path, errors),
        Rule::Number(r) => check_number(r, value, path, errors),
        Rule::Date(r) => check_date(r, value, path, errors),
        Rule::Enum(r) => check_enum(r, value, path, errors),
        Rule::Bool => check_bool(value, path, errors),
        Rule::Object(obj) => match value {
            Value::Object(members) => Some(Value::Object(check_fields(
                schema,
                &obj.fields,
                members,
                path,
                errors,
            ))),
            other => {
                errors.push(type_mismatch(path, "object", other));
                None
            }
        },
        Rule::Permissions(r) => permissions::check_matrix(r, value, path, errors),
    };
    if errors.len() > before {
        None
    } else {
        normalized
    }
}

// ──────────────────────────────────────────────
// Rule checks
// ──────────────────────────────────────────────

fn check_text(
    schema: &Schema,
    rule: &TextRule,
    value: &Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let Value::String(text) = value else {
        errors.push(type_mismatch(path, "text", value));
        return None;
    };

    let len = text.chars().count();
    if let Some(min) = rule.min_length {
        if len < min {
            errors.push(FieldError::new(
                path,
                FieldErrorKind::Bounds,
                format!("must have at least {} characters", min),
            ));
        }
    }
    if let Some(max) = rule.max_length {
        if len > max {
            errors.push(FieldError::new(
                path,
                FieldErrorKind::Bounds,
                format!("must have at most {} characters", max),
            ));
        }
    }

    for pattern in &rule.patterns {
        if let Some(re) = schema.pattern(&pattern.source) {
            if !re.is_match(text) {
                errors.push(FieldError::new(
                    path,
                    FieldErrorKind::Pattern,
                    pattern.message.clone(),
                ));
            }
        }
    }

    Some(Value::String(text.clone()))
}

fn check_number(
    rule: &NumberRule,
    value: &Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let (parsed, numeric) = match value {
        Value::Number(n) => (parse_decimal(&n.to_string()), true),
        Value::String(s) => (parse_decimal(s.trim()), looks_numeric(s.trim())),
        _ => (None, false),
    };
    let Some(number) = parsed else {
        if numeric {
            errors.push(out_of_range(path));
        } else {
            errors.push(type_mismatch(path, "number", value));
        }
        return None;
    };

    if rule.integer && !number.fract().is_zero() {
        errors.push(FieldError::new(
            path,
            FieldErrorKind::TypeMismatch,
            "must be a whole number",
        ));
        return None;
    }
    if let Some(min) = rule.min {
        if number < min {
            errors.push(FieldError::new(
                path,
                FieldErrorKind::Bounds,
                format!("must be at least {}", min),
            ));
        }
    }
    if let Some(max) = rule.max {
        if number > max {
            errors.push(FieldError::new(
                path,
                FieldErrorKind::Bounds,
                format!("must be at most {}", max),
            ));
        }
    }

    let normalized = decimal_to_json(number);
    if normalized.is_none() {
        errors.push(out_of_range(path));
    }
    normalized
}

/// A number too large, too small or too precise for exact decimal handling.
fn out_of_range(path: &str) -> FieldError {
    FieldError::new(
        path,
        FieldErrorKind::Bounds,
        "is out of the supported numeric range",
    )
}

fn check_date(
    rule: &DateRule,
    value: &Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let Some(date) = value.as_str().and_then(|s| parse_date(s.trim())) else {
        errors.push(type_mismatch(path, "date (YYYY-MM-DD)", value));
        return None;
    };

    if let Some(min) = rule.min.as_deref().and_then(parse_date) {
        if date < min {
            errors.push(FieldError::new(
                path,
                FieldErrorKind::Bounds,
                format!("must be on or after {}", format_date(min)),
            ));
        }
    }
    if let Some(max) = rule.max.as_deref().and_then(parse_date) {
        if date > max {
            errors.push(FieldError::new(
                path,
                FieldErrorKind::Bounds,
                format!("must be on or before {}", format_date(max)),
            ));
        }
    }

    Some(Value::String(format_date(date)))
}

fn check_enum(
    rule: &EnumRule,
    value: &Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let expected = rule.values.join(", ");
    match value {
        Value::String(s) if rule.values.iter().any(|v| v == s) => Some(value.clone()),
        Value::String(_) => {
            errors.push(FieldError::new(
                path,
                FieldErrorKind::NotAllowed,
                format!("must be one of: {}", expected),
            ));
            None
        }
        other => {
            errors.push(type_mismatch(path, &format!("one of: {}", expected), other));
            None
        }
    }
}

fn check_bool(value: &Value, path: &str, errors: &mut Vec<FieldError>) -> Option<Value> {
    match coerce_bool(value) {
        Some(b) => Some(Value::Bool(b)),
        None => {
            errors.push(type_mismatch(path, "boolean", value));
            None
        }
    }
}

fn check_cross_field(check: &CrossFieldCheck, normalized: &Record, errors: &mut Vec<FieldError>) {
    match check {
        CrossFieldCheck::DateOrder {
            earlier,
            later,
            message,
        } => {
            let date_at = |path: &str| {
                lookup(normalized, path)
                    .and_then(Value::as_str)
                    .and_then(parse_date)
            };
            if let (Some(start), Some(end)) = (date_at(earlier.as_str()), date_at(later.as_str())) {
                if end < start {
                    errors.push(FieldError::new(
                        later.as_str(),
                        FieldErrorKind::CrossField,
                        message.clone(),
                    ));
                }
            }
        }
    }
}

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

/// Value at a dotted path inside a record.
pub fn lookup<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = record.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

pub(crate) fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub(crate) fn type_mismatch(path: &str, expected: &str, got: &Value) -> FieldError {
    FieldError::new(
        path,
        FieldErrorKind::TypeMismatch,
        format!("expected {}, got {}", expected, json_type_name(got)),
    )
}

/// Plain or scientific decimal notation, whatever its magnitude.
fn looks_numeric(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        && s.parse::<f64>().is_ok()
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// Whole numbers become JSON integers; anything else goes through its
/// shortest decimal string so re-parsing yields the same value.
fn decimal_to_json(d: Decimal) -> Option<Value> {
    let d = d.normalize();
    if d.scale() == 0 {
        if let Some(i) = d.to_i64() {
            return Some(Value::from(i));
        }
    }
    serde_json::from_str::<serde_json::Number>(&d.to_string())
        .ok()
        .map(Value::Number)
}

/// Parse `YYYY-MM-DD`. A full RFC 3339 timestamp (`2024-05-01T10:00:00Z`)
/// or a local `YYYY-MM-DDTHH:MM:SS[.fff]` is accepted and its date kept.
pub(crate) fn parse_date(s: &str) -> Option<Date> {
    if s.get(10..11) != Some("T") {
        return Date::parse(s, format_description!("[year]-[month]-[day]")).ok();
    }
    if let Ok(timestamp) = OffsetDateTime::parse(s, &Rfc3339) {
        return Some(timestamp.date());
    }
    PrimitiveDateTime::parse(
        s,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"),
    )
    .ok()
    .map(|local| local.date())
}

fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Return a descriptive type name for a JSON value (for error messages).
fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
