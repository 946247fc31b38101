//! Declarative schema model.
//!
//! A schema is data, not behavior: each [`FieldRule`] pairs a field name with
//! a tagged [`Rule`] variant. The validator in [`crate::validate`] is a plain
//! traversal over this structure.
//!
//! Schemas are checked when they are built ([`Schema::new`]). A malformed
//! definition (duplicate field, bad regex, inverted bounds, a default that
//! violates its own rule) is a [`SchemaError`] at that point and can never
//! surface while validating a record.

use std::collections::{BTreeSet, HashMap};

use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::entity::EntityKind;
use crate::error::SchemaError;
use crate::validate;

// ──────────────────────────────────────────────
// Rule kinds
// ──────────────────────────────────────────────

/// A regular expression a text value must match, with the message shown
/// when it does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pattern {
    pub source: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<Pattern>,
}

impl TextRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn length(self, min: usize, max: usize) -> Self {
        self.min_length(min).max_length(max)
    }

    pub fn pattern(mut self, source: &str, message: &str) -> Self {
        self.patterns.push(Pattern {
            source: source.to_string(),
            message: message.to_string(),
        });
        self
    }
}

/// Numeric rule. Bounds are decimals so that money-like values compare exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NumberRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub integer: bool,
}

impl NumberRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: impl Into<Decimal>) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn max(mut self, max: impl Into<Decimal>) -> Self {
        self.max = Some(max.into());
        self
    }

    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }
}

/// ISO 8601 calendar date (`YYYY-MM-DD`). Bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<String>,
}

impl DateRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, min: &str) -> Self {
        self.min = Some(min.to_string());
        self
    }

    pub fn max(mut self, max: &str) -> Self {
        self.max = Some(max.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumRule {
    pub values: Vec<String>,
}

impl EnumRule {
    pub fn of(values: &[&str]) -> Self {
        EnumRule {
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectRule {
    pub fields: Vec<FieldRule>,
}

impl ObjectRule {
    pub fn new(fields: Vec<FieldRule>) -> Self {
        ObjectRule { fields }
    }
}

/// Permission matrix: module name to view/create/edit/delete/export flags.
///
/// When `modules` is set, only those module names are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PermissionRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<Vec<String>>,
}

impl PermissionRule {
    pub fn any_module() -> Self {
        Self::default()
    }

    pub fn modules(modules: &[&str]) -> Self {
        PermissionRule {
            modules: Some(modules.iter().map(|m| m.to_string()).collect()),
        }
    }
}

/// The type constraint of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    Text(TextRule),
    Number(NumberRule),
    Date(DateRule),
    Enum(EnumRule),
    Bool,
    Object(ObjectRule),
    Permissions(PermissionRule),
}

impl Rule {
    pub fn type_name(&self) -> &'static str {
        match self {
            Rule::Text(_) => "text",
            Rule::Number(_) => "number",
            Rule::Date(_) => "date",
            Rule::Enum(_) => "enum",
            Rule::Bool => "bool",
            Rule::Object(_) => "object",
            Rule::Permissions(_) => "permissions",
        }
    }
}

impl From<TextRule> for Rule {
    fn from(r: TextRule) -> Self {
        Rule::Text(r)
    }
}

impl From<NumberRule> for Rule {
    fn from(r: NumberRule) -> Self {
        Rule::Number(r)
    }
}

impl From<DateRule> for Rule {
    fn from(r: DateRule) -> Self {
        Rule::Date(r)
    }
}

impl From<EnumRule> for Rule {
    fn from(r: EnumRule) -> Self {
        Rule::Enum(r)
    }
}

impl From<ObjectRule> for Rule {
    fn from(r: ObjectRule) -> Self {
        Rule::Object(r)
    }
}

impl From<PermissionRule> for Rule {
    fn from(r: PermissionRule) -> Self {
        Rule::Permissions(r)
    }
}

// ──────────────────────────────────────────────
// Field rules
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRule {
    pub name: String,
    pub required: bool,
    #[serde(flatten)]
    pub rule: Rule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl FieldRule {
    pub fn required(name: &str, rule: impl Into<Rule>) -> Self {
        FieldRule {
            name: name.to_string(),
            required: true,
            rule: rule.into(),
            default: None,
        }
    }

    pub fn optional(name: &str, rule: impl Into<Rule>) -> Self {
        FieldRule {
            required: false,
            ..FieldRule::required(name, rule)
        }
    }

    /// Value used in the normalized record when the field is absent.
    /// A field with a default is optional.
    pub fn with_default(mut self, default: impl Into<serde_json::Value>) -> Self {
        self.required = false;
        self.default = Some(default.into());
        self
    }
}

/// A constraint spanning more than one field, checked after every field it
/// names validated on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum CrossFieldCheck {
    /// `later` must not be before `earlier`. Reported on `later`.
    DateOrder {
        earlier: String,
        later: String,
        message: String,
    },
}

// ──────────────────────────────────────────────
// Schema
// ──────────────────────────────────────────────

/// An immutable, checked rule table for one entity kind.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    kind: EntityKind,
    fields: Vec<FieldRule>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    checks: Vec<CrossFieldCheck>,
    #[serde(skip)]
    patterns: HashMap<String, Regex>,
}

impl Schema {
    pub fn new(kind: EntityKind, fields: Vec<FieldRule>) -> Result<Self, SchemaError> {
        Self::with_checks(kind, fields, Vec::new())
    }

    pub fn with_checks(
        kind: EntityKind,
        fields: Vec<FieldRule>,
        checks: Vec<CrossFieldCheck>,
    ) -> Result<Self, SchemaError> {
        let mut patterns = HashMap::new();
        check_structure(kind, &fields, "", &mut patterns)?;

        let mut schema = Schema {
            kind,
            fields: Vec::new(),
            checks,
            patterns,
        };

        // Defaults are stored in normalized form so that applying one is
        // indistinguishable from the user typing it.
        let mut fields = fields;
        normalize_defaults(&schema, &mut fields, "")?;
        schema.fields = fields;

        for check in &schema.checks {
            match check {
                CrossFieldCheck::DateOrder { earlier, later, .. } => {
                    for path in [earlier, later] {
                        if !matches!(schema.rule_at(path).map(|f| &f.rule), Some(Rule::Date(_))) {
                            return Err(SchemaError::UnknownCheckField { path: path.clone() });
                        }
                    }
                }
            }
        }

        Ok(schema)
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    pub fn checks(&self) -> &[CrossFieldCheck] {
        &self.checks
    }

    /// Compiled regex for a pattern source declared somewhere in this schema.
    pub fn pattern(&self, source: &str) -> Option<&Regex> {
        self.patterns.get(source)
    }

    /// Look up the rule at a dotted path, descending through object rules.
    pub fn rule_at(&self, path: &str) -> Option<&FieldRule> {
        let mut fields = self.fields.as_slice();
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let field = fields.iter().find(|f| f.name == segment)?;
            if segments.peek().is_none() {
                return Some(field);
            }
            match &field.rule {
                Rule::Object(obj) => fields = obj.fields.as_slice(),
                _ => return None,
            }
        }
        None
    }

    /// Serialize the rule table (for display and export).
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "entity": self.kind,
            "fields": self.fields,
            "checks": self.checks,
        })
    }
}

pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn check_structure(
    kind: EntityKind,
    fields: &[FieldRule],
    prefix: &str,
    patterns: &mut HashMap<String, Regex>,
) -> Result<(), SchemaError> {
    let mut seen = BTreeSet::new();
    for field in fields {
        let path = join_path(prefix, &field.name);
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                entity: kind.to_string(),
                path,
            });
        }

        match &field.rule {
            Rule::Text(rule) => {
                if let (Some(min), Some(max)) = (rule.min_length, rule.max_length) {
                    if min > max {
                        return Err(SchemaError::InvalidBounds {
                            path,
                            message: format!("min_length {} exceeds max_length {}", min, max),
                        });
                    }
                }
                for p in &rule.patterns {
                    if patterns.contains_key(&p.source) {
                        continue;
                    }
                    let re = Regex::new(&p.source).map_err(|e| SchemaError::InvalidPattern {
                        path: path.clone(),
                        pattern: p.source.clone(),
                        message: e.to_string(),
                    })?;
                    patterns.insert(p.source.clone(), re);
                }
            }
            Rule::Number(rule) => {
                if let (Some(min), Some(max)) = (rule.min, rule.max) {
                    if min > max {
                        return Err(SchemaError::InvalidBounds {
                            path,
                            message: format!("min {} exceeds max {}", min, max),
                        });
                    }
                }
            }
            Rule::Date(rule) => {
                let parse = |s: &String| {
                    validate::parse_date(s).ok_or_else(|| SchemaError::InvalidBounds {
                        path: path.clone(),
                        message: format!("'{}' is not a YYYY-MM-DD date", s),
                    })
                };
                let min = rule.min.as_ref().map(&parse).transpose()?;
                let max = rule.max.as_ref().map(&parse).transpose()?;
                if let (Some(min), Some(max)) = (min, max) {
                    if min > max {
                        return Err(SchemaError::InvalidBounds {
                            path,
                            message: format!("min {} is after max {}", min, max),
                        });
                    }
                }
            }
            Rule::Enum(rule) => {
                if rule.values.is_empty() {
                    return Err(SchemaError::EmptyEnum { path });
                }
            }
            Rule::Object(obj) => check_structure(kind, &obj.fields, &path, patterns)?,
            Rule::Bool | Rule::Permissions(_) => {}
        }
    }
    Ok(())
}

fn normalize_defaults(
    schema: &Schema,
    fields: &mut [FieldRule],
    prefix: &str,
) -> Result<(), SchemaError> {
    for field in fields.iter_mut() {
        let path = join_path(prefix, &field.name);
        if let Some(default) = field.default.take() {
            let mut errors = Vec::new();
            match validate::check_value(schema, &field.rule, &default, &path, &mut errors) {
                Some(normalized) => field.default = Some(normalized),
                None => {
                    return Err(SchemaError::InvalidDefault {
                        path,
                        default: default.to_string(),
                        message: errors
                            .first()
                            .map(|e| e.message.clone())
                            .unwrap_or_default(),
                    })
                }
            }
        }
        if let Rule::Object(obj) = &mut field.rule {
            normalize_defaults(schema, &mut obj.fields, &path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_fields() {
        let err = Schema::new(
            EntityKind::User,
            vec![
                FieldRule::required("name", TextRule::new()),
                FieldRule::required("name", TextRule::new()),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { ref path, .. } if path == "name"));
    }

    #[test]
    fn duplicate_names_in_different_objects_are_fine() {
        let schema = Schema::new(
            EntityKind::User,
            vec![
                FieldRule::required("number", TextRule::new()),
                FieldRule::required(
                    "address",
                    ObjectRule::new(vec![FieldRule::required("number", TextRule::new())]),
                ),
            ],
        );
        assert!(schema.is_ok());
    }

    #[test]
    fn rejects_invalid_regex() {
        let err = Schema::new(
            EntityKind::Supplier,
            vec![FieldRule::required(
                "code",
                TextRule::new().pattern("([a-z", "bad"),
            )],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidPattern { .. }));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let err = Schema::new(
            EntityKind::Contract,
            vec![FieldRule::required("value", NumberRule::new().min(10).max(1))],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidBounds { .. }));

        let err = Schema::new(
            EntityKind::Contract,
            vec![FieldRule::required("start", DateRule::new().min("2024-13-01"))],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidBounds { .. }));
    }

    #[test]
    fn rejects_default_outside_enum() {
        let err = Schema::new(
            EntityKind::User,
            vec![FieldRule::optional("status", EnumRule::of(&["active", "inactive"]))
                .with_default("archived")],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidDefault { ref path, .. } if path == "status"));
    }

    #[test]
    fn defaults_are_stored_normalized() {
        let schema = Schema::new(
            EntityKind::Contract,
            vec![FieldRule::optional("paymentDay", NumberRule::new().integer()).with_default("10")],
        )
        .unwrap();
        assert_eq!(
            schema.fields()[0].default,
            Some(serde_json::json!(10))
        );
    }

    #[test]
    fn cross_field_check_must_reference_dates() {
        let err = Schema::with_checks(
            EntityKind::Contract,
            vec![FieldRule::required("startDate", DateRule::new())],
            vec![CrossFieldCheck::DateOrder {
                earlier: "startDate".to_string(),
                later: "endDate".to_string(),
                message: "ends before it starts".to_string(),
            }],
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownCheckField {
                path: "endDate".to_string()
            }
        );
    }

    #[test]
    fn rule_at_descends_objects() {
        let schema = Schema::new(
            EntityKind::User,
            vec![FieldRule::required(
                "address",
                ObjectRule::new(vec![FieldRule::required("zipCode", TextRule::new())]),
            )],
        )
        .unwrap();
        assert_eq!(schema.rule_at("address.zipCode").map(|f| f.name.as_str()), Some("zipCode"));
        assert!(schema.rule_at("address.city").is_none());
        assert!(schema.rule_at("address.zipCode.extra").is_none());
    }

    #[test]
    fn serializes_tagged_rules() {
        let schema = Schema::new(
            EntityKind::User,
            vec![FieldRule::required("name", TextRule::new().length(3, 120))],
        )
        .unwrap();
        let json = schema.to_json();
        assert_eq!(json["entity"], "user");
        assert_eq!(json["fields"][0]["type"], "text");
        assert_eq!(json["fields"][0]["min_length"], 3);
        assert_eq!(json["fields"][0]["required"], true);
    }
}
