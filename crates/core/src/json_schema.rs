//! JSON Schema (draft 2020-12) export of an entity schema.
//!
//! The export describes the *normalized* record shape, so other tools can
//! check records that went through [`crate::validate`]. Cross-field checks
//! have no JSON Schema counterpart and are left out.

use rust_decimal::prelude::ToPrimitive;
use serde_json::{json, Map, Value};

use crate::permissions::Capability;
use crate::schema::{FieldRule, Rule, Schema};

pub fn to_json_schema(schema: &Schema) -> Value {
    let mut root = object_schema(schema.fields());
    if let Value::Object(ref mut map) = root {
        map.insert(
            "$schema".to_string(),
            json!("https://json-schema.org/draft/2020-12/schema"),
        );
        map.insert("title".to_string(), json!(schema.kind().as_str()));
    }
    root
}

fn object_schema(fields: &[FieldRule]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in fields {
        let mut property = rule_schema(&field.rule);
        if let (Some(default), Value::Object(map)) = (&field.default, &mut property) {
            map.insert("default".to_string(), default.clone());
        }
        properties.insert(field.name.clone(), property);
        // Fields with a default are always present after normalization.
        if field.required || field.default.is_some() {
            required.push(Value::String(field.name.clone()));
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn rule_schema(rule: &Rule) -> Value {
    match rule {
        Rule::Text(text) => {
            let mut map = Map::new();
            map.insert("type".to_string(), json!("string"));
            if let Some(min) = text.min_length {
                map.insert("minLength".to_string(), json!(min));
            }
            if let Some(max) = text.max_length {
                map.insert("maxLength".to_string(), json!(max));
            }
            if !text.patterns.is_empty() {
                let all: Vec<Value> = text
                    .patterns
                    .iter()
                    .map(|p| json!({ "pattern": p.source }))
                    .collect();
                map.insert("allOf".to_string(), Value::Array(all));
            }
            Value::Object(map)
        }
        Rule::Number(number) => {
            let mut map = Map::new();
            let ty = if number.integer { "integer" } else { "number" };
            map.insert("type".to_string(), json!(ty));
            if let Some(min) = number.min.and_then(|d| d.to_f64()) {
                map.insert("minimum".to_string(), json!(min));
            }
            if let Some(max) = number.max.and_then(|d| d.to_f64()) {
                map.insert("maximum".to_string(), json!(max));
            }
            Value::Object(map)
        }
        Rule::Date(_) => json!({ "type": "string", "format": "date" }),
        Rule::Enum(e) => json!({ "type": "string", "enum": e.values }),
        Rule::Bool => json!({ "type": "boolean" }),
        Rule::Object(obj) => object_schema(&obj.fields),
        Rule::Permissions(perms) => {
            let flags: Map<String, Value> = Capability::ALL
                .iter()
                .map(|c| (c.as_str().to_string(), json!({ "type": "boolean" })))
                .collect();
            let names: Vec<&str> = Capability::ALL.iter().map(|c| c.as_str()).collect();
            let mut map = Map::new();
            map.insert("type".to_string(), json!("object"));
            map.insert(
                "additionalProperties".to_string(),
                json!({
                    "type": "object",
                    "properties": flags,
                    "required": names,
                    "additionalProperties": false,
                }),
            );
            if let Some(modules) = &perms.modules {
                map.insert("propertyNames".to_string(), json!({ "enum": modules }));
            }
            Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;

    #[test]
    fn defaults_are_required_in_normalized_shape() {
        let schema = to_json_schema(EntityKind::User.schema());
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("status")));
        assert!(!required.contains(&json!("hiredAt")));
        assert_eq!(schema["properties"]["status"]["default"], json!("active"));
        assert_eq!(
            schema["properties"]["address"]["properties"]["country"]["default"],
            json!("Brasil")
        );
    }

    #[test]
    fn password_patterns_become_all_of() {
        let schema = to_json_schema(EntityKind::User.schema());
        let all = schema["properties"]["password"]["allOf"].as_array().unwrap();
        assert_eq!(all.len(), 4);
    }
}
