//! Access-level permission matrix.
//!
//! A matrix maps a module name (`fornecedores`, `contratos`, ...) to five
//! capability flags. The matrix is stored configuration: nothing in this
//! workspace enforces it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FieldError, FieldErrorKind};
use crate::schema::PermissionRule;
use crate::validate::{coerce_bool, type_mismatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    View,
    Create,
    Edit,
    Delete,
    Export,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::View,
        Capability::Create,
        Capability::Edit,
        Capability::Delete,
        Capability::Export,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::View => "view",
            Capability::Create => "create",
            Capability::Edit => "edit",
            Capability::Delete => "delete",
            Capability::Export => "export",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Capability::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

/// The five flags of one module. Every flag defaults to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilitySet {
    pub view: bool,
    pub create: bool,
    pub edit: bool,
    pub delete: bool,
    pub export: bool,
}

impl CapabilitySet {
    pub fn get(&self, capability: Capability) -> bool {
        match capability {
            Capability::View => self.view,
            Capability::Create => self.create,
            Capability::Edit => self.edit,
            Capability::Delete => self.delete,
            Capability::Export => self.export,
        }
    }

    pub fn set(&mut self, capability: Capability, enabled: bool) {
        let flag = match capability {
            Capability::View => &mut self.view,
            Capability::Create => &mut self.create,
            Capability::Edit => &mut self.edit,
            Capability::Delete => &mut self.delete,
            Capability::Export => &mut self.export,
        };
        *flag = enabled;
    }

    pub fn to_json(&self) -> Value {
        let mut flags = Map::new();
        for capability in Capability::ALL {
            flags.insert(
                capability.as_str().to_string(),
                Value::Bool(self.get(capability)),
            );
        }
        Value::Object(flags)
    }
}

/// Module name to capability flags, ordered by module name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMatrix(BTreeMap<String, CapabilitySet>);

impl PermissionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, module: &str, capability: Capability) {
        self.0
            .entry(module.to_string())
            .or_default()
            .set(capability, true);
    }

    pub fn get(&self, module: &str) -> Option<&CapabilitySet> {
        self.0.get(module)
    }

    /// Whether `module` has `capability` set. Unlisted modules have nothing.
    pub fn allows(&self, module: &str, capability: Capability) -> bool {
        self.get(module).is_some_and(|caps| caps.get(capability))
    }

    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(module, caps)| (module.clone(), caps.to_json()))
                .collect(),
        )
    }

    /// Read a matrix back out of a normalized record value.
    pub fn from_json(value: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }
}

/// Validate and normalize a permission matrix value. Each module entry comes
/// out with all five flags; a missing or `null` flag is `false`.
pub(crate) fn check_matrix(
    rule: &PermissionRule,
    value: &Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Value> {
    let Value::Object(modules) = value else {
        errors.push(type_mismatch(path, "permission matrix object", value));
        return None;
    };

    let mut out = Map::new();
    for (module, entry) in modules {
        let module_path = format!("{}.{}", path, module);

        if module.trim().is_empty() {
            errors.push(FieldError::new(
                path,
                FieldErrorKind::NotAllowed,
                "module name must not be empty",
            ));
            continue;
        }
        if let Some(known) = &rule.modules {
            if !known.iter().any(|m| m == module) {
                errors.push(FieldError::new(
                    module_path,
                    FieldErrorKind::NotAllowed,
                    format!("unknown module (expected one of: {})", known.join(", ")),
                ));
                continue;
            }
        }

        let mut caps = CapabilitySet::default();
        match entry {
            Value::Null => {}
            Value::Object(flags) => {
                for (flag, raw) in flags {
                    let flag_path = format!("{}.{}", module_path, flag);
                    let Some(capability) = Capability::from_name(flag) else {
                        errors.push(FieldError::new(
                            flag_path,
                            FieldErrorKind::UnknownCapability,
                            "unknown capability (expected view, create, edit, delete or export)",
                        ));
                        continue;
                    };
                    if raw.is_null() {
                        continue;
                    }
                    match coerce_bool(raw) {
                        Some(enabled) => caps.set(capability, enabled),
                        None => errors.push(type_mismatch(&flag_path, "boolean", raw)),
                    }
                }
            }
            other => {
                errors.push(type_mismatch(&module_path, "object of capability flags", other));
                continue;
            }
        }
        out.insert(module.clone(), caps.to_json());
    }

    Some(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(rule: &PermissionRule, value: Value) -> (Option<Value>, Vec<FieldError>) {
        let mut errors = Vec::new();
        let out = check_matrix(rule, &value, "permissions", &mut errors);
        (out, errors)
    }

    #[test]
    fn fills_missing_flags_with_false() {
        let (out, errors) = check(
            &PermissionRule::any_module(),
            json!({ "fornecedores": { "view": true }, "contratos": null }),
        );
        assert!(errors.is_empty());
        assert_eq!(
            out.unwrap(),
            json!({
                "contratos": { "view": false, "create": false, "edit": false, "delete": false, "export": false },
                "fornecedores": { "view": true, "create": false, "edit": false, "delete": false, "export": false }
            })
        );
    }

    #[test]
    fn rejects_unknown_capability_and_module() {
        let rule = PermissionRule::modules(&["fornecedores"]);
        let (_, errors) = check(
            &rule,
            json!({ "fornecedores": { "approve": true }, "frota": { "view": true } }),
        );
        let paths: Vec<(&str, FieldErrorKind)> =
            errors.iter().map(|e| (e.path.as_str(), e.kind)).collect();
        assert_eq!(
            paths,
            vec![
                ("permissions.fornecedores.approve", FieldErrorKind::UnknownCapability),
                ("permissions.frota", FieldErrorKind::NotAllowed),
            ]
        );
    }

    #[test]
    fn non_boolean_flag_is_type_mismatch() {
        let (_, errors) = check(
            &PermissionRule::any_module(),
            json!({ "usuarios": { "delete": 1 } }),
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "permissions.usuarios.delete");
        assert_eq!(errors[0].kind, FieldErrorKind::TypeMismatch);
    }

    #[test]
    fn matrix_reads_normalized_json() {
        let matrix = PermissionMatrix::from_json(&json!({
            "fornecedores": { "view": true, "create": false, "edit": false, "delete": false, "export": true }
        }))
        .unwrap();
        assert!(matrix.allows("fornecedores", Capability::View));
        assert!(matrix.allows("fornecedores", Capability::Export));
        assert!(!matrix.allows("fornecedores", Capability::Delete));
        assert!(!matrix.allows("contratos", Capability::View));
    }

    #[test]
    fn grant_round_trips_through_json() {
        let mut matrix = PermissionMatrix::new();
        matrix.grant("contratos", Capability::Edit);
        let back = PermissionMatrix::from_json(&matrix.to_json()).unwrap();
        assert_eq!(back, matrix);
        assert_eq!(back.modules().collect::<Vec<_>>(), vec!["contratos"]);
    }
}
