use crate::entity::EntityKind;
use crate::error::SchemaError;
use crate::schema::{FieldRule, PermissionRule, Schema, TextRule};

use super::common;

/// Back office modules a permission matrix may mention.
pub const MODULES: &[&str] = &[
    "dashboard",
    "fornecedores",
    "contratos",
    "usuarios",
    "niveis-acesso",
    "relatorios",
];

pub(super) fn schema() -> Result<Schema, SchemaError> {
    Schema::new(
        EntityKind::AccessLevel,
        vec![
            FieldRule::required("name", TextRule::new().length(3, 60)),
            FieldRule::optional("description", TextRule::new().max_length(255)),
            FieldRule::required("permissions", PermissionRule::modules(MODULES)),
            common::status(),
        ],
    )
}
