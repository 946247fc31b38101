use crate::entity::EntityKind;
use crate::error::SchemaError;
use crate::schema::{DateRule, FieldRule, NumberRule, Schema, TextRule};

use super::common;

/// Login password: 8 to 64 characters mixing upper and lower case letters,
/// digits and at least one special character.
fn password() -> FieldRule {
    FieldRule::required(
        "password",
        TextRule::new()
            .length(8, 64)
            .pattern("[A-Z]", "must contain an uppercase letter")
            .pattern("[a-z]", "must contain a lowercase letter")
            .pattern("[0-9]", "must contain a digit")
            .pattern("[^A-Za-z0-9]", "must contain a special character"),
    )
}

pub(super) fn schema() -> Result<Schema, SchemaError> {
    Schema::new(
        EntityKind::User,
        vec![
            FieldRule::required("name", TextRule::new().length(2, 120)),
            common::document(&["CPF"]),
            FieldRule::required("department", TextRule::new().length(2, 80)),
            FieldRule::required("position", TextRule::new().length(2, 80)),
            common::phone(),
            FieldRule::required("salary", NumberRule::new().min(0)),
            FieldRule::optional("hiredAt", DateRule::new().min("1950-01-01")),
            common::address(),
            common::email(),
            password(),
            FieldRule::optional("accessLevel", TextRule::new().length(1, 64)),
            common::status(),
        ],
    )
}
