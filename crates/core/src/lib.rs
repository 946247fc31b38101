//! Frota core -- declarative entity schemas and the record validator.
//!
//! A [`Schema`] is plain data: an ordered list of [`FieldRule`]s for one
//! [`EntityKind`]. [`validate`] walks a schema against a candidate JSON
//! record and returns either the normalized record (defaults applied,
//! numeric strings coerced, undeclared keys dropped) or every field error
//! it found, in declared field order.
//!
//! The four built-in schemas (supplier, contract, user, access level) live
//! in [`schemas`] and are built once per process on first use.

pub mod entity;
pub mod error;
pub mod json_schema;
pub mod permissions;
pub mod schema;
pub mod schemas;
pub mod validate;

pub use entity::EntityKind;
pub use error::{FieldError, FieldErrorKind, SchemaError};
pub use permissions::{Capability, CapabilitySet, PermissionMatrix};
pub use schema::{
    CrossFieldCheck, DateRule, EnumRule, FieldRule, NumberRule, ObjectRule, Pattern,
    PermissionRule, Rule, Schema, TextRule,
};
pub use validate::{normalize, validate, validate_field, Record, ValidationResult};
