//! Built-in schemas for the back office entities.
//!
//! Each table is built and checked once, on first use. A definition error is
//! a bug in this module and aborts with the [`SchemaError`] that describes it.

mod access_level;
mod common;
mod contract;
mod supplier;
mod user;

use std::sync::OnceLock;

use crate::entity::EntityKind;
use crate::error::SchemaError;
use crate::schema::Schema;

pub use access_level::MODULES as ACCESS_LEVEL_MODULES;

/// Build the schema for `kind` without caching it.
pub fn build(kind: EntityKind) -> Result<Schema, SchemaError> {
    match kind {
        EntityKind::Supplier => supplier::schema(),
        EntityKind::Contract => contract::schema(),
        EntityKind::User => user::schema(),
        EntityKind::AccessLevel => access_level::schema(),
    }
}

/// The process-wide schema for `kind`.
pub fn for_kind(kind: EntityKind) -> &'static Schema {
    static SUPPLIER: OnceLock<Schema> = OnceLock::new();
    static CONTRACT: OnceLock<Schema> = OnceLock::new();
    static USER: OnceLock<Schema> = OnceLock::new();
    static ACCESS_LEVEL: OnceLock<Schema> = OnceLock::new();

    let cell = match kind {
        EntityKind::Supplier => &SUPPLIER,
        EntityKind::Contract => &CONTRACT,
        EntityKind::User => &USER,
        EntityKind::AccessLevel => &ACCESS_LEVEL,
    };
    cell.get_or_init(|| build(kind).unwrap_or_else(|e| panic!("invalid {} schema: {}", kind, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_schema_builds() {
        for kind in EntityKind::ALL {
            let schema = build(kind).unwrap_or_else(|e| panic!("{}: {}", kind, e));
            assert_eq!(schema.kind(), kind);
            assert!(!schema.fields().is_empty());
        }
    }

    #[test]
    fn for_kind_is_cached() {
        let a = for_kind(EntityKind::User) as *const Schema;
        let b = for_kind(EntityKind::User) as *const Schema;
        assert_eq!(a, b);
    }
}
