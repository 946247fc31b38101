use frota_core::json_schema::to_json_schema;
use frota_core::EntityKind;

use super::print_json;

/// Schemas are JSON documents either way, so `--output` does not apply.
pub(crate) fn cmd_schema(kind: EntityKind, json_schema: bool) {
    let schema = kind.schema();
    if json_schema {
        print_json(&to_json_schema(schema));
    } else {
        print_json(&schema.to_json());
    }
}
