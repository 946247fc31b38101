use frota_core::EntityKind;

use crate::OutputFormat;

pub(crate) fn cmd_entities(output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Text => {
            if !quiet {
                println!("{:<14} {:<18} ROUTE", "KIND", "LABEL");
            }
            for kind in EntityKind::ALL {
                println!(
                    "{:<14} {:<18} {}",
                    kind.as_str(),
                    kind.label(),
                    kind.list_route()
                );
            }
        }
        OutputFormat::Json => {
            let kinds: Vec<serde_json::Value> = EntityKind::ALL
                .iter()
                .map(|kind| {
                    serde_json::json!({
                        "kind": kind.as_str(),
                        "label": kind.label(),
                        "route": kind.list_route(),
                    })
                })
                .collect();
            super::print_json(&serde_json::Value::Array(kinds));
        }
    }
}
