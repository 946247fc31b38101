use crate::entity::EntityKind;
use crate::error::SchemaError;
use crate::schema::{EnumRule, FieldRule, Schema, TextRule};

use super::common;

pub(super) const CATEGORIES: &[&str] = &[
    "vehicles",
    "maintenance",
    "insurance",
    "fuel",
    "tires",
    "services",
];

pub(super) fn schema() -> Result<Schema, SchemaError> {
    Schema::new(
        EntityKind::Supplier,
        vec![
            FieldRule::required("name", TextRule::new().length(3, 120)),
            FieldRule::optional("tradeName", TextRule::new().max_length(120)),
            common::document(&["CNPJ", "CPF"]),
            FieldRule::required("category", EnumRule::of(CATEGORIES)),
            common::email(),
            common::phone(),
            FieldRule::optional("contactName", TextRule::new().length(2, 120)),
            common::address(),
            FieldRule::optional("notes", TextRule::new().max_length(500)),
            common::status(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;
    use serde_json::json;

    #[test]
    fn supplier_defaults_status_and_country() {
        let schema = schema().unwrap();
        let input = json!({
            "name": "Locadora Paulista Ltda",
            "document": { "type": "CNPJ", "number": "12345678000199" },
            "category": "maintenance",
            "email": "contato@paulista.com.br",
            "phone": "1133334444",
            "address": {
                "zipCode": "01310100",
                "street": "Av. Paulista",
                "number": "900",
                "neighborhood": "Bela Vista",
                "city": "São Paulo",
                "state": "SP"
            }
        });
        let result = validate(&schema, input.as_object().unwrap());
        let record = result.record().expect("valid supplier");
        assert_eq!(record["status"], json!("active"));
        assert_eq!(record["address"]["country"], json!("Brasil"));
    }

    #[test]
    fn supplier_rejects_unknown_category() {
        let schema = schema().unwrap();
        let input = json!({ "category": "catering" });
        let result = validate(&schema, input.as_object().unwrap());
        let category = result
            .errors()
            .iter()
            .find(|e| e.path == "category")
            .unwrap();
        assert!(category.message.starts_with("must be one of: vehicles"));
    }
}
