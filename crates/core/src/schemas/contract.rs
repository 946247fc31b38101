use crate::entity::EntityKind;
use crate::error::SchemaError;
use crate::schema::{
    CrossFieldCheck, DateRule, EnumRule, FieldRule, NumberRule, ObjectRule, Schema, TextRule,
};

pub(super) fn schema() -> Result<Schema, SchemaError> {
    Schema::with_checks(
        EntityKind::Contract,
        vec![
            FieldRule::required(
                "number",
                TextRule::new().pattern(
                    r"^CT-\d{4}-\d{3,6}$",
                    "must look like CT-2024-001",
                ),
            ),
            FieldRule::required("supplierId", TextRule::new().length(1, 64)),
            FieldRule::required(
                "type",
                EnumRule::of(&["rental", "leasing", "maintenance", "insurance"]),
            ),
            FieldRule::optional(
                "vehicle",
                ObjectRule::new(vec![
                    FieldRule::required(
                        "plate",
                        TextRule::new().pattern(
                            r"^[A-Z]{3}-?\d[A-Z0-9]\d{2}$",
                            "must be a plate like ABC-1234 or ABC1D23",
                        ),
                    ),
                    FieldRule::required("model", TextRule::new().length(2, 80)),
                    FieldRule::optional(
                        "year",
                        NumberRule::new().integer().min(1990).max(2100),
                    ),
                ]),
            ),
            FieldRule::required("startDate", DateRule::new().min("2000-01-01")),
            FieldRule::required("endDate", DateRule::new()),
            FieldRule::required("monthlyValue", NumberRule::new().min(0)),
            FieldRule::optional("paymentDay", NumberRule::new().integer().min(1).max(28))
                .with_default(10),
            FieldRule::optional("notes", TextRule::new().max_length(1000)),
            FieldRule::optional(
                "status",
                EnumRule::of(&["draft", "active", "suspended", "terminated"]),
            )
            .with_default("active"),
        ],
        vec![CrossFieldCheck::DateOrder {
            earlier: "startDate".to_string(),
            later: "endDate".to_string(),
            message: "must not be before the start date".to_string(),
        }],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldErrorKind;
    use crate::validate::validate;
    use serde_json::json;

    fn base() -> serde_json::Value {
        json!({
            "number": "CT-2024-001",
            "supplierId": "1",
            "type": "rental",
            "vehicle": { "plate": "ABC1D23", "model": "Onix 1.0", "year": "2023" },
            "startDate": "2024-01-01",
            "endDate": "2024-12-31",
            "monthlyValue": "2500.00"
        })
    }

    #[test]
    fn contract_normalizes_numbers_and_defaults() {
        let schema = schema().unwrap();
        let result = validate(&schema, base().as_object().unwrap());
        let record = result.record().expect("valid contract");
        assert_eq!(record["monthlyValue"], json!(2500));
        assert_eq!(record["vehicle"]["year"], json!(2023));
        assert_eq!(record["paymentDay"], json!(10));
        assert_eq!(record["status"], json!("active"));
    }

    #[test]
    fn contract_end_before_start_is_rejected() {
        let schema = schema().unwrap();
        let mut input = base();
        input["endDate"] = json!("2023-12-31");
        let result = validate(&schema, input.as_object().unwrap());
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].path, "endDate");
        assert_eq!(result.errors()[0].kind, FieldErrorKind::CrossField);
    }

    #[test]
    fn contract_vehicle_is_optional_when_blank() {
        let schema = schema().unwrap();
        let mut input = base();
        input["vehicle"] = json!({ "plate": "", "model": "" });
        let result = validate(&schema, input.as_object().unwrap());
        assert!(result.is_valid());
        assert!(!result.record().unwrap().contains_key("vehicle"));
    }
}
