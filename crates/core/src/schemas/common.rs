//! Field groups shared by several entity schemas.

use crate::schema::{EnumRule, FieldRule, ObjectRule, TextRule};

pub(super) const STATUS_VALUES: &[&str] = &["active", "inactive"];

pub(super) fn status() -> FieldRule {
    FieldRule::optional("status", EnumRule::of(STATUS_VALUES)).with_default("active")
}

pub(super) fn email() -> FieldRule {
    FieldRule::required(
        "email",
        TextRule::new()
            .max_length(254)
            .pattern(r"^[^\s@]+@[^\s@]+\.[^\s@]+$", "must be a valid e-mail address"),
    )
}

pub(super) fn phone() -> FieldRule {
    FieldRule::required(
        "phone",
        TextRule::new().pattern(
            r"^\+?\d{10,15}$",
            "must have 10 to 15 digits, optionally prefixed with +",
        ),
    )
}

/// `document: { type, number }`: CPF (11 digits) or CNPJ (14 digits).
pub(super) fn document(types: &[&str]) -> FieldRule {
    FieldRule::required(
        "document",
        ObjectRule::new(vec![
            FieldRule::required("type", EnumRule::of(types)),
            FieldRule::required(
                "number",
                TextRule::new().pattern(
                    r"^(\d{11}|\d{14})$",
                    "must have 11 (CPF) or 14 (CNPJ) digits, without punctuation",
                ),
            ),
        ]),
    )
}

/// Brazilian postal address. `country` defaults to `Brasil`.
pub(super) fn address() -> FieldRule {
    FieldRule::required(
        "address",
        ObjectRule::new(vec![
            FieldRule::required(
                "zipCode",
                TextRule::new().pattern(r"^\d{5}-?\d{3}$", "must be a CEP like 01310-100"),
            ),
            FieldRule::required("street", TextRule::new().length(2, 120)),
            FieldRule::required("number", TextRule::new().length(1, 10)),
            FieldRule::optional("complement", TextRule::new().max_length(60)),
            FieldRule::required("neighborhood", TextRule::new().length(2, 80)),
            FieldRule::required("city", TextRule::new().length(2, 80)),
            FieldRule::required(
                "state",
                TextRule::new().pattern(r"^[A-Z]{2}$", "must be a two-letter state code"),
            ),
            FieldRule::optional("country", TextRule::new().length(2, 60)).with_default("Brasil"),
        ]),
    )
}
