use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::Schema;
use crate::schemas;

/// The entity kinds managed by the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Supplier,
    Contract,
    User,
    AccessLevel,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Supplier,
        EntityKind::Contract,
        EntityKind::User,
        EntityKind::AccessLevel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Supplier => "supplier",
            EntityKind::Contract => "contract",
            EntityKind::User => "user",
            EntityKind::AccessLevel => "access_level",
        }
    }

    /// Display label used in the back office menus.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Supplier => "Fornecedores",
            EntityKind::Contract => "Contratos",
            EntityKind::User => "Usuários",
            EntityKind::AccessLevel => "Níveis de acesso",
        }
    }

    /// Route of the list view a successful submission navigates to.
    pub fn list_route(&self) -> &'static str {
        match self {
            EntityKind::Supplier => "/fornecedores",
            EntityKind::Contract => "/contratos",
            EntityKind::User => "/usuarios",
            EntityKind::AccessLevel => "/niveis-acesso",
        }
    }

    /// The built-in schema for this kind.
    pub fn schema(&self) -> &'static Schema {
        schemas::for_kind(*self)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown entity kind name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind '{0}' (expected one of: supplier, contract, user, access_level)")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    /// Accepts the snake_case name, its kebab-case spelling, or the
    /// Portuguese route segment (`fornecedores`, `niveis-acesso`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        match lowered.as_str() {
            "supplier" | "fornecedor" | "fornecedores" => Ok(EntityKind::Supplier),
            "contract" | "contrato" | "contratos" => Ok(EntityKind::Contract),
            "user" | "usuario" | "usuarios" => Ok(EntityKind::User),
            "access_level" | "access-level" | "nivel-acesso" | "niveis-acesso" => {
                Ok(EntityKind::AccessLevel)
            }
            _ => Err(UnknownEntityKind(s.to_string())),
        }
    }
}
