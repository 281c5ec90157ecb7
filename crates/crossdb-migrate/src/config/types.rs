//! Configuration type definitions.

use serde::{Deserialize, Serialize};

use crate::ledger::DEFAULT_LEDGER_TABLE;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Target database configuration.
    pub database: DatabaseConfig,

    /// Migration behavior configuration.
    #[serde(default)]
    pub migration: MigrationConfig,
}

/// Target database configuration.
///
/// Connection details live with the caller's connectivity layer; this only
/// selects the dialect and the catalog scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database dialect ("postgres", "mssql", "mysql", "oracle", or an
    /// alias).
    pub r#type: String,

    /// Default schema scoping catalog queries and the ledger table.
    #[serde(default)]
    pub schema: Option<String>,

    /// Override for the dialect's maximum identifier length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_identifier_length: Option<usize>,
}

/// Migration behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Name of the version ledger table.
    #[serde(default = "default_ledger_table")]
    pub ledger_table: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            ledger_table: default_ledger_table(),
        }
    }
}

fn default_ledger_table() -> String {
    DEFAULT_LEDGER_TABLE.to_string()
}
