//! Database dialect implementations.
//!
//! Each module implements [`SchemaDialect`] for one engine, overriding the
//! generic SQL generation exactly where that engine's syntax or feature set
//! differs:
//!
//! - [`postgres`]: PostgreSQL (in-place type changes split into ALTER steps)
//! - [`mssql`]: Microsoft SQL Server (`sp_rename`, named default constraints)
//! - [`mysql`]: MySQL/MariaDB (`MODIFY`, current-database catalog scoping)
//! - [`oracle`]: Oracle (30-char identifiers, sequence+trigger auto-increment
//!   emulation, temporary-column type changes)
//!
//! # Adding New Databases
//!
//! 1. Create a new module under `dialects/`
//! 2. Implement [`SchemaDialect`], overriding only what differs
//! 3. Register the tag in [`from_db_type`]

use std::sync::Arc;

use crate::core::traits::SchemaDialect;
use crate::error::{MigrateError, Result};

pub mod mssql;
pub mod mysql;
pub mod oracle;
pub mod postgres;

pub use mssql::MssqlDialect;
pub use mysql::MysqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;

/// Get the canonical dialect tag for a configured database type.
///
/// Normalizes aliases:
/// - "postgres", "postgresql", "pg" → "postgres"
/// - "mssql", "sqlserver", "sql_server" → "mssql"
/// - "mysql", "mariadb" → "mysql"
/// - "oracle", "ora" → "oracle"
pub fn normalize_db_type(db_type: &str) -> Result<&'static str> {
    match db_type.to_lowercase().as_str() {
        "postgres" | "postgresql" | "pg" => Ok("postgres"),
        "mssql" | "sqlserver" | "sql_server" => Ok("mssql"),
        "mysql" | "mariadb" => Ok("mysql"),
        "oracle" | "ora" => Ok("oracle"),
        other => Err(MigrateError::Config(format!(
            "Unknown database dialect: '{}'. Supported dialects: postgres, mssql, mysql, oracle",
            other
        ))),
    }
}

/// Create a dialect from a configured database type string.
///
/// # Errors
///
/// Returns a configuration error for unrecognized database types.
pub fn from_db_type(db_type: &str) -> Result<Arc<dyn SchemaDialect>> {
    match normalize_db_type(db_type)? {
        "postgres" => Ok(Arc::new(PostgresDialect::new())),
        "mssql" => Ok(Arc::new(MssqlDialect::new())),
        "mysql" => Ok(Arc::new(MysqlDialect::new())),
        "oracle" => Ok(Arc::new(OracleDialect::new())),
        _ => unreachable!(), // normalize_db_type only returns the four tags above
    }
}
