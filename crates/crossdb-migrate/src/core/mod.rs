//! Core abstractions shared across the engine.
//!
//! - [`traits`]: executor, log sink and dialect strategy traits
//! - [`schema`]: descriptors and the semantic type system
//! - [`value`]: SQL value and row types
//! - [`identifier`]: identifier validation, quoting and naming rules

pub mod identifier;
pub mod schema;
pub mod traits;
pub mod value;

pub use schema::{ColumnDef, ConstraintDef, ConstraintKind, FkAction, SemanticType, TableDef};
pub use traits::{MigrationLog, SchemaDialect, SqlExecutor, TracingLog};
pub use value::{Row, SqlValue};
