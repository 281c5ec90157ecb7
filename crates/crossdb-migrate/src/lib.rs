//! # crossdb-migrate
//!
//! Versioned, reversible schema migrations across SQL dialects.
//!
//! This library applies an ordered sequence of versioned schema-change
//! definitions against a relational database, tracks which versions have
//! been applied in a ledger table, and supports moving forward or backward
//! between versions with:
//!
//! - **A uniform schema-operation API** that behaves identically in outcome
//!   across PostgreSQL, SQL Server, MySQL and Oracle, emulating missing
//!   features (sequence + trigger auto-increment, temporary-column type
//!   changes) where an engine lacks them
//! - **Per-dialect identifier rules** (quoting, length limits) enforced
//!   before any SQL is emitted
//! - **Transactional steps** where the engine supports transactional DDL
//! - **Dry runs** that plan, introspect and construct SQL without writing
//!
//! Database connectivity is the caller's: implement [`SqlExecutor`] over
//! your connection and hand it to the runner.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use crossdb_migrate::{Config, MigrationRunner, MigrationSet, SqlExecutor, Target};
//!
//! async fn run(executor: Arc<dyn SqlExecutor>, migrations: MigrationSet) -> anyhow::Result<()> {
//!     let config = Config::load("migrate.yaml")?;
//!     let runner = MigrationRunner::from_config(&config, executor, migrations)?;
//!     let report = runner.migrate_to(Target::Latest).await?;
//!     println!("Applied {} migrations", report.applied.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod dialects;
pub mod error;
pub mod introspect;
pub mod ledger;
pub mod migration;
pub mod provider;
pub mod runner;
pub mod testing;

// Re-exports for convenient access
pub use crate::core::schema::{
    ColumnDef, ConstraintDef, ConstraintKind, FkAction, SemanticType, TableDef,
};
pub use crate::core::traits::{MigrationLog, SchemaDialect, SqlExecutor, TracingLog};
pub use crate::core::value::{Row, SqlValue};
pub use config::{Config, DatabaseConfig, MigrationConfig};
pub use error::{MigrateError, Result};
pub use introspect::Introspector;
pub use ledger::VersionLedger;
pub use migration::{Migration, MigrationSet};
pub use provider::{CleanupOutcome, ExecutionMode, TransformationProvider};
pub use runner::{MigrationPlan, MigrationReport, MigrationRunner, RunStatus, Target};
