//! The version ledger: a dedicated table recording applied migration
//! versions.
//!
//! One row per applied version, a single BIGINT column, optionally
//! schema-qualified. The set of rows is exactly the set of versions that
//! have been applied and not yet rolled back; only the runner mutates it,
//! adding a row per successful forward step and removing one per successful
//! reverse step.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::traits::{SchemaDialect, SqlExecutor};
use crate::core::value::SqlValue;
use crate::error::Result;

/// Default ledger table name.
pub const DEFAULT_LEDGER_TABLE: &str = "schema_info";

/// Persisted record of applied migration versions.
pub struct VersionLedger {
    executor: Arc<dyn SqlExecutor>,
    dialect: Arc<dyn SchemaDialect>,
    schema: Option<String>,
    table: String,
}

impl VersionLedger {
    /// Create a ledger over the given table, optionally schema-qualified.
    pub fn new(
        executor: Arc<dyn SqlExecutor>,
        dialect: Arc<dyn SchemaDialect>,
        schema: Option<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            dialect,
            schema,
            table: table.into(),
        }
    }

    /// The qualified, quoted table reference used in statements.
    fn table_ref(&self) -> String {
        match &self.schema {
            Some(schema) => format!(
                "{}.{}",
                self.dialect.quote_ident(schema),
                self.dialect.quote_ident(&self.table)
            ),
            None => self.dialect.quote_ident(&self.table),
        }
    }

    /// Whether the ledger table exists in the catalog.
    pub async fn exists(&self) -> Result<bool> {
        let sql = self
            .dialect
            .table_exists_query(self.schema.as_deref(), &self.table);
        let value = self.executor.query_scalar(&sql).await?;
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0) > 0)
    }

    /// Create the ledger table if the catalog does not have it yet.
    pub async fn ensure_exists(&self) -> Result<()> {
        if self.exists().await? {
            return Ok(());
        }
        let sql = format!(
            "CREATE TABLE {} (version {} NOT NULL)",
            self.table_ref(),
            self.dialect
                .render_type(&crate::core::schema::SemanticType::Int64)
        );
        self.executor.execute(&sql).await?;
        Ok(())
    }

    /// The set of currently applied versions.
    ///
    /// Reads an empty set when the ledger table does not exist yet, so a
    /// dry run against a fresh database stays read-only.
    pub async fn applied_versions(&self) -> Result<BTreeSet<i64>> {
        if !self.exists().await? {
            return Ok(BTreeSet::new());
        }
        let sql = format!("SELECT version FROM {} ORDER BY version", self.table_ref());
        let rows = self.executor.query(&sql).await?;
        rows.iter().map(|row| row.get_i64(0)).collect()
    }

    /// Record a version as applied.
    pub async fn record_applied(&self, version: i64) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} (version) VALUES ({})",
            self.table_ref(),
            self.dialect.param_placeholder(1)
        );
        self.executor
            .execute_with_params(&sql, &[SqlValue::I64(version)])
            .await?;
        Ok(())
    }

    /// Remove a version after its reverse operation succeeded.
    pub async fn record_reverted(&self, version: i64) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE version = {}",
            self.table_ref(),
            self.dialect.param_placeholder(1)
        );
        self.executor
            .execute_with_params(&sql, &[SqlValue::I64(version)])
            .await?;
        Ok(())
    }
}
