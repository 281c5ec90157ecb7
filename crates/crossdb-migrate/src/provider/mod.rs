//! The uniform schema-operation API.
//!
//! [`TransformationProvider`] exposes one set of schema operations that
//! behave identically in outcome on every supported engine. Dialect-agnostic
//! SQL comes from the [`SchemaDialect`] defaults; where an engine lacks a
//! feature, the provider composes an emulation from dialect-supplied pieces
//! (sequence + trigger auto-increment, temporary-column type changes).
//!
//! Every destructive or renaming operation performs its existence/conflict
//! check against the catalog immediately before emitting SQL instead of
//! relying on the engine to reject the statement: the errors must be
//! dialect-independent and must name the offending identifier, and raw
//! engine errors would leak dialect-specific wording.

use std::sync::Arc;

use uuid::Uuid;

use crate::core::identifier::ensure_within_limit;
use crate::core::schema::{ColumnDef, ConstraintDef, FkAction, TableDef};
use crate::core::traits::{MigrationLog, SchemaDialect, SqlExecutor};
use crate::core::value::SqlValue;
use crate::error::{MigrateError, Result};
use crate::introspect::Introspector;

/// Fixed name of the column used by the temporary-column type change.
///
/// A leftover from a crashed run surfaces as a rename conflict rather than
/// being silently reused.
pub const TEMP_COLUMN: &str = "tmp_column_swap";

/// Whether operations submit SQL or only construct and log it.
///
/// Dry runs still read the catalog (reads are safe); every write is emitted
/// through the log sink and suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Execute statements against the database.
    #[default]
    Apply,
    /// Construct and log statements without executing them.
    DryRun,
}

/// Outcome of a best-effort cleanup operation.
///
/// Callers deliberately ignore `NotFound` (not every table has an emulation
/// sequence); genuine execution failures propagate as errors instead of
/// being swallowed with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The object existed and was dropped.
    Removed,
    /// There was nothing to drop.
    NotFound,
}

/// The uniform schema-operation API, translated per dialect.
pub struct TransformationProvider {
    executor: Arc<dyn SqlExecutor>,
    dialect: Arc<dyn SchemaDialect>,
    introspect: Introspector,
    log: Arc<dyn MigrationLog>,
    mode: ExecutionMode,
    max_identifier_length: usize,
}

impl TransformationProvider {
    /// Create a provider for the given executor and dialect.
    pub fn new(
        executor: Arc<dyn SqlExecutor>,
        dialect: Arc<dyn SchemaDialect>,
        log: Arc<dyn MigrationLog>,
    ) -> Self {
        let max_identifier_length = dialect.max_identifier_length();
        let introspect = Introspector::new(executor.clone(), dialect.clone(), None);
        Self {
            executor,
            dialect,
            introspect,
            log,
            mode: ExecutionMode::Apply,
            max_identifier_length,
        }
    }

    /// Scope catalog queries to a default schema.
    #[must_use]
    pub fn with_default_schema(mut self, schema: Option<String>) -> Self {
        self.introspect = Introspector::new(self.executor.clone(), self.dialect.clone(), schema);
        self
    }

    /// Override the dialect's identifier-length limit.
    #[must_use]
    pub fn with_identifier_limit(mut self, max: usize) -> Self {
        self.max_identifier_length = max;
        self
    }

    /// Set the execution mode.
    pub fn set_mode(&mut self, mode: ExecutionMode) {
        self.mode = mode;
    }

    /// Current execution mode.
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// The dialect this provider translates to.
    pub fn dialect(&self) -> &Arc<dyn SchemaDialect> {
        &self.dialect
    }

    /// The observability sink.
    pub fn log(&self) -> Arc<dyn MigrationLog> {
        self.log.clone()
    }

    /// Read-only catalog access.
    pub fn introspection(&self) -> &Introspector {
        &self.introspect
    }

    // ===== Internal write path =====

    fn check_identifier(&self, name: &str) -> Result<()> {
        ensure_within_limit(name, self.max_identifier_length)
    }

    async fn run(&self, sql: String) -> Result<u64> {
        self.log.sql(&sql);
        match self.mode {
            ExecutionMode::DryRun => Ok(0),
            ExecutionMode::Apply => self.executor.execute(&sql).await,
        }
    }

    async fn run_with_params(&self, sql: String, values: Vec<SqlValue>) -> Result<u64> {
        self.log.sql(&sql);
        match self.mode {
            ExecutionMode::DryRun => Ok(0),
            ExecutionMode::Apply => {
                let params: Vec<SqlValue> = values
                    .into_iter()
                    .map(|v| self.dialect.bind_value(v))
                    .collect();
                self.executor.execute_with_params(&sql, &params).await
            }
        }
    }

    // ===== Introspection forwards =====

    /// Whether a table exists.
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        self.introspect.table_exists(table).await
    }

    /// Whether a column exists on a table.
    pub async fn column_exists(&self, table: &str, column: &str) -> Result<bool> {
        self.introspect.column_exists(table, column).await
    }

    /// Whether a named constraint exists on a table.
    pub async fn constraint_exists(&self, table: &str, name: &str) -> Result<bool> {
        self.introspect.constraint_exists(table, name).await
    }

    /// Whether a named index exists on a table.
    pub async fn index_exists(&self, table: &str, name: &str) -> Result<bool> {
        self.introspect.index_exists(table, name).await
    }

    /// A table's columns with semantic types and nullability.
    pub async fn get_columns(&self, table: &str) -> Result<Vec<ColumnDef>> {
        self.introspect.get_columns(table).await
    }

    /// All table names in scope.
    pub async fn get_tables(&self) -> Result<Vec<String>> {
        self.introspect.get_tables().await
    }

    // ===== Schema operations =====

    /// Create a table from its descriptor.
    ///
    /// The table name and every column name are checked against the
    /// identifier limit before any SQL is issued, so an invalid descriptor
    /// never leaves partial DDL behind. On engines without native
    /// auto-increment the backing sequence and trigger are provisioned
    /// immediately after the table.
    pub async fn add_table(&self, table: &TableDef) -> Result<()> {
        self.check_identifier(&table.name)?;
        for column in &table.columns {
            self.check_identifier(&column.name)?;
        }

        self.run(self.dialect.create_table_sql(&table.name, &table.columns))
            .await?;

        if !self.dialect.has_native_auto_increment() {
            if let Some(column) = table.columns.iter().find(|c| c.auto_increment) {
                for sql in self
                    .dialect
                    .auto_increment_emulation_sql(&table.name, &column.name)
                {
                    self.run(sql).await?;
                }
            }
        }
        Ok(())
    }

    /// Drop a table, then clean up its auto-increment emulation sequence if
    /// one was provisioned. A missing sequence is the normal case and is
    /// ignored.
    pub async fn remove_table(&self, table: &str) -> Result<()> {
        self.check_identifier(table)?;
        self.run(self.dialect.drop_table_sql(table)).await?;

        if !self.dialect.has_native_auto_increment() {
            if let CleanupOutcome::Removed = self.drop_auto_increment_emulation(table).await? {
                self.log
                    .info(&format!("Dropped auto-increment sequence for table '{table}'"));
            }
        }
        Ok(())
    }

    /// Drop the emulation sequence backing a table's auto-increment column.
    ///
    /// Checks the catalog first so a legitimately absent sequence reports
    /// [`CleanupOutcome::NotFound`] instead of an engine error.
    pub async fn drop_auto_increment_emulation(&self, table: &str) -> Result<CleanupOutcome> {
        let sequence = self.dialect.sequence_name(table);
        if !self.introspect.sequence_exists(&sequence).await? {
            return Ok(CleanupOutcome::NotFound);
        }
        self.run(self.dialect.drop_sequence_sql(table)).await?;
        Ok(CleanupOutcome::Removed)
    }

    /// Rename a table. Fails with a conflict error when the target name is
    /// already taken, before any SQL is issued.
    pub async fn rename_table(&self, old: &str, new: &str) -> Result<()> {
        self.check_identifier(old)?;
        self.check_identifier(new)?;
        if self.introspect.table_exists(new).await? {
            return Err(MigrateError::Conflict {
                kind: "table",
                existing: old.to_string(),
                requested: new.to_string(),
            });
        }
        self.run(self.dialect.rename_table_sql(old, new)).await?;
        Ok(())
    }

    /// Rename a column. Fails with a conflict error when the target name is
    /// already taken on the table.
    pub async fn rename_column(&self, table: &str, old: &str, new: &str) -> Result<()> {
        self.check_identifier(table)?;
        self.check_identifier(old)?;
        self.check_identifier(new)?;
        if self.introspect.column_exists(table, new).await? {
            return Err(MigrateError::Conflict {
                kind: "column",
                existing: old.to_string(),
                requested: new.to_string(),
            });
        }
        self.run(self.dialect.rename_column_sql(table, old, new))
            .await?;
        Ok(())
    }

    /// Add a column to an existing table.
    pub async fn add_column(&self, table: &str, column: &ColumnDef) -> Result<()> {
        self.check_identifier(table)?;
        self.check_identifier(&column.name)?;
        self.run(self.dialect.add_column_sql(table, column)).await?;
        Ok(())
    }

    /// Drop a column from a table.
    pub async fn remove_column(&self, table: &str, column: &str) -> Result<()> {
        self.check_identifier(table)?;
        self.check_identifier(column)?;
        self.run(self.dialect.drop_column_sql(table, column)).await?;
        Ok(())
    }

    /// Change an existing column's type and nullability.
    ///
    /// A change to an absent column is treated as already satisfied: it
    /// logs a warning and succeeds. On engines that cannot alter a
    /// character column's type in place while preserving values and
    /// nullability together, the change goes through a temporary column:
    /// rename aside, add the new column with NOT NULL stripped, copy the
    /// values, drop the temporary, and only then re-apply NOT NULL.
    /// Re-applying the constraint before the copy would reject existing
    /// rows, so that ordering is fixed.
    pub async fn change_column(&self, table: &str, column: &ColumnDef) -> Result<()> {
        self.check_identifier(table)?;
        self.check_identifier(&column.name)?;

        if !self.introspect.column_exists(table, &column.name).await? {
            self.log.warn(&format!(
                "Column '{}' does not exist on table '{table}', nothing to change",
                column.name
            ));
            return Ok(());
        }

        if column.ty.is_string_like() && !self.dialect.can_alter_type_in_place() {
            return self.change_column_via_temp(table, column).await;
        }

        // Re-asserting an unchanged nullability is rejected by some engines
        // that are otherwise satisfied; drop the redundant clause.
        let render_nullability = if column.ty.is_string_like() {
            true
        } else {
            let current = self
                .introspect
                .get_columns(table)
                .await?
                .into_iter()
                .find(|c| c.name.eq_ignore_ascii_case(&column.name));
            match current {
                Some(current) => current.is_not_null() != column.is_not_null(),
                None => true,
            }
        };

        for sql in self
            .dialect
            .change_column_sql(table, column, render_nullability)
        {
            self.run(sql).await?;
        }
        Ok(())
    }

    async fn change_column_via_temp(&self, table: &str, column: &ColumnDef) -> Result<()> {
        self.rename_column(table, &column.name, TEMP_COLUMN).await?;

        // The new column starts nullable; existing rows have no value for it
        // until the copy below.
        let mut relaxed = column.clone();
        relaxed.nullable = None;
        relaxed.primary_key = false;
        relaxed.auto_increment = false;
        self.run(self.dialect.add_column_sql(table, &relaxed)).await?;

        self.run(format!(
            "UPDATE {} SET {} = {}",
            self.dialect.quote_ident(table),
            self.dialect.quote_ident(&column.name),
            self.dialect.quote_ident(TEMP_COLUMN)
        ))
        .await?;

        self.run(self.dialect.drop_column_sql(table, TEMP_COLUMN))
            .await?;

        if column.is_not_null() {
            self.run(self.dialect.set_not_null_sql(table, column)).await?;
        }
        Ok(())
    }

    /// Remove a column's default value with an explicit statement; not all
    /// engines infer this from a column redefinition. Where defaults are
    /// named constraints, the name is resolved from the catalog first.
    pub async fn remove_column_default_value(&self, table: &str, column: &str) -> Result<()> {
        self.check_identifier(table)?;
        self.check_identifier(column)?;

        match self.dialect.default_constraint_query(table, column) {
            Some(query) => match self.executor.query_scalar(&query).await? {
                Some(SqlValue::Text(name)) => {
                    self.run(self.dialect.drop_constraint_sql(table, &name))
                        .await?;
                }
                _ => {
                    self.log.warn(&format!(
                        "No default constraint found for '{table}.{column}', nothing to remove"
                    ));
                }
            },
            None => {
                self.run(self.dialect.drop_default_sql(table, column)).await?;
            }
        }
        Ok(())
    }

    /// Add a constraint from its descriptor. Adding a constraint whose name
    /// already exists on the table logs a warning and succeeds, so
    /// re-applied migrations stay idempotent.
    pub async fn add_constraint(&self, constraint: &ConstraintDef) -> Result<()> {
        self.check_identifier(&constraint.name)?;
        self.check_identifier(&constraint.table)?;
        for column in &constraint.columns {
            self.check_identifier(column)?;
        }
        if let crate::core::schema::ConstraintKind::ForeignKey {
            ref_table,
            ref_columns,
            ..
        } = &constraint.kind
        {
            self.check_identifier(ref_table)?;
            for column in ref_columns {
                self.check_identifier(column)?;
            }
        }

        if self
            .introspect
            .constraint_exists(&constraint.table, &constraint.name)
            .await?
        {
            self.log.warn(&format!(
                "Constraint '{}' already exists on table '{}', skipping",
                constraint.name, constraint.table
            ));
            return Ok(());
        }

        self.run(self.dialect.add_constraint_sql(constraint)).await?;
        Ok(())
    }

    /// Add a foreign key constraint.
    pub async fn add_foreign_key(
        &self,
        name: &str,
        table: &str,
        columns: &[&str],
        ref_table: &str,
        ref_columns: &[&str],
        on_delete: FkAction,
    ) -> Result<()> {
        let constraint = ConstraintDef::foreign_key(
            name,
            table,
            columns.iter().map(|c| c.to_string()).collect(),
            ref_table,
            ref_columns.iter().map(|c| c.to_string()).collect(),
            on_delete,
        );
        self.add_constraint(&constraint).await
    }

    /// Add a unique constraint.
    pub async fn add_unique_constraint(
        &self,
        name: &str,
        table: &str,
        columns: &[&str],
    ) -> Result<()> {
        let constraint =
            ConstraintDef::unique(name, table, columns.iter().map(|c| c.to_string()).collect());
        self.add_constraint(&constraint).await
    }

    /// Add a primary key constraint.
    pub async fn add_primary_key(&self, name: &str, table: &str, columns: &[&str]) -> Result<()> {
        let constraint = ConstraintDef::primary_key(
            name,
            table,
            columns.iter().map(|c| c.to_string()).collect(),
        );
        self.add_constraint(&constraint).await
    }

    /// Drop a named constraint.
    pub async fn remove_constraint(&self, table: &str, name: &str) -> Result<()> {
        self.check_identifier(table)?;
        self.check_identifier(name)?;
        self.run(self.dialect.drop_constraint_sql(table, name)).await?;
        Ok(())
    }

    /// Create an index. Adding an index whose name already exists on the
    /// table logs a warning and succeeds.
    pub async fn add_index(
        &self,
        name: &str,
        table: &str,
        columns: &[&str],
        unique: bool,
    ) -> Result<()> {
        self.check_identifier(name)?;
        self.check_identifier(table)?;
        for column in columns {
            self.check_identifier(column)?;
        }

        if self.introspect.index_exists(table, name).await? {
            self.log.warn(&format!(
                "Index '{name}' already exists on table '{table}', skipping"
            ));
            return Ok(());
        }

        self.run(self.dialect.add_index_sql(name, table, columns, unique))
            .await?;
        Ok(())
    }

    /// Drop a named index.
    pub async fn remove_index(&self, table: &str, name: &str) -> Result<()> {
        self.check_identifier(table)?;
        self.check_identifier(name)?;
        self.run(self.dialect.drop_index_sql(table, name)).await?;
        Ok(())
    }

    // ===== DML helpers =====

    /// Insert a row. Values are bound as parameters and mapped through the
    /// dialect (booleans and UUIDs take engine-specific forms).
    pub async fn insert(
        &self,
        table: &str,
        columns: &[&str],
        values: Vec<SqlValue>,
    ) -> Result<u64> {
        self.check_identifier(table)?;
        for column in columns {
            self.check_identifier(column)?;
        }
        if columns.len() != values.len() {
            return Err(MigrateError::Config(format!(
                "insert into '{table}': {} columns but {} values",
                columns.len(),
                values.len()
            )));
        }
        self.run_with_params(self.dialect.insert_sql(table, columns), values)
            .await
    }

    /// Update rows, assigning bound values to columns, with an optional
    /// WHERE clause.
    pub async fn update(
        &self,
        table: &str,
        set_columns: &[&str],
        values: Vec<SqlValue>,
        where_clause: Option<&str>,
    ) -> Result<u64> {
        self.check_identifier(table)?;
        for column in set_columns {
            self.check_identifier(column)?;
        }
        if set_columns.len() != values.len() {
            return Err(MigrateError::Config(format!(
                "update of '{table}': {} columns but {} values",
                set_columns.len(),
                values.len()
            )));
        }
        self.run_with_params(
            self.dialect.update_sql(table, set_columns, where_clause),
            values,
        )
        .await
    }

    /// Execute a raw statement through the provider's write path (logged,
    /// suppressed in dry runs).
    pub async fn execute(&self, sql: &str) -> Result<u64> {
        self.run(sql.to_string()).await
    }

    /// Deterministic hex encoding of a UUID's raw bytes, for engines with
    /// no native UUID literal syntax.
    #[must_use]
    pub fn encode(&self, id: Uuid) -> String {
        hex::encode(id.as_bytes())
    }
}
