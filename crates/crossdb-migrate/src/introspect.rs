//! Schema introspection against the live catalog.
//!
//! Every check is a fresh catalog query; nothing is cached client-side, so
//! existence answers cannot go stale at the cost of extra round-trips.
//! Failures propagate as-is - catalog query failures are not transient in
//! this domain, so there are no retries.

use std::sync::Arc;

use crate::core::schema::ColumnDef;
use crate::core::traits::{SchemaDialect, SqlExecutor};
use crate::error::Result;

/// Read-only catalog queries for one database.
pub struct Introspector {
    executor: Arc<dyn SqlExecutor>,
    dialect: Arc<dyn SchemaDialect>,
    schema: Option<String>,
}

impl Introspector {
    /// Create an introspector scoped to an optional default schema.
    pub fn new(
        executor: Arc<dyn SqlExecutor>,
        dialect: Arc<dyn SchemaDialect>,
        schema: Option<String>,
    ) -> Self {
        Self {
            executor,
            dialect,
            schema,
        }
    }

    fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Run a COUNT query and interpret the scalar as an existence answer.
    async fn count_is_positive(&self, sql: &str) -> Result<bool> {
        let value = self.executor.query_scalar(sql).await?;
        Ok(value.and_then(|v| v.as_i64()).unwrap_or(0) > 0)
    }

    /// Whether a table exists, matched case-insensitively.
    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let sql = self.dialect.table_exists_query(self.schema(), table);
        self.count_is_positive(&sql).await
    }

    /// Whether a column exists on a table.
    ///
    /// Short-circuits to `false` when the table itself is absent; a column
    /// query against a missing table would safely return zero rows anyway,
    /// but the guard keeps the intent explicit.
    pub async fn column_exists(&self, table: &str, column: &str) -> Result<bool> {
        if !self.table_exists(table).await? {
            return Ok(false);
        }
        let sql = self.dialect.column_exists_query(self.schema(), table, column);
        self.count_is_positive(&sql).await
    }

    /// Whether a named constraint exists on a table.
    pub async fn constraint_exists(&self, table: &str, name: &str) -> Result<bool> {
        if !self.table_exists(table).await? {
            return Ok(false);
        }
        let sql = self
            .dialect
            .constraint_exists_query(self.schema(), table, name);
        self.count_is_positive(&sql).await
    }

    /// Whether a named index exists on a table.
    pub async fn index_exists(&self, table: &str, name: &str) -> Result<bool> {
        if !self.table_exists(table).await? {
            return Ok(false);
        }
        let sql = self.dialect.index_exists_query(self.schema(), table, name);
        self.count_is_positive(&sql).await
    }

    /// Whether a sequence exists. Always `false` on engines without
    /// sequences, which the cleanup path reads as nothing-to-drop.
    pub async fn sequence_exists(&self, name: &str) -> Result<bool> {
        match self.dialect.sequence_exists_query(name) {
            Some(sql) => self.count_is_positive(&sql).await,
            None => Ok(false),
        }
    }

    /// A table's columns as descriptors with semantic types and nullability,
    /// in ordinal order.
    pub async fn get_columns(&self, table: &str) -> Result<Vec<ColumnDef>> {
        let sql = self.dialect.columns_query(self.schema(), table);
        let rows = self.executor.query(&sql).await?;
        rows.iter().map(|row| self.dialect.parse_column(row)).collect()
    }

    /// All table names visible in the configured scope.
    pub async fn get_tables(&self) -> Result<Vec<String>> {
        let sql = self.dialect.tables_query(self.schema());
        let rows = self.executor.query(&sql).await?;
        rows.iter()
            .map(|row| row.get_str(0).map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::{Row, SqlValue};
    use crate::dialects::{OracleDialect, PostgresDialect};
    use crate::testing::ScriptedExecutor;

    fn introspector(executor: Arc<ScriptedExecutor>) -> Introspector {
        Introspector::new(executor, Arc::new(PostgresDialect::new()), Some("public".to_string()))
    }

    #[tokio::test]
    async fn test_table_exists_queries_catalog_each_time() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.on_scalar("'users'", SqlValue::I64(1));
        let intro = introspector(executor.clone());

        assert!(intro.table_exists("users").await.unwrap());
        assert!(intro.table_exists("users").await.unwrap());
        // No caching: two calls, two catalog queries
        assert_eq!(executor.recorded().len(), 2);
    }

    #[tokio::test]
    async fn test_column_exists_short_circuits_on_missing_table() {
        let executor = Arc::new(ScriptedExecutor::new());
        let intro = introspector(executor.clone());

        assert!(!intro.column_exists("ghost", "name").await.unwrap());
        // Only the table existence query ran; the column query was skipped
        let recorded = executor.recorded();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].sql.contains("information_schema.tables"));
    }

    #[tokio::test]
    async fn test_get_columns_maps_semantic_types() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.on_query(
            "information_schema.columns",
            vec![
                Row::new(vec![
                    SqlValue::Text("id".to_string()),
                    SqlValue::Text("bigint".to_string()),
                    SqlValue::I64(0),
                    SqlValue::I64(64),
                    SqlValue::I64(0),
                    SqlValue::Text("NO".to_string()),
                ]),
                Row::new(vec![
                    SqlValue::Text("name".to_string()),
                    SqlValue::Text("character varying".to_string()),
                    SqlValue::I64(120),
                    SqlValue::I64(0),
                    SqlValue::I64(0),
                    SqlValue::Text("YES".to_string()),
                ]),
            ],
        );
        let intro = introspector(executor);

        let columns = intro.get_columns("users").await.unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[0].nullable, Some(false));
        assert_eq!(columns[1].name, "name");
        assert_eq!(columns[1].ty, crate::core::schema::SemanticType::String(120));
        assert_eq!(columns[1].nullable, Some(true));
    }

    #[tokio::test]
    async fn test_sequence_exists_false_without_sequence_support() {
        // MySQL has no sequences; the query hook returns None
        let executor = Arc::new(ScriptedExecutor::new());
        let intro = Introspector::new(
            executor.clone(),
            Arc::new(crate::dialects::MysqlDialect::new()),
            None,
        );
        assert!(!intro.sequence_exists("users_seq").await.unwrap());
        assert!(executor.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_sequence_exists_on_oracle() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.on_scalar("user_sequences", SqlValue::I64(1));
        let intro = Introspector::new(executor, Arc::new(OracleDialect::new()), None);
        assert!(intro.sequence_exists("users_seq").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_tables() {
        let executor = Arc::new(ScriptedExecutor::new());
        executor.on_query(
            "information_schema.tables",
            vec![
                Row::new(vec![SqlValue::Text("posts".to_string())]),
                Row::new(vec![SqlValue::Text("users".to_string())]),
            ],
        );
        let intro = introspector(executor);
        assert_eq!(intro.get_tables().await.unwrap(), vec!["posts", "users"]);
    }
}
