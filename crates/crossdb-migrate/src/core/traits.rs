//! Core traits for the migration engine.
//!
//! This module defines the primary abstractions:
//!
//! - [`SqlExecutor`]: the database connectivity seam the caller provides
//! - [`MigrationLog`]: the observability sink injected into provider and runner
//! - [`SchemaDialect`]: SQL syntax strategy for different database engines
//!
//! # Design Patterns
//!
//! - **Strategy**: [`SchemaDialect`] provides interchangeable SQL generation;
//!   default methods are the generic algorithm, dialects override exactly the
//!   operations where the generic SQL is invalid or semantically wrong
//! - **Template Method**: multi-statement operations (temporary-column type
//!   changes, auto-increment emulation) are composed by the provider from
//!   dialect-supplied pieces

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::identifier::{emulation_object_name, string_literal};
use crate::core::schema::{ColumnDef, ConstraintDef, ConstraintKind, FkAction, SemanticType};
use crate::core::value::{Row, SqlValue};
use crate::error::Result;

/// Database connectivity primitives consumed by the engine.
///
/// Connection management, pooling and wire protocols are the caller's
/// responsibility; the engine only needs these three query shapes plus a
/// parameterized variant for DML value binding.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Execute a statement and return the affected row count.
    async fn execute(&self, sql: &str) -> Result<u64>;

    /// Execute a statement with bound parameter values.
    async fn execute_with_params(&self, sql: &str, params: &[SqlValue]) -> Result<u64>;

    /// Execute a query and return the first column of the first row.
    async fn query_scalar(&self, sql: &str) -> Result<Option<SqlValue>>;

    /// Execute a query and return all rows.
    async fn query(&self, sql: &str) -> Result<Vec<Row>>;
}

/// Observability sink for provider and runner.
///
/// Passed in explicitly at construction instead of calling a global logger
/// from inside operations; the default [`TracingLog`] forwards to `tracing`,
/// and tests install a collecting sink.
pub trait MigrationLog: Send + Sync {
    /// Informational progress message.
    fn info(&self, message: &str);

    /// Warning (idempotent no-op conditions, non-fatal cleanup outcomes).
    fn warn(&self, message: &str);

    /// A generated SQL statement, emitted before execution and during dry
    /// runs in place of it.
    fn sql(&self, sql: &str);
}

/// Default [`MigrationLog`] backed by `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl MigrationLog for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }

    fn sql(&self, sql: &str) {
        tracing::debug!(sql, "generated statement");
    }
}

/// Map a native catalog type into a semantic type.
///
/// Integral numerics with zero scale become 16-bit integers when the
/// precision fits in 10 digits and 64-bit integers otherwise; nonzero scale
/// becomes decimal; temporal types become date-time; anything unrecognized
/// falls back to a string type.
#[must_use]
pub fn classify_native_type(native: &str, length: i64, precision: i64, scale: i64) -> SemanticType {
    match native {
        t if t.contains("bool") || t == "bit" => SemanticType::Boolean,
        "tinyint" | "smallint" | "int2" => SemanticType::Int16,
        "int" | "integer" | "int4" | "mediumint" => SemanticType::Int32,
        "bigint" | "int8" => SemanticType::Int64,
        t if t.contains("float") || t.contains("double") || t == "real" => SemanticType::Float64,
        "number" | "numeric" | "decimal" | "dec" => {
            if scale == 0 {
                if precision <= 10 {
                    SemanticType::Int16
                } else {
                    SemanticType::Int64
                }
            } else {
                SemanticType::Decimal {
                    precision: precision.clamp(0, u8::MAX as i64) as u8,
                    scale: scale.clamp(0, u8::MAX as i64) as u8,
                }
            }
        }
        t if t.contains("date") || t.contains("time") => SemanticType::DateTime,
        "uuid" | "uniqueidentifier" => SemanticType::Uuid,
        t if t.contains("clob") || t.contains("text") => SemanticType::Text,
        t if t.contains("blob") || t.contains("binary") || t == "bytea" || t == "raw" => {
            if length > 0 {
                SemanticType::Binary(length.clamp(0, u32::MAX as i64) as u32)
            } else {
                SemanticType::Blob
            }
        }
        t if t.contains("char") && length > 0 => {
            SemanticType::String(length.clamp(0, u32::MAX as i64) as u32)
        }
        _ => SemanticType::Text,
    }
}

/// SQL syntax strategy for a database engine.
///
/// The provided methods generate dialect-agnostic SQL; an implementation
/// overrides the ones where its engine's syntax or feature set differs.
/// Everything here is pure string construction - no I/O.
pub trait SchemaDialect: Send + Sync {
    // ===== Identity and naming =====

    /// Dialect identifier (e.g. "postgres", "oracle").
    fn name(&self) -> &'static str;

    /// Maximum identifier length the engine accepts.
    fn max_identifier_length(&self) -> usize;

    /// Quote an identifier using the engine's quoting syntax, only when the
    /// name requires it (reserved word or mixed case).
    fn quote_ident(&self, name: &str) -> String;

    // ===== Capabilities =====

    /// Whether the engine has a native auto-increment column syntax.
    fn has_native_auto_increment(&self) -> bool {
        true
    }

    /// Whether a column's type can be altered in place while values and
    /// nullability are preserved together.
    fn can_alter_type_in_place(&self) -> bool {
        true
    }

    /// Whether DDL participates in transactions. Engines without this
    /// auto-commit each DDL statement, so a failed migration may need
    /// manual correction.
    fn supports_transactional_ddl(&self) -> bool {
        true
    }

    /// Whether the engine has a native boolean parameter type.
    fn has_native_boolean(&self) -> bool {
        true
    }

    /// Whether the engine has a native UUID parameter type.
    fn has_native_uuid(&self) -> bool {
        true
    }

    // ===== Types and values =====

    /// Render a semantic type into the engine's native type name.
    fn render_type(&self, ty: &SemanticType) -> String {
        match ty {
            SemanticType::Boolean => "BOOLEAN".to_string(),
            SemanticType::Int16 => "SMALLINT".to_string(),
            SemanticType::Int32 => "INTEGER".to_string(),
            SemanticType::Int64 => "BIGINT".to_string(),
            SemanticType::Float64 => "DOUBLE PRECISION".to_string(),
            SemanticType::Decimal { precision, scale } => format!("NUMERIC({precision}, {scale})"),
            SemanticType::String(len) => format!("VARCHAR({len})"),
            SemanticType::Text => "TEXT".to_string(),
            SemanticType::Binary(len) => format!("VARBINARY({len})"),
            SemanticType::Blob => "BLOB".to_string(),
            SemanticType::Date => "DATE".to_string(),
            SemanticType::DateTime => "TIMESTAMP".to_string(),
            SemanticType::Uuid => "CHAR(36)".to_string(),
        }
    }

    /// Parameter placeholder for the given 1-based index.
    fn param_placeholder(&self, index: usize) -> String;

    /// Map a parameter value into the form the engine can bind.
    ///
    /// Engines without native boolean or UUID parameter types get 0/1
    /// integers and raw bytes respectively; everything else passes through.
    fn bind_value(&self, value: SqlValue) -> SqlValue {
        match value {
            SqlValue::Bool(b) if !self.has_native_boolean() => SqlValue::I32(i32::from(b)),
            SqlValue::Uuid(u) if !self.has_native_uuid() => SqlValue::Bytes(u.as_bytes().to_vec()),
            other => other,
        }
    }

    /// UUID literal syntax.
    fn uuid_literal(&self, value: &Uuid) -> String {
        format!("'{value}'")
    }

    /// Render a value as a SQL literal for DEFAULT clauses.
    fn render_default(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Bool(b) => {
                let literal = if self.has_native_boolean() {
                    if *b {
                        "TRUE"
                    } else {
                        "FALSE"
                    }
                } else if *b {
                    "1"
                } else {
                    "0"
                };
                literal.to_string()
            }
            SqlValue::I16(v) => v.to_string(),
            SqlValue::I32(v) => v.to_string(),
            SqlValue::I64(v) => v.to_string(),
            SqlValue::F64(v) => v.to_string(),
            SqlValue::Text(v) => string_literal(v),
            SqlValue::Bytes(v) => format!("X'{}'", hex::encode(v)),
            SqlValue::Uuid(v) => self.uuid_literal(v),
            SqlValue::Decimal(v) => v.to_string(),
            SqlValue::Date(v) => format!("'{}'", v.format("%Y-%m-%d")),
            SqlValue::DateTime(v) => format!("'{}'", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }

    // ===== Column and DDL rendering =====

    /// Syntax appended to an auto-increment column's type, or `None` when
    /// the engine has no native form and the provider must emulate.
    fn auto_increment_suffix(&self) -> Option<&'static str> {
        Some("GENERATED BY DEFAULT AS IDENTITY")
    }

    /// Render a column clause: name, type, identity, default, nullability,
    /// uniqueness. Primary key placement is handled by
    /// [`create_table_sql`](Self::create_table_sql).
    fn render_column(&self, col: &ColumnDef) -> String {
        let mut clause = format!("{} {}", self.quote_ident(&col.name), self.render_type(&col.ty));
        if col.auto_increment {
            if let Some(suffix) = self.auto_increment_suffix() {
                clause.push(' ');
                clause.push_str(suffix);
            }
        }
        if let Some(default) = &col.default {
            clause.push_str(" DEFAULT ");
            clause.push_str(&self.render_default(default));
        }
        if col.is_not_null() {
            clause.push_str(" NOT NULL");
        } else if col.nullable == Some(true) {
            clause.push_str(" NULL");
        }
        if col.unique {
            clause.push_str(" UNIQUE");
        }
        clause
    }

    /// CREATE TABLE statement. A single primary key column is declared
    /// inline; a composite key becomes a table-level constraint with a
    /// deterministically derived name.
    fn create_table_sql(&self, table: &str, columns: &[ColumnDef]) -> String {
        let pk: Vec<&str> = columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect();

        let mut clauses: Vec<String> = Vec::with_capacity(columns.len() + 1);
        for col in columns {
            let mut clause = self.render_column(col);
            if pk.len() == 1 && col.primary_key {
                clause.push_str(" PRIMARY KEY");
            }
            clauses.push(clause);
        }

        if pk.len() > 1 {
            let name = emulation_object_name(table, "_pk", self.max_identifier_length());
            clauses.push(format!(
                "CONSTRAINT {} PRIMARY KEY ({})",
                self.quote_ident(&name),
                pk.iter()
                    .map(|c| self.quote_ident(c))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        format!(
            "CREATE TABLE {} ({})",
            self.quote_ident(table),
            clauses.join(", ")
        )
    }

    /// DROP TABLE statement.
    fn drop_table_sql(&self, table: &str) -> String {
        format!("DROP TABLE {}", self.quote_ident(table))
    }

    /// Table rename statement.
    fn rename_table_sql(&self, old: &str, new: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.quote_ident(old),
            self.quote_ident(new)
        )
    }

    /// Column rename statement.
    fn rename_column_sql(&self, table: &str, old: &str, new: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.quote_ident(table),
            self.quote_ident(old),
            self.quote_ident(new)
        )
    }

    /// ALTER TABLE ... ADD statement for a new column.
    fn add_column_sql(&self, table: &str, column: &ColumnDef) -> String {
        format!(
            "ALTER TABLE {} ADD {}",
            self.quote_ident(table),
            self.render_column(column)
        )
    }

    /// ALTER TABLE ... DROP COLUMN statement.
    fn drop_column_sql(&self, table: &str, column: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote_ident(table),
            self.quote_ident(column)
        )
    }

    /// Statements redefining an existing column's type (and, when
    /// `render_nullability` is set, its nullability).
    fn change_column_sql(
        &self,
        table: &str,
        column: &ColumnDef,
        render_nullability: bool,
    ) -> Vec<String> {
        let mut clause = format!(
            "{} {}",
            self.quote_ident(&column.name),
            self.render_type(&column.ty)
        );
        if render_nullability {
            if column.is_not_null() {
                clause.push_str(" NOT NULL");
            } else if column.nullable == Some(true) {
                clause.push_str(" NULL");
            }
        }
        vec![format!(
            "ALTER TABLE {} ALTER COLUMN {}",
            self.quote_ident(table),
            clause
        )]
    }

    /// Statement applying NOT NULL to an existing, populated column.
    fn set_not_null_sql(&self, table: &str, column: &ColumnDef) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} SET NOT NULL",
            self.quote_ident(table),
            self.quote_ident(&column.name)
        )
    }

    /// Statement removing a column's default value.
    fn drop_default_sql(&self, table: &str, column: &str) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} DROP DEFAULT",
            self.quote_ident(table),
            self.quote_ident(column)
        )
    }

    /// Catalog query resolving the name of the default constraint backing a
    /// column default, for engines that model defaults as named constraints.
    fn default_constraint_query(&self, _table: &str, _column: &str) -> Option<String> {
        None
    }

    /// ALTER TABLE ... ADD CONSTRAINT statement.
    fn add_constraint_sql(&self, constraint: &ConstraintDef) -> String {
        let cols = constraint
            .columns
            .iter()
            .map(|c| self.quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let body = match &constraint.kind {
            ConstraintKind::PrimaryKey => format!("PRIMARY KEY ({cols})"),
            ConstraintKind::Unique => format!("UNIQUE ({cols})"),
            ConstraintKind::ForeignKey {
                ref_table,
                ref_columns,
                on_delete,
            } => {
                let ref_cols = ref_columns
                    .iter()
                    .map(|c| self.quote_ident(c))
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut body = format!(
                    "FOREIGN KEY ({cols}) REFERENCES {} ({ref_cols})",
                    self.quote_ident(ref_table)
                );
                if *on_delete != FkAction::NoAction {
                    body.push_str(" ON DELETE ");
                    body.push_str(on_delete.as_sql());
                }
                body
            }
        };
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {}",
            self.quote_ident(&constraint.table),
            self.quote_ident(&constraint.name),
            body
        )
    }

    /// ALTER TABLE ... DROP CONSTRAINT statement.
    fn drop_constraint_sql(&self, table: &str, name: &str) -> String {
        format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.quote_ident(table),
            self.quote_ident(name)
        )
    }

    /// CREATE INDEX statement.
    fn add_index_sql(&self, name: &str, table: &str, columns: &[&str], unique: bool) -> String {
        let cols = columns
            .iter()
            .map(|c| self.quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "CREATE {}INDEX {} ON {} ({})",
            if unique { "UNIQUE " } else { "" },
            self.quote_ident(name),
            self.quote_ident(table),
            cols
        )
    }

    /// DROP INDEX statement.
    fn drop_index_sql(&self, _table: &str, name: &str) -> String {
        format!("DROP INDEX {}", self.quote_ident(name))
    }

    // ===== Auto-increment emulation =====

    /// Name of the sequence backing an emulated auto-increment column,
    /// derived deterministically from the table name within the identifier
    /// limit.
    fn sequence_name(&self, table: &str) -> String {
        emulation_object_name(table, "_seq", self.max_identifier_length())
    }

    /// Statements provisioning the auto-increment emulation (sequence plus
    /// insert trigger). Empty for engines with native support.
    fn auto_increment_emulation_sql(&self, _table: &str, _column: &str) -> Vec<String> {
        Vec::new()
    }

    /// Statement dropping the emulation sequence.
    fn drop_sequence_sql(&self, table: &str) -> String {
        format!("DROP SEQUENCE {}", self.quote_ident(&self.sequence_name(table)))
    }

    /// Catalog query checking whether a sequence exists, where the engine
    /// has sequences at all.
    fn sequence_exists_query(&self, _name: &str) -> Option<String> {
        None
    }

    // ===== Transactions =====

    /// Statement opening a transaction.
    fn begin_transaction_sql(&self) -> &'static str {
        "BEGIN"
    }

    /// Statement committing a transaction.
    fn commit_sql(&self) -> &'static str {
        "COMMIT"
    }

    /// Statement rolling back a transaction.
    fn rollback_sql(&self) -> &'static str {
        "ROLLBACK"
    }

    // ===== Catalog queries =====
    //
    // Parametrization-free and case-normalized: name filters are embedded as
    // escaped literals and compared via LOWER() on both sides.

    /// COUNT query checking whether a table exists.
    fn table_exists_query(&self, schema: Option<&str>, table: &str) -> String {
        let mut sql = format!(
            "SELECT COUNT(*) FROM information_schema.tables WHERE LOWER(table_name) = LOWER({})",
            string_literal(table)
        );
        if let Some(schema) = schema {
            sql.push_str(&format!(
                " AND LOWER(table_schema) = LOWER({})",
                string_literal(schema)
            ));
        }
        sql
    }

    /// COUNT query checking whether a column exists on a table.
    fn column_exists_query(&self, schema: Option<&str>, table: &str, column: &str) -> String {
        let mut sql = format!(
            "SELECT COUNT(*) FROM information_schema.columns WHERE LOWER(table_name) = LOWER({}) AND LOWER(column_name) = LOWER({})",
            string_literal(table),
            string_literal(column)
        );
        if let Some(schema) = schema {
            sql.push_str(&format!(
                " AND LOWER(table_schema) = LOWER({})",
                string_literal(schema)
            ));
        }
        sql
    }

    /// COUNT query checking whether a named constraint exists on a table.
    fn constraint_exists_query(&self, schema: Option<&str>, table: &str, name: &str) -> String {
        let mut sql = format!(
            "SELECT COUNT(*) FROM information_schema.table_constraints WHERE LOWER(table_name) = LOWER({}) AND LOWER(constraint_name) = LOWER({})",
            string_literal(table),
            string_literal(name)
        );
        if let Some(schema) = schema {
            sql.push_str(&format!(
                " AND LOWER(table_schema) = LOWER({})",
                string_literal(schema)
            ));
        }
        sql
    }

    /// COUNT query checking whether a named index exists on a table.
    fn index_exists_query(&self, schema: Option<&str>, table: &str, name: &str) -> String;

    /// Query listing table names.
    fn tables_query(&self, schema: Option<&str>) -> String {
        let mut sql =
            "SELECT table_name FROM information_schema.tables WHERE table_type = 'BASE TABLE'"
                .to_string();
        if let Some(schema) = schema {
            sql.push_str(&format!(
                " AND LOWER(table_schema) = LOWER({})",
                string_literal(schema)
            ));
        }
        sql.push_str(" ORDER BY table_name");
        sql
    }

    /// Query listing a table's columns as
    /// `(name, native_type, length, precision, scale, nullable)` rows.
    fn columns_query(&self, schema: Option<&str>, table: &str) -> String {
        let mut sql = format!(
            "SELECT column_name, data_type, COALESCE(character_maximum_length, 0), COALESCE(numeric_precision, 0), COALESCE(numeric_scale, 0), is_nullable FROM information_schema.columns WHERE LOWER(table_name) = LOWER({})",
            string_literal(table)
        );
        if let Some(schema) = schema {
            sql.push_str(&format!(
                " AND LOWER(table_schema) = LOWER({})",
                string_literal(schema)
            ));
        }
        sql.push_str(" ORDER BY ordinal_position");
        sql
    }

    /// Map one row of [`columns_query`](Self::columns_query) output into a
    /// column descriptor.
    fn parse_column(&self, row: &Row) -> Result<ColumnDef> {
        let name = row.get_str(0)?.to_string();
        let native = row.get_str(1)?.to_ascii_lowercase();
        let length = row.get_i64(2)?;
        let precision = row.get_i64(3)?;
        let scale = row.get_i64(4)?;
        let nullable = matches!(
            row.get_str(5)?.to_ascii_lowercase().as_str(),
            "yes" | "y" | "true" | "1"
        );

        let mut col = ColumnDef::new(name, classify_native_type(&native, length, precision, scale));
        col.nullable = Some(nullable);
        Ok(col)
    }

    // ===== DML =====

    /// INSERT statement with parameter placeholders for each column.
    fn insert_sql(&self, table: &str, columns: &[&str]) -> String {
        let cols = columns
            .iter()
            .map(|c| self.quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|i| self.param_placeholder(i))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.quote_ident(table),
            cols,
            placeholders
        )
    }

    /// UPDATE statement assigning a placeholder to each column, with an
    /// optional caller-supplied WHERE clause.
    fn update_sql(&self, table: &str, set_columns: &[&str], where_clause: Option<&str>) -> String {
        let assignments = set_columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{} = {}", self.quote_ident(c), self.param_placeholder(i + 1)))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("UPDATE {} SET {}", self.quote_ident(table), assignments);
        if let Some(clause) = where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identifier::quote_with;

    // Minimal dialect exercising the generic SQL generation paths.
    struct AnsiDialect;

    impl SchemaDialect for AnsiDialect {
        fn name(&self) -> &'static str {
            "ansi"
        }

        fn max_identifier_length(&self) -> usize {
            63
        }

        fn quote_ident(&self, name: &str) -> String {
            quote_with(name, '"', '"')
        }

        fn param_placeholder(&self, index: usize) -> String {
            format!("${index}")
        }

        fn index_exists_query(&self, _schema: Option<&str>, _table: &str, _name: &str) -> String {
            String::new()
        }
    }

    #[test]
    fn test_render_column_not_null_unique() {
        let d = AnsiDialect;
        let col = ColumnDef::new("email", SemanticType::String(120)).not_null().unique();
        assert_eq!(d.render_column(&col), "email VARCHAR(120) NOT NULL UNIQUE");
    }

    #[test]
    fn test_render_column_default_literal() {
        let d = AnsiDialect;
        let col = ColumnDef::new("active", SemanticType::Boolean).default_value(true);
        assert_eq!(d.render_column(&col), "active BOOLEAN DEFAULT TRUE");
    }

    #[test]
    fn test_create_table_single_pk_inline() {
        let d = AnsiDialect;
        let sql = d.create_table_sql(
            "users",
            &[
                ColumnDef::new("id", SemanticType::Int64).primary_key(),
                ColumnDef::new("name", SemanticType::String(50)).not_null(),
            ],
        );
        assert_eq!(
            sql,
            "CREATE TABLE users (id BIGINT NOT NULL PRIMARY KEY, name VARCHAR(50) NOT NULL)"
        );
    }

    #[test]
    fn test_create_table_composite_pk_constraint() {
        let d = AnsiDialect;
        let sql = d.create_table_sql(
            "order_lines",
            &[
                ColumnDef::new("order_id", SemanticType::Int64).primary_key(),
                ColumnDef::new("line_no", SemanticType::Int32).primary_key(),
            ],
        );
        assert!(sql.contains("CONSTRAINT order_lines_pk PRIMARY KEY (order_id, line_no)"));
        // No inline PRIMARY KEY on the individual columns
        assert!(!sql.contains("BIGINT NOT NULL PRIMARY KEY,"));
    }

    #[test]
    fn test_auto_increment_renders_identity() {
        let d = AnsiDialect;
        let col = ColumnDef::new("id", SemanticType::Int64).auto_increment();
        assert_eq!(
            d.render_column(&col),
            "id BIGINT GENERATED BY DEFAULT AS IDENTITY NOT NULL"
        );
    }

    #[test]
    fn test_add_foreign_key_with_action() {
        let d = AnsiDialect;
        let fk = ConstraintDef::foreign_key(
            "fk_orders_users",
            "orders",
            vec!["user_id".to_string()],
            "users",
            vec!["id".to_string()],
            FkAction::Cascade,
        );
        assert_eq!(
            d.add_constraint_sql(&fk),
            "ALTER TABLE orders ADD CONSTRAINT fk_orders_users FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE"
        );
    }

    #[test]
    fn test_add_foreign_key_no_action_omits_clause() {
        let d = AnsiDialect;
        let fk = ConstraintDef::foreign_key(
            "fk_a_b",
            "a",
            vec!["b_id".to_string()],
            "b",
            vec!["id".to_string()],
            FkAction::NoAction,
        );
        assert!(!d.add_constraint_sql(&fk).contains("ON DELETE"));
    }

    #[test]
    fn test_catalog_queries_are_case_normalized_literals() {
        let d = AnsiDialect;
        let sql = d.table_exists_query(Some("app"), "Users");
        assert!(sql.contains("LOWER(table_name) = LOWER('Users')"));
        assert!(sql.contains("LOWER(table_schema) = LOWER('app')"));
        assert!(sql.starts_with("SELECT COUNT(*)"));
    }

    #[test]
    fn test_catalog_query_escapes_quotes_in_names() {
        let d = AnsiDialect;
        let sql = d.table_exists_query(None, "we'ird");
        assert!(sql.contains("'we''ird'"));
    }

    #[test]
    fn test_insert_sql_uses_placeholders() {
        let d = AnsiDialect;
        assert_eq!(
            d.insert_sql("users", &["name", "age"]),
            "INSERT INTO users (name, age) VALUES ($1, $2)"
        );
    }

    #[test]
    fn test_update_sql_with_where() {
        let d = AnsiDialect;
        assert_eq!(
            d.update_sql("users", &["name"], Some("id = 1")),
            "UPDATE users SET name = $1 WHERE id = 1"
        );
    }

    #[test]
    fn test_change_column_drops_nullability_when_asked() {
        let d = AnsiDialect;
        let col = ColumnDef::new("age", SemanticType::Int32).not_null();
        let with = d.change_column_sql("users", &col, true);
        let without = d.change_column_sql("users", &col, false);
        assert_eq!(with, vec!["ALTER TABLE users ALTER COLUMN age INTEGER NOT NULL"]);
        assert_eq!(without, vec!["ALTER TABLE users ALTER COLUMN age INTEGER"]);
    }

    #[test]
    fn test_classify_native_numeric_rule() {
        // Zero scale: precision decides the integer width
        assert_eq!(classify_native_type("number", 0, 5, 0), SemanticType::Int16);
        assert_eq!(classify_native_type("number", 0, 10, 0), SemanticType::Int16);
        assert_eq!(classify_native_type("number", 0, 11, 0), SemanticType::Int64);
        // Nonzero scale: decimal
        assert_eq!(
            classify_native_type("numeric", 0, 12, 2),
            SemanticType::Decimal { precision: 12, scale: 2 }
        );
    }

    #[test]
    fn test_classify_native_temporal_and_string() {
        assert_eq!(classify_native_type("datetime2", 0, 0, 0), SemanticType::DateTime);
        assert_eq!(classify_native_type("timestamp", 0, 0, 0), SemanticType::DateTime);
        assert_eq!(classify_native_type("varchar2", 80, 0, 0), SemanticType::String(80));
        assert_eq!(classify_native_type("nvarchar", 40, 0, 0), SemanticType::String(40));
        // Unrecognized types default to a string type
        assert_eq!(classify_native_type("sql_variant", 0, 0, 0), SemanticType::Text);
    }

    #[test]
    fn test_bind_value_passthrough_by_default() {
        let d = AnsiDialect;
        assert_eq!(d.bind_value(SqlValue::Bool(true)), SqlValue::Bool(true));
        let u = Uuid::nil();
        assert_eq!(d.bind_value(SqlValue::Uuid(u)), SqlValue::Uuid(u));
    }
}
