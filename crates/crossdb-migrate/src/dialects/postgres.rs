//! PostgreSQL schema dialect (Strategy pattern).

use crate::core::identifier::{quote_with, string_literal};
use crate::core::schema::{ColumnDef, SemanticType};
use crate::core::traits::SchemaDialect;

/// PostgreSQL dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Create a new PostgreSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl SchemaDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
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
            SemanticType::Binary(_) | SemanticType::Blob => "BYTEA".to_string(),
            SemanticType::Date => "DATE".to_string(),
            SemanticType::DateTime => "TIMESTAMP".to_string(),
            SemanticType::Uuid => "UUID".to_string(),
        }
    }

    // Type and nullability cannot share one ALTER COLUMN clause here; each
    // aspect gets its own statement.
    fn change_column_sql(
        &self,
        table: &str,
        column: &ColumnDef,
        render_nullability: bool,
    ) -> Vec<String> {
        let table_q = self.quote_ident(table);
        let column_q = self.quote_ident(&column.name);
        let mut statements = vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            table_q,
            column_q,
            self.render_type(&column.ty)
        )];
        if render_nullability {
            if column.is_not_null() {
                statements.push(format!(
                    "ALTER TABLE {table_q} ALTER COLUMN {column_q} SET NOT NULL"
                ));
            } else if column.nullable == Some(true) {
                statements.push(format!(
                    "ALTER TABLE {table_q} ALTER COLUMN {column_q} DROP NOT NULL"
                ));
            }
        }
        statements
    }

    fn sequence_exists_query(&self, name: &str) -> Option<String> {
        Some(format!(
            "SELECT COUNT(*) FROM information_schema.sequences WHERE LOWER(sequence_name) = LOWER({})",
            string_literal(name)
        ))
    }

    fn index_exists_query(&self, schema: Option<&str>, table: &str, name: &str) -> String {
        let mut sql = format!(
            "SELECT COUNT(*) FROM pg_indexes WHERE LOWER(tablename) = LOWER({}) AND LOWER(indexname) = LOWER({})",
            string_literal(table),
            string_literal(name)
        );
        if let Some(schema) = schema {
            sql.push_str(&format!(
                " AND LOWER(schemaname) = LOWER({})",
                string_literal(schema)
            ));
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.quote_ident("users"), "users");
        assert_eq!(dialect.quote_ident("Users"), "\"Users\"");
        assert_eq!(dialect.quote_ident("order"), "\"order\"");
        assert_eq!(dialect.quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_param_placeholder() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.param_placeholder(1), "$1");
        assert_eq!(dialect.param_placeholder(10), "$10");
    }

    #[test]
    fn test_render_type() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.render_type(&SemanticType::Uuid), "UUID");
        assert_eq!(dialect.render_type(&SemanticType::Blob), "BYTEA");
        assert_eq!(dialect.render_type(&SemanticType::Binary(16)), "BYTEA");
        assert_eq!(dialect.render_type(&SemanticType::String(255)), "VARCHAR(255)");
    }

    #[test]
    fn test_change_column_splits_type_and_nullability() {
        let dialect = PostgresDialect::new();
        let col = ColumnDef::new("age", SemanticType::Int64).not_null();
        let statements = dialect.change_column_sql("users", &col, true);
        assert_eq!(
            statements,
            vec![
                "ALTER TABLE users ALTER COLUMN age TYPE BIGINT",
                "ALTER TABLE users ALTER COLUMN age SET NOT NULL",
            ]
        );
    }

    #[test]
    fn test_change_column_without_nullability() {
        let dialect = PostgresDialect::new();
        let col = ColumnDef::new("age", SemanticType::Int64).not_null();
        let statements = dialect.change_column_sql("users", &col, false);
        assert_eq!(statements, vec!["ALTER TABLE users ALTER COLUMN age TYPE BIGINT"]);
    }

    #[test]
    fn test_native_capabilities() {
        let dialect = PostgresDialect::new();
        assert!(dialect.has_native_auto_increment());
        assert!(dialect.supports_transactional_ddl());
        assert!(dialect.can_alter_type_in_place());
        assert!(dialect.auto_increment_emulation_sql("users", "id").is_empty());
    }
}
