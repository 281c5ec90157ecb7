//! MySQL/MariaDB schema dialect (Strategy pattern).

use crate::core::identifier::{quote_with, string_literal};
use crate::core::schema::{ColumnDef, SemanticType};
use crate::core::traits::SchemaDialect;
use crate::core::value::SqlValue;

/// MySQL dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Create a new MySQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

/// Catalog scope: an explicit schema or the connection's current database.
fn schema_clause(schema: Option<&str>) -> String {
    match schema {
        Some(schema) => format!(" AND LOWER(table_schema) = LOWER({})", string_literal(schema)),
        None => " AND table_schema = DATABASE()".to_string(),
    }
}

impl SchemaDialect for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn max_identifier_length(&self) -> usize {
        64
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_with(name, '`', '`')
    }

    fn param_placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn supports_transactional_ddl(&self) -> bool {
        false
    }

    fn has_native_uuid(&self) -> bool {
        false
    }

    // UUID columns are CHAR(36), so parameters bind as their hyphenated text
    // form rather than raw bytes.
    fn bind_value(&self, value: SqlValue) -> SqlValue {
        match value {
            SqlValue::Uuid(u) => SqlValue::Text(u.to_string()),
            other => other,
        }
    }

    fn render_type(&self, ty: &SemanticType) -> String {
        match ty {
            SemanticType::Boolean => "TINYINT(1)".to_string(),
            SemanticType::Int16 => "SMALLINT".to_string(),
            SemanticType::Int32 => "INT".to_string(),
            SemanticType::Int64 => "BIGINT".to_string(),
            SemanticType::Float64 => "DOUBLE".to_string(),
            SemanticType::Decimal { precision, scale } => format!("DECIMAL({precision}, {scale})"),
            SemanticType::String(len) => format!("VARCHAR({len})"),
            SemanticType::Text => "LONGTEXT".to_string(),
            SemanticType::Binary(len) => format!("VARBINARY({len})"),
            SemanticType::Blob => "LONGBLOB".to_string(),
            SemanticType::Date => "DATE".to_string(),
            SemanticType::DateTime => "DATETIME".to_string(),
            SemanticType::Uuid => "CHAR(36)".to_string(),
        }
    }

    fn auto_increment_suffix(&self) -> Option<&'static str> {
        Some("AUTO_INCREMENT")
    }

    fn rename_table_sql(&self, old: &str, new: &str) -> String {
        format!(
            "RENAME TABLE {} TO {}",
            self.quote_ident(old),
            self.quote_ident(new)
        )
    }

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
            "ALTER TABLE {} MODIFY {}",
            self.quote_ident(table),
            clause
        )]
    }

    fn set_not_null_sql(&self, table: &str, column: &ColumnDef) -> String {
        format!(
            "ALTER TABLE {} MODIFY {} {} NOT NULL",
            self.quote_ident(table),
            self.quote_ident(&column.name),
            self.render_type(&column.ty)
        )
    }

    fn drop_index_sql(&self, table: &str, name: &str) -> String {
        format!(
            "DROP INDEX {} ON {}",
            self.quote_ident(name),
            self.quote_ident(table)
        )
    }

    fn table_exists_query(&self, schema: Option<&str>, table: &str) -> String {
        format!(
            "SELECT COUNT(*) FROM information_schema.tables WHERE LOWER(table_name) = LOWER({}){}",
            string_literal(table),
            schema_clause(schema)
        )
    }

    fn column_exists_query(&self, schema: Option<&str>, table: &str, column: &str) -> String {
        format!(
            "SELECT COUNT(*) FROM information_schema.columns WHERE LOWER(table_name) = LOWER({}) AND LOWER(column_name) = LOWER({}){}",
            string_literal(table),
            string_literal(column),
            schema_clause(schema)
        )
    }

    fn constraint_exists_query(&self, schema: Option<&str>, table: &str, name: &str) -> String {
        format!(
            "SELECT COUNT(*) FROM information_schema.table_constraints WHERE LOWER(table_name) = LOWER({}) AND LOWER(constraint_name) = LOWER({}){}",
            string_literal(table),
            string_literal(name),
            schema_clause(schema)
        )
    }

    fn index_exists_query(&self, schema: Option<&str>, table: &str, name: &str) -> String {
        format!(
            "SELECT COUNT(*) FROM information_schema.statistics WHERE LOWER(table_name) = LOWER({}) AND LOWER(index_name) = LOWER({}){}",
            string_literal(table),
            string_literal(name),
            schema_clause(schema)
        )
    }

    fn tables_query(&self, schema: Option<&str>) -> String {
        format!(
            "SELECT table_name FROM information_schema.tables WHERE table_type = 'BASE TABLE'{} ORDER BY table_name",
            schema_clause(schema)
        )
    }

    fn columns_query(&self, schema: Option<&str>, table: &str) -> String {
        format!(
            "SELECT column_name, data_type, COALESCE(character_maximum_length, 0), COALESCE(numeric_precision, 0), COALESCE(numeric_scale, 0), is_nullable FROM information_schema.columns WHERE LOWER(table_name) = LOWER({}){} ORDER BY ordinal_position",
            string_literal(table),
            schema_clause(schema)
        )
    }
}
