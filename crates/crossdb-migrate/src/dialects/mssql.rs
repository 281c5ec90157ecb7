//! Microsoft SQL Server schema dialect (Strategy pattern).

use crate::core::identifier::{quote_with, string_literal};
use crate::core::schema::{ColumnDef, SemanticType};
use crate::core::traits::SchemaDialect;

/// Microsoft SQL Server dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct MssqlDialect;

impl MssqlDialect {
    /// Create a new MSSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl SchemaDialect for MssqlDialect {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn max_identifier_length(&self) -> usize {
        128
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_with(name, '[', ']')
    }

    fn param_placeholder(&self, index: usize) -> String {
        format!("@P{index}")
    }

    fn render_type(&self, ty: &SemanticType) -> String {
        match ty {
            SemanticType::Boolean => "BIT".to_string(),
            SemanticType::Int16 => "SMALLINT".to_string(),
            SemanticType::Int32 => "INT".to_string(),
            SemanticType::Int64 => "BIGINT".to_string(),
            SemanticType::Float64 => "FLOAT".to_string(),
            SemanticType::Decimal { precision, scale } => format!("DECIMAL({precision}, {scale})"),
            SemanticType::String(len) => format!("NVARCHAR({len})"),
            SemanticType::Text => "NVARCHAR(MAX)".to_string(),
            SemanticType::Binary(len) => format!("VARBINARY({len})"),
            SemanticType::Blob => "VARBINARY(MAX)".to_string(),
            SemanticType::Date => "DATE".to_string(),
            SemanticType::DateTime => "DATETIME2".to_string(),
            SemanticType::Uuid => "UNIQUEIDENTIFIER".to_string(),
        }
    }

    fn auto_increment_suffix(&self) -> Option<&'static str> {
        Some("IDENTITY(1, 1)")
    }

    fn rename_table_sql(&self, old: &str, new: &str) -> String {
        format!(
            "EXEC sp_rename {}, {}",
            string_literal(old),
            string_literal(new)
        )
    }

    fn rename_column_sql(&self, table: &str, old: &str, new: &str) -> String {
        format!(
            "EXEC sp_rename {}, {}, 'COLUMN'",
            string_literal(&format!("{table}.{old}")),
            string_literal(new)
        )
    }

    // ALTER COLUMN requires the full type to re-assert nullability.
    fn set_not_null_sql(&self, table: &str, column: &ColumnDef) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} {} NOT NULL",
            self.quote_ident(table),
            self.quote_ident(&column.name),
            self.render_type(&column.ty)
        )
    }

    // Column defaults are named constraints here; the provider resolves the
    // name through this query and drops the constraint.
    fn default_constraint_query(&self, table: &str, column: &str) -> Option<String> {
        Some(format!(
            "SELECT dc.name FROM sys.default_constraints dc JOIN sys.columns c ON c.object_id = dc.parent_object_id AND c.column_id = dc.parent_column_id WHERE dc.parent_object_id = OBJECT_ID({}) AND LOWER(c.name) = LOWER({})",
            string_literal(table),
            string_literal(column)
        ))
    }

    fn drop_index_sql(&self, table: &str, name: &str) -> String {
        format!(
            "DROP INDEX {} ON {}",
            self.quote_ident(name),
            self.quote_ident(table)
        )
    }

    fn index_exists_query(&self, _schema: Option<&str>, table: &str, name: &str) -> String {
        format!(
            "SELECT COUNT(*) FROM sys.indexes WHERE object_id = OBJECT_ID({}) AND LOWER(name) = LOWER({})",
            string_literal(table),
            string_literal(name)
        )
    }

    fn begin_transaction_sql(&self) -> &'static str {
        "BEGIN TRANSACTION"
    }
}
