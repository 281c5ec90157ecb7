//! Oracle schema dialect (Strategy pattern).
//!
//! Oracle is the most constrained engine this crate targets: 30-character
//! identifiers, no native auto-increment (emulated with a sequence and a
//! BEFORE INSERT trigger), no boolean or UUID parameter types, and column
//! types that cannot be altered in place while values are preserved.

use crate::core::identifier::{emulation_object_name, quote_with, string_literal};
use crate::core::schema::{ColumnDef, SemanticType};
use crate::core::traits::SchemaDialect;

/// Oracle dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct OracleDialect;

impl OracleDialect {
    /// Create a new Oracle dialect instance.
    pub fn new() -> Self {
        Self
    }

    /// Name of the trigger backing an emulated auto-increment column.
    fn trigger_name(&self, table: &str) -> String {
        emulation_object_name(table, "_trg", self.max_identifier_length())
    }
}

impl SchemaDialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn max_identifier_length(&self) -> usize {
        30
    }

    fn quote_ident(&self, name: &str) -> String {
        quote_with(name, '"', '"')
    }

    fn param_placeholder(&self, index: usize) -> String {
        format!(":{index}")
    }

    fn has_native_auto_increment(&self) -> bool {
        false
    }

    fn can_alter_type_in_place(&self) -> bool {
        false
    }

    fn supports_transactional_ddl(&self) -> bool {
        false
    }

    fn has_native_boolean(&self) -> bool {
        false
    }

    fn has_native_uuid(&self) -> bool {
        false
    }

    fn render_type(&self, ty: &SemanticType) -> String {
        match ty {
            SemanticType::Boolean => "NUMBER(1)".to_string(),
            SemanticType::Int16 => "NUMBER(5)".to_string(),
            SemanticType::Int32 => "NUMBER(10)".to_string(),
            SemanticType::Int64 => "NUMBER(19)".to_string(),
            SemanticType::Float64 => "BINARY_DOUBLE".to_string(),
            SemanticType::Decimal { precision, scale } => format!("NUMBER({precision}, {scale})"),
            SemanticType::String(len) => format!("VARCHAR2({len})"),
            SemanticType::Text => "CLOB".to_string(),
            SemanticType::Binary(len) => format!("RAW({len})"),
            SemanticType::Blob => "BLOB".to_string(),
            SemanticType::Date => "DATE".to_string(),
            SemanticType::DateTime => "TIMESTAMP".to_string(),
            SemanticType::Uuid => "RAW(16)".to_string(),
        }
    }

    fn auto_increment_suffix(&self) -> Option<&'static str> {
        None
    }

    // RAW columns take hex literals.
    fn uuid_literal(&self, value: &uuid::Uuid) -> String {
        string_literal(&hex::encode(value.as_bytes()))
    }

    fn add_column_sql(&self, table: &str, column: &ColumnDef) -> String {
        format!(
            "ALTER TABLE {} ADD ({})",
            self.quote_ident(table),
            self.render_column(column)
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
            "ALTER TABLE {} MODIFY ({})",
            self.quote_ident(table),
            clause
        )]
    }

    fn set_not_null_sql(&self, table: &str, column: &ColumnDef) -> String {
        format!(
            "ALTER TABLE {} MODIFY ({} NOT NULL)",
            self.quote_ident(table),
            self.quote_ident(&column.name)
        )
    }

    fn drop_default_sql(&self, table: &str, column: &str) -> String {
        format!(
            "ALTER TABLE {} MODIFY ({} DEFAULT NULL)",
            self.quote_ident(table),
            self.quote_ident(column)
        )
    }

    fn auto_increment_emulation_sql(&self, table: &str, column: &str) -> Vec<String> {
        let sequence = self.quote_ident(&self.sequence_name(table));
        let trigger = self.quote_ident(&self.trigger_name(table));
        vec![
            format!("CREATE SEQUENCE {sequence} START WITH 1 INCREMENT BY 1"),
            format!(
                "CREATE OR REPLACE TRIGGER {trigger} BEFORE INSERT ON {} FOR EACH ROW BEGIN SELECT {sequence}.NEXTVAL INTO :NEW.{} FROM DUAL; END;",
                self.quote_ident(table),
                self.quote_ident(column)
            ),
        ]
    }

    fn sequence_exists_query(&self, name: &str) -> Option<String> {
        Some(format!(
            "SELECT COUNT(*) FROM user_sequences WHERE LOWER(sequence_name) = LOWER({})",
            string_literal(name)
        ))
    }

    // Catalog views are the USER_* family; the connected user is the schema.

    fn table_exists_query(&self, _schema: Option<&str>, table: &str) -> String {
        format!(
            "SELECT COUNT(*) FROM user_tables WHERE LOWER(table_name) = LOWER({})",
            string_literal(table)
        )
    }

    fn column_exists_query(&self, _schema: Option<&str>, table: &str, column: &str) -> String {
        format!(
            "SELECT COUNT(*) FROM user_tab_columns WHERE LOWER(table_name) = LOWER({}) AND LOWER(column_name) = LOWER({})",
            string_literal(table),
            string_literal(column)
        )
    }

    fn constraint_exists_query(&self, _schema: Option<&str>, table: &str, name: &str) -> String {
        format!(
            "SELECT COUNT(*) FROM user_constraints WHERE LOWER(table_name) = LOWER({}) AND LOWER(constraint_name) = LOWER({})",
            string_literal(table),
            string_literal(name)
        )
    }

    fn index_exists_query(&self, _schema: Option<&str>, table: &str, name: &str) -> String {
        format!(
            "SELECT COUNT(*) FROM user_indexes WHERE LOWER(table_name) = LOWER({}) AND LOWER(index_name) = LOWER({})",
            string_literal(table),
            string_literal(name)
        )
    }

    fn tables_query(&self, _schema: Option<&str>) -> String {
        "SELECT table_name FROM user_tables ORDER BY table_name".to_string()
    }

    fn columns_query(&self, _schema: Option<&str>, table: &str) -> String {
        format!(
            "SELECT column_name, data_type, COALESCE(char_length, 0), COALESCE(data_precision, 0), COALESCE(data_scale, 0), nullable FROM user_tab_columns WHERE LOWER(table_name) = LOWER({}) ORDER BY column_id",
            string_literal(table)
        )
    }
}
