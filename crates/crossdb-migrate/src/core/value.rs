//! SQL value types for parameter binding and introspection rows.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{MigrateError, Result};

/// SQL value enum for type-safe parameter binding and catalog row handling.
///
/// Values are always owned: the engine binds a handful of parameters per
/// statement and reads small catalog result sets, so zero-copy buffers
/// would buy nothing here.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// NULL value.
    Null,

    /// Boolean value.
    Bool(bool),

    /// 16-bit signed integer (smallint).
    I16(i16),

    /// 32-bit signed integer (int).
    I32(i32),

    /// 64-bit signed integer (bigint).
    I64(i64),

    /// 64-bit floating point (double precision).
    F64(f64),

    /// Text/string data.
    Text(String),

    /// Binary data.
    Bytes(Vec<u8>),

    /// UUID/GUID value.
    Uuid(Uuid),

    /// Decimal value with arbitrary precision.
    Decimal(Decimal),

    /// Date without time component.
    Date(NaiveDate),

    /// Timestamp without timezone.
    DateTime(NaiveDateTime),
}

impl SqlValue {
    /// Check if this value is NULL.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Interpret the value as an integer, widening smaller integer types.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::I16(v) => Some(*v as i64),
            SqlValue::I32(v) => Some(*v as i64),
            SqlValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Interpret the value as text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        SqlValue::I16(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::I32(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::I64(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::F64(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v)
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::DateTime(v)
    }
}

/// A single result row from a catalog query.
///
/// Columns are positional; the introspection layer knows the shape of the
/// queries it issues.
#[derive(Debug, Clone, Default)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    /// Create a row from its column values.
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    /// Number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a column value by position.
    pub fn get(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Get a text column by position.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the column is missing or not text;
    /// catalog queries have fixed shapes, so a mismatch means the dialect's
    /// query and parser disagree.
    pub fn get_str(&self, index: usize) -> Result<&str> {
        self.values
            .get(index)
            .and_then(SqlValue::as_str)
            .ok_or_else(|| {
                MigrateError::Config(format!("catalog row has no text column at position {index}"))
            })
    }

    /// Get an integer column by position. NULL reads as zero, matching how
    /// catalog views report absent precision/scale.
    pub fn get_i64(&self, index: usize) -> Result<i64> {
        match self.values.get(index) {
            Some(SqlValue::Null) | None => Ok(0),
            Some(v) => v.as_i64().ok_or_else(|| {
                MigrateError::Config(format!(
                    "catalog row has no integer column at position {index}"
                ))
            }),
        }
    }
}

impl From<Vec<SqlValue>> for Row {
    fn from(values: Vec<SqlValue>) -> Self {
        Self::new(values)
    }
}
