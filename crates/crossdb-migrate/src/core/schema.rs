//! Schema descriptors: the database-agnostic request objects consumed by the
//! transformation provider.
//!
//! Descriptors describe a desired state change and are translated straight
//! into DDL; they are never a cached model of the schema. The database
//! catalog remains the sole owner of durable schema state, and every
//! existence check re-queries it.

use crate::core::value::SqlValue;

/// Dialect-agnostic column type.
///
/// Each dialect renders these into its native type names; the introspection
/// layer maps native catalog types back into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    /// Boolean/bit type.
    Boolean,
    /// 16-bit signed integer.
    Int16,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// Exact decimal. Precision is total digits, scale is digits after the
    /// decimal point.
    Decimal { precision: u8, scale: u8 },
    /// Variable-length character string with a maximum length.
    String(u32),
    /// Unlimited text.
    Text,
    /// Variable-length binary data with a maximum length.
    Binary(u32),
    /// Unlimited binary data.
    Blob,
    /// Date without time component.
    Date,
    /// Date and time without timezone.
    DateTime,
    /// UUID/GUID (128-bit identifier).
    Uuid,
}

impl SemanticType {
    /// Whether this is a character type. Character types take the
    /// temporary-column path on dialects that cannot alter a column's type
    /// in place.
    #[must_use]
    pub fn is_string_like(&self) -> bool {
        matches!(self, SemanticType::String(_) | SemanticType::Text)
    }
}

/// Column descriptor.
///
/// Nullability is tri-state: `None` defaults to nullable, so a column can
/// never claim NULL and NOT NULL at once.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,

    /// Semantic type, rendered per dialect.
    pub ty: SemanticType,

    /// `Some(false)` renders NOT NULL, `Some(true)` renders an explicit NULL
    /// clause, `None` renders nothing and the engine default (nullable)
    /// applies.
    pub nullable: Option<bool>,

    /// Whether the column participates in the primary key.
    pub primary_key: bool,

    /// Auto-incremented primary key. Implies `primary_key`.
    pub auto_increment: bool,

    /// Whether the column carries a UNIQUE constraint.
    pub unique: bool,

    /// Default value literal, bound through the dialect.
    pub default: Option<SqlValue>,
}

impl ColumnDef {
    /// Create a column with the given name and type, nullable by default.
    pub fn new(name: impl Into<String>, ty: SemanticType) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: None,
            primary_key: false,
            auto_increment: false,
            unique: false,
            default: None,
        }
    }

    /// Require NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = Some(false);
        self
    }

    /// Explicitly allow NULL.
    #[must_use]
    pub fn null(mut self) -> Self {
        self.nullable = Some(true);
        self
    }

    /// Mark as primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark as auto-incremented primary key.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.primary_key = true;
        self.auto_increment = true;
        self
    }

    /// Add a UNIQUE constraint.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set a default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<SqlValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Whether the column is required to be NOT NULL. Primary key columns
    /// are NOT NULL regardless of the explicit flag.
    #[must_use]
    pub fn is_not_null(&self) -> bool {
        self.nullable == Some(false) || self.primary_key
    }
}

/// Table descriptor: a name plus its ordered columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    /// Table name.
    pub name: String,

    /// Column definitions, in declaration order.
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    /// Create a table descriptor.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Names of the primary key columns, in declaration order.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Referential action for foreign keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FkAction {
    /// No action (engine default).
    #[default]
    NoAction,
    /// Cascade the delete/update.
    Cascade,
    /// Set the referencing columns to NULL.
    SetNull,
    /// Set the referencing columns to their default.
    SetDefault,
    /// Restrict the operation.
    Restrict,
}

impl FkAction {
    /// SQL keyword for the action.
    #[must_use]
    pub fn as_sql(&self) -> &'static str {
        match self {
            FkAction::NoAction => "NO ACTION",
            FkAction::Cascade => "CASCADE",
            FkAction::SetNull => "SET NULL",
            FkAction::SetDefault => "SET DEFAULT",
            FkAction::Restrict => "RESTRICT",
        }
    }
}

/// Constraint kind together with its kind-specific payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    /// Primary key over the participating columns.
    PrimaryKey,
    /// Unique constraint over the participating columns.
    Unique,
    /// Foreign key referencing another table.
    ForeignKey {
        /// Referenced table name.
        ref_table: String,
        /// Referenced column names.
        ref_columns: Vec<String>,
        /// ON DELETE action.
        on_delete: FkAction,
    },
}

/// Constraint descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDef {
    /// Constraint name.
    pub name: String,

    /// Table the constraint lives on.
    pub table: String,

    /// Participating column names.
    pub columns: Vec<String>,

    /// Constraint kind.
    pub kind: ConstraintKind,
}

impl ConstraintDef {
    /// Foreign key constraint descriptor.
    pub fn foreign_key(
        name: impl Into<String>,
        table: impl Into<String>,
        columns: Vec<String>,
        ref_table: impl Into<String>,
        ref_columns: Vec<String>,
        on_delete: FkAction,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns,
            kind: ConstraintKind::ForeignKey {
                ref_table: ref_table.into(),
                ref_columns,
                on_delete,
            },
        }
    }

    /// Unique constraint descriptor.
    pub fn unique(name: impl Into<String>, table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns,
            kind: ConstraintKind::Unique,
        }
    }

    /// Primary key constraint descriptor.
    pub fn primary_key(
        name: impl Into<String>,
        table: impl Into<String>,
        columns: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns,
            kind: ConstraintKind::PrimaryKey,
        }
    }
}
