//! Error types for the migration library.

use thiserror::Error;

/// Main error type for migration operations.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Configuration error (invalid YAML, unknown dialect, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// An identifier exceeds the dialect's maximum length.
    ///
    /// Raised before any SQL is emitted so the message stays
    /// dialect-independent and names the offending identifier.
    #[error("Identifier '{identifier}' is {length} characters long, exceeding the {max}-character limit")]
    NamingConstraint {
        identifier: String,
        length: usize,
        max: usize,
    },

    /// The target name of a rename or add operation already exists.
    #[error("Cannot rename {kind} '{existing}': '{requested}' already exists")]
    Conflict {
        kind: &'static str,
        existing: String,
        requested: String,
    },

    /// The database rejected a statement. Carries the failing SQL as context.
    #[error("Database error while executing `{sql}`: {message}")]
    Execution { sql: String, message: String },

    /// Two migration definitions declare the same version.
    #[error("Duplicate migration version {0}")]
    DuplicateVersion(i64),

    /// A version is recorded as applied but its definition was not discovered,
    /// so it cannot be reverted.
    #[error("Version {0} is recorded as applied but no migration with that version was discovered")]
    MissingMigration(i64),

    /// YAML deserialization error for configuration files.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error (reading configuration files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrateError {
    /// Create an Execution error with the failing statement attached.
    pub fn execution(sql: impl Into<String>, message: impl Into<String>) -> Self {
        MigrateError::Execution {
            sql: sql.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for migration operations.
pub type Result<T> = std::result::Result<T, MigrateError>;
