//! Configuration validation.

use super::Config;
use crate::core::identifier::validate_identifier;
use crate::dialects;
use crate::error::{MigrateError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    if config.database.r#type.is_empty() {
        return Err(MigrateError::Config("database.type is required".into()));
    }
    dialects::normalize_db_type(&config.database.r#type)?;

    if let Some(schema) = &config.database.schema {
        validate_identifier(schema)?;
    }

    if let Some(0) = config.database.max_identifier_length {
        return Err(MigrateError::Config(
            "database.max_identifier_length must be at least 1".into(),
        ));
    }

    validate_identifier(&config.migration.ledger_table)?;

    Ok(())
}
