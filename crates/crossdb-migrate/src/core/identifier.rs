//! Centralized identifier validation, quoting and naming rules.
//!
//! This module provides secure, consistent functions for handling SQL
//! identifiers across all database dialects, replacing scattered quoting
//! logic with a single, well-tested implementation.
//!
//! # Security
//!
//! SQL identifiers (table names, column names, constraint names) cannot be
//! passed as parameters in prepared statements - only data values can be
//! parameterized. To safely construct DDL with identifiers, we:
//!
//! 1. Validate identifiers (non-empty, no null bytes, within the dialect's
//!    length limit)
//! 2. Quote only where required (reserved word or mixed case), using the
//!    dialect's quoting syntax
//! 3. Escape the closing quote character within the quotes by doubling it
//!
//! All identifier interpolation in generated SQL goes through here, which
//! prevents injection through migration-authored names.

use crate::error::{MigrateError, Result};

/// Reserved words that force quoting regardless of case.
///
/// A conservative intersection of the big engines' reserved lists; dialects
/// quote these even when the identifier is otherwise plain.
const RESERVED_WORDS: &[&str] = &[
    "all", "alter", "and", "as", "asc", "between", "by", "case", "check", "column", "constraint",
    "create", "current", "date", "default", "delete", "desc", "distinct", "drop", "else", "end",
    "exists", "for", "foreign", "from", "grant", "group", "having", "in", "index", "inner",
    "insert", "into", "is", "join", "key", "left", "level", "like", "not", "null", "of", "on",
    "or", "order", "outer", "primary", "references", "right", "select", "session", "set", "table",
    "then", "timestamp", "to", "union", "unique", "update", "user", "values", "view", "when",
    "where",
];

/// Validate an identifier for structural problems.
///
/// Rejects empty identifiers and identifiers containing null bytes (an
/// injection vector). Length limits are dialect-specific and checked
/// separately via [`ensure_within_limit`].
///
/// # Errors
///
/// Returns `MigrateError::Config` with a descriptive message.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MigrateError::Config(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(MigrateError::Config(format!(
            "Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    Ok(())
}

/// Check an identifier against a dialect's maximum length.
///
/// # Errors
///
/// Returns `MigrateError::NamingConstraint` naming the identifier and its
/// length, so the failure never reaches SQL emission.
pub fn ensure_within_limit(name: &str, max: usize) -> Result<()> {
    validate_identifier(name)?;
    let length = name.chars().count();
    if length > max {
        return Err(MigrateError::NamingConstraint {
            identifier: name.to_string(),
            length,
            max,
        });
    }
    Ok(())
}

/// Whether an identifier needs quoting: reserved word, mixed case, or
/// characters outside the plain `[a-z0-9_]` set.
#[must_use]
pub fn needs_quoting(name: &str) -> bool {
    if RESERVED_WORDS.contains(&name.to_ascii_lowercase().as_str()) {
        return true;
    }
    let plain = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    let starts_plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    !(plain && starts_plain)
}

/// Quote an identifier with the given open/close characters, only when
/// required. The close character is escaped by doubling.
#[must_use]
pub fn quote_with(name: &str, open: char, close: char) -> String {
    if !needs_quoting(name) {
        return name.to_string();
    }
    let escaped = name.replace(close, &format!("{close}{close}"));
    format!("{open}{escaped}{close}")
}

/// Escape a string value for embedding as a SQL literal.
///
/// Catalog queries are parametrization-free by design, so name filters are
/// embedded as literals; single quotes are doubled.
#[must_use]
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Derive the name of an emulation object (sequence, trigger) from its
/// table name.
///
/// The table name is truncated so that the result fits within `max` once the
/// suffix is appended, and trailing `_` separators left by the truncation
/// are stripped so the result reads cleanly. Deterministic: the same table
/// always yields the same object name.
#[must_use]
pub fn emulation_object_name(table: &str, suffix: &str, max: usize) -> String {
    let keep = max.saturating_sub(suffix.chars().count());
    let truncated: String = table.chars().take(keep).collect();
    let trimmed = truncated.trim_end_matches('_');
    format!("{trimmed}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn test_validate_identifier_normal() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("my_table").is_ok());
        assert!(validate_identifier("Table123").is_ok());
    }

    #[test]
    fn test_validate_identifier_rejects_empty() {
        let result = validate_identifier("");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[test]
    fn test_validate_identifier_rejects_null_byte() {
        let result = validate_identifier("table\0name");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("null byte"));
    }

    #[test]
    fn test_ensure_within_limit() {
        assert!(ensure_within_limit("users", 30).is_ok());
        assert!(ensure_within_limit(&"a".repeat(30), 30).is_ok());

        let result = ensure_within_limit(&"a".repeat(31), 30);
        match result {
            Err(MigrateError::NamingConstraint { length, max, .. }) => {
                assert_eq!(length, 31);
                assert_eq!(max, 30);
            }
            other => panic!("expected NamingConstraint, got {other:?}"),
        }
    }

    // =========================================================================
    // Quoting tests
    // =========================================================================

    #[test]
    fn test_plain_names_stay_unquoted() {
        assert!(!needs_quoting("users"));
        assert!(!needs_quoting("my_table2"));
        assert_eq!(quote_with("users", '"', '"'), "users");
    }

    #[test]
    fn test_reserved_words_are_quoted() {
        assert!(needs_quoting("order"));
        assert!(needs_quoting("USER"));
        assert_eq!(quote_with("order", '"', '"'), "\"order\"");
    }

    #[test]
    fn test_mixed_case_is_quoted() {
        assert!(needs_quoting("MyTable"));
        assert_eq!(quote_with("MyTable", '[', ']'), "[MyTable]");
    }

    #[test]
    fn test_close_char_is_doubled() {
        assert_eq!(quote_with("a]b", '[', ']'), "[a]]b]");
        assert_eq!(quote_with("a\"b", '"', '"'), "\"a\"\"b\"");
        assert_eq!(quote_with("a`b", '`', '`'), "`a``b`");
    }

    #[test]
    fn test_injection_attempt_is_safely_quoted() {
        let quoted = quote_with("x\"; DROP TABLE users;--", '"', '"');
        assert_eq!(quoted, "\"x\"\"; DROP TABLE users;--\"");
    }

    #[test]
    fn test_string_literal_escapes_quotes() {
        assert_eq!(string_literal("users"), "'users'");
        assert_eq!(string_literal("O'Brien"), "'O''Brien'");
    }

    // =========================================================================
    // Emulation naming tests
    // =========================================================================

    #[test]
    fn test_emulation_name_short_table() {
        assert_eq!(emulation_object_name("users", "_seq", 30), "users_seq");
    }

    #[test]
    fn test_emulation_name_truncates_to_limit() {
        let table = "a_very_long_table_name_that_overflows";
        let name = emulation_object_name(table, "_seq", 30);
        assert!(name.chars().count() <= 30);
        assert!(name.ends_with("_seq"));
    }

    #[test]
    fn test_emulation_name_strips_trailing_separator() {
        // Truncation would land on a separator; it must be stripped before
        // the suffix is appended.
        let name = emulation_object_name("customer_orders_archive_", "_seq", 28);
        assert!(!name.contains("__"));
        assert_eq!(name, "customer_orders_archive_seq");
    }
}
