//! Test doubles for driving the engine without a database.
//!
//! [`ScriptedExecutor`] records every statement it is handed and answers
//! catalog queries from substring-matched rules, so tests can assert on the
//! exact SQL sequence an operation generates. [`CollectingLog`] captures the
//! observability stream the same way.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::traits::{MigrationLog, SqlExecutor};
use crate::core::value::{Row, SqlValue};
use crate::error::{MigrateError, Result};

/// What kind of executor call produced a recorded statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// `execute` / `execute_with_params` - a write.
    Execute,
    /// `query_scalar` - a single-value read.
    Scalar,
    /// `query` - a row-set read.
    Query,
}

/// One recorded executor call.
#[derive(Debug, Clone)]
pub struct Statement {
    /// The SQL text as received.
    pub sql: String,
    /// The call shape.
    pub kind: StatementKind,
    /// Bound parameters, if any.
    pub params: Vec<SqlValue>,
}

/// In-memory [`SqlExecutor`] with scripted responses.
///
/// Reads answer from first-match substring rules; unmatched scalar reads
/// default to `0` (nothing exists) and unmatched row reads to no rows, which
/// models an empty database.
#[derive(Default)]
pub struct ScriptedExecutor {
    recorded: Mutex<Vec<Statement>>,
    scalar_rules: Mutex<Vec<(String, SqlValue)>>,
    query_rules: Mutex<Vec<(String, Vec<Row>)>>,
    fail_rules: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    /// Create an executor modeling an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer scalar reads whose SQL contains `needle` with `value`.
    pub fn on_scalar(&self, needle: &str, value: SqlValue) {
        self.scalar_rules
            .lock()
            .unwrap()
            .push((needle.to_string(), value));
    }

    /// Answer row reads whose SQL contains `needle` with `rows`.
    pub fn on_query(&self, needle: &str, rows: Vec<Row>) {
        self.query_rules
            .lock()
            .unwrap()
            .push((needle.to_string(), rows));
    }

    /// Fail any call whose SQL contains `needle`.
    pub fn fail_matching(&self, needle: &str) {
        self.fail_rules.lock().unwrap().push(needle.to_string());
    }

    /// Every recorded call, in order.
    pub fn recorded(&self) -> Vec<Statement> {
        self.recorded.lock().unwrap().clone()
    }

    /// The SQL of recorded writes only, in order.
    pub fn executed(&self) -> Vec<String> {
        self.recorded
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.kind == StatementKind::Execute)
            .map(|s| s.sql.clone())
            .collect()
    }

    fn record(&self, sql: &str, kind: StatementKind, params: Vec<SqlValue>) {
        self.recorded.lock().unwrap().push(Statement {
            sql: sql.to_string(),
            kind,
            params,
        });
    }

    fn check_failure(&self, sql: &str) -> Result<()> {
        let rules = self.fail_rules.lock().unwrap();
        if rules.iter().any(|needle| sql.contains(needle.as_str())) {
            return Err(MigrateError::execution(sql, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl SqlExecutor for ScriptedExecutor {
    async fn execute(&self, sql: &str) -> Result<u64> {
        self.record(sql, StatementKind::Execute, Vec::new());
        self.check_failure(sql)?;
        Ok(1)
    }

    async fn execute_with_params(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        self.record(sql, StatementKind::Execute, params.to_vec());
        self.check_failure(sql)?;
        Ok(1)
    }

    async fn query_scalar(&self, sql: &str) -> Result<Option<SqlValue>> {
        self.record(sql, StatementKind::Scalar, Vec::new());
        self.check_failure(sql)?;
        let rules = self.scalar_rules.lock().unwrap();
        let value = rules
            .iter()
            .find(|(needle, _)| sql.contains(needle.as_str()))
            .map(|(_, value)| value.clone())
            .unwrap_or(SqlValue::I64(0));
        Ok(Some(value))
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>> {
        self.record(sql, StatementKind::Query, Vec::new());
        self.check_failure(sql)?;
        let rules = self.query_rules.lock().unwrap();
        Ok(rules
            .iter()
            .find(|(needle, _)| sql.contains(needle.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }
}

/// A [`MigrationLog`] that collects everything it is given.
#[derive(Default)]
pub struct CollectingLog {
    infos: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
    sql: Mutex<Vec<String>>,
}

impl CollectingLog {
    /// Create an empty collecting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collected info messages.
    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    /// Collected warnings.
    pub fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }

    /// Collected generated-SQL messages.
    pub fn sql_statements(&self) -> Vec<String> {
        self.sql.lock().unwrap().clone()
    }
}

impl MigrationLog for CollectingLog {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }

    fn sql(&self, sql: &str) {
        self.sql.lock().unwrap().push(sql.to_string());
    }
}
