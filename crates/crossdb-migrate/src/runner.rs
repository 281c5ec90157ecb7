//! The migration runner: plan computation and ordered execution.
//!
//! Planning is a pure function of `(applied, available, target)`. Execution
//! walks the plan one step at a time, wrapping each step and its ledger
//! update in a transaction where the engine supports transactional DDL, and
//! halting immediately on the first failure - versions applied earlier in
//! the run committed their own transactions and stay applied.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::core::traits::{MigrationLog, SqlExecutor, TracingLog};
use crate::dialects;
use crate::error::{MigrateError, Result};
use crate::ledger::VersionLedger;
use crate::migration::MigrationSet;
use crate::provider::{ExecutionMode, TransformationProvider};

/// The version a run is moving towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Apply every discovered migration.
    Latest,
    /// Move to the given version: revert everything above it, apply
    /// everything at or below it. Version 0 reverts everything.
    Version(i64),
}

impl Target {
    fn includes(&self, version: i64) -> bool {
        match self {
            Target::Latest => true,
            Target::Version(target) => version <= *target,
        }
    }
}

/// An ordered execution plan.
///
/// Reverts run first, most recent version down; applies follow in ascending
/// order. Versions are tracked as a set, so "most recent" means highest
/// version number - deterministic even when forward application filled gaps
/// out of numeric order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    /// Versions to revert, descending.
    pub reverts: Vec<i64>,
    /// Versions to apply, ascending.
    pub applies: Vec<i64>,
}

impl MigrationPlan {
    /// Compute the plan. Pure: no I/O, no clock.
    #[must_use]
    pub fn compute(applied: &BTreeSet<i64>, available: &BTreeSet<i64>, target: Target) -> Self {
        let reverts = applied
            .iter()
            .rev()
            .filter(|v| !target.includes(**v))
            .copied()
            .collect();
        let applies = available
            .difference(applied)
            .filter(|v| target.includes(**v))
            .copied()
            .collect();
        Self { reverts, applies }
    }

    /// Whether there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reverts.is_empty() && self.applies.is_empty()
    }
}

/// Final status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every planned step succeeded.
    Completed,
    /// A step failed; the run halted there.
    Failed,
}

/// Result of a migration run.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    /// Unique run identifier.
    pub run_id: String,

    /// Final status.
    pub status: RunStatus,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run finished.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Versions applied by this run, in execution order.
    pub applied: Vec<i64>,

    /// Versions reverted by this run, in execution order.
    pub reverted: Vec<i64>,

    /// The version the run failed at, if it failed.
    pub failed_version: Option<i64>,

    /// The failure message, if the run failed.
    pub error: Option<String>,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

enum Direction {
    Up,
    Down,
}

/// Executes migration plans against one database.
pub struct MigrationRunner {
    executor: Arc<dyn SqlExecutor>,
    provider: TransformationProvider,
    ledger: VersionLedger,
    migrations: MigrationSet,
    dry_run: bool,
}

impl MigrationRunner {
    /// Create a runner from already-assembled components.
    pub fn new(
        executor: Arc<dyn SqlExecutor>,
        provider: TransformationProvider,
        ledger: VersionLedger,
        migrations: MigrationSet,
    ) -> Self {
        Self {
            executor,
            provider,
            ledger,
            migrations,
            dry_run: false,
        }
    }

    /// Assemble a runner from configuration, with the default tracing sink.
    pub fn from_config(
        config: &Config,
        executor: Arc<dyn SqlExecutor>,
        migrations: MigrationSet,
    ) -> Result<Self> {
        Self::from_config_with_log(config, executor, migrations, Arc::new(TracingLog))
    }

    /// Assemble a runner from configuration with an explicit log sink.
    pub fn from_config_with_log(
        config: &Config,
        executor: Arc<dyn SqlExecutor>,
        migrations: MigrationSet,
        log: Arc<dyn MigrationLog>,
    ) -> Result<Self> {
        let dialect = dialects::from_db_type(&config.database.r#type)?;
        let limit = config
            .database
            .max_identifier_length
            .unwrap_or_else(|| dialect.max_identifier_length());
        let provider = TransformationProvider::new(executor.clone(), dialect.clone(), log)
            .with_default_schema(config.database.schema.clone())
            .with_identifier_limit(limit);
        let ledger = VersionLedger::new(
            executor.clone(),
            dialect,
            config.database.schema.clone(),
            config.migration.ledger_table.clone(),
        );
        Ok(Self::new(executor, provider, ledger, migrations))
    }

    /// Switch the runner (and its provider) into or out of dry-run mode.
    /// Dry runs plan, introspect and construct SQL but never write: no DDL
    /// is submitted and the ledger is untouched.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self.provider.set_mode(if dry_run {
            ExecutionMode::DryRun
        } else {
            ExecutionMode::Apply
        });
        self
    }

    /// The provider migrations execute against.
    pub fn provider(&self) -> &TransformationProvider {
        &self.provider
    }

    /// Apply every discovered migration.
    pub async fn up(&self) -> Result<MigrationReport> {
        self.migrate_to(Target::Latest).await
    }

    /// Move the schema to the target version.
    ///
    /// # Errors
    ///
    /// Planning errors (an applied version with no discovered definition)
    /// abort before any step runs. Step failures do not error: the report
    /// carries the failed version and message, and earlier steps stay
    /// applied.
    pub async fn migrate_to(&self, target: Target) -> Result<MigrationReport> {
        let log = self.provider.log();
        let started_at = Utc::now();
        let run_id = Uuid::new_v4().to_string();

        log.info(&format!(
            "Starting migration run {run_id}{}",
            if self.dry_run { " (dry run)" } else { "" }
        ));

        if !self.dry_run {
            self.ledger.ensure_exists().await?;
        }
        let applied = self.ledger.applied_versions().await?;
        let available = self.migrations.versions();
        let plan = MigrationPlan::compute(&applied, &available, target);

        // Every revert needs its definition for the reverse operation.
        for version in &plan.reverts {
            if self.migrations.get(*version).is_none() {
                return Err(MigrateError::MissingMigration(*version));
            }
        }

        if plan.is_empty() {
            log.info("Schema is already at the requested version");
        }

        let mut report = MigrationReport {
            run_id,
            status: RunStatus::Completed,
            started_at,
            completed_at: started_at,
            duration_seconds: 0.0,
            applied: Vec::new(),
            reverted: Vec::new(),
            failed_version: None,
            error: None,
            dry_run: self.dry_run,
        };

        let mut failure: Option<(i64, MigrateError)> = None;

        for version in &plan.reverts {
            match self.run_step(*version, Direction::Down).await {
                Ok(()) => report.reverted.push(*version),
                Err(err) => {
                    failure = Some((*version, err));
                    break;
                }
            }
        }

        if failure.is_none() {
            for version in &plan.applies {
                match self.run_step(*version, Direction::Up).await {
                    Ok(()) => report.applied.push(*version),
                    Err(err) => {
                        failure = Some((*version, err));
                        break;
                    }
                }
            }
        }

        report.completed_at = Utc::now();
        report.duration_seconds =
            (report.completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        match failure {
            Some((version, err)) => {
                report.status = RunStatus::Failed;
                report.failed_version = Some(version);
                report.error = Some(err.to_string());
                log.warn(&format!("Migration run halted at version {version}: {err}"));
            }
            None => {
                log.info(&format!(
                    "Migration run {} completed: {} applied, {} reverted in {:.1}s",
                    report.run_id,
                    report.applied.len(),
                    report.reverted.len(),
                    report.duration_seconds
                ));
            }
        }

        Ok(report)
    }

    /// Run one migration in one direction, with its ledger update in the
    /// same unit of work.
    async fn run_step(&self, version: i64, direction: Direction) -> Result<()> {
        let migration = self
            .migrations
            .get(version)
            .ok_or(MigrateError::MissingMigration(version))?;
        let log = self.provider.log();

        match direction {
            Direction::Up => log.info(&format!("Applying {} - {}", version, migration.name())),
            Direction::Down => log.info(&format!("Reverting {} - {}", version, migration.name())),
        }

        let dialect = self.provider.dialect().clone();
        let transactional = !self.dry_run && dialect.supports_transactional_ddl();
        if transactional {
            self.executor.execute(dialect.begin_transaction_sql()).await?;
        }

        let result = async {
            match direction {
                Direction::Up => migration.up(&self.provider).await?,
                Direction::Down => migration.down(&self.provider).await?,
            }
            if !self.dry_run {
                match direction {
                    Direction::Up => self.ledger.record_applied(version).await?,
                    Direction::Down => self.ledger.record_reverted(version).await?,
                }
            }
            Ok::<(), MigrateError>(())
        }
        .await;

        match result {
            Ok(()) => {
                if transactional {
                    self.executor.execute(dialect.commit_sql()).await?;
                }
                Ok(())
            }
            Err(err) => {
                if transactional {
                    if let Err(rollback_err) = self.executor.execute(dialect.rollback_sql()).await {
                        log.warn(&format!(
                            "Rollback after failed step {version} also failed: {rollback_err}"
                        ));
                    }
                } else if !self.dry_run {
                    log.warn(&format!(
                        "Engine does not support transactional DDL; version {version} may be partially applied and require manual correction"
                    ));
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(versions: &[i64]) -> BTreeSet<i64> {
        versions.iter().copied().collect()
    }

    #[test]
    fn test_forward_plan() {
        let plan = MigrationPlan::compute(&set(&[1, 2]), &set(&[1, 2, 3, 4]), Target::Version(4));
        assert!(plan.reverts.is_empty());
        assert_eq!(plan.applies, vec![3, 4]);
    }

    #[test]
    fn test_backward_plan_is_descending() {
        let plan = MigrationPlan::compute(&set(&[1, 2, 3, 4]), &set(&[1, 2, 3, 4]), Target::Version(1));
        assert_eq!(plan.reverts, vec![4, 3, 2]);
        assert!(plan.applies.is_empty());
    }

    #[test]
    fn test_latest_applies_all_missing() {
        let plan = MigrationPlan::compute(&set(&[2]), &set(&[1, 2, 3]), Target::Latest);
        assert!(plan.reverts.is_empty());
        // Gaps below the highest applied version are still applied
        assert_eq!(plan.applies, vec![1, 3]);
    }

    #[test]
    fn test_target_between_applied_versions() {
        let plan = MigrationPlan::compute(&set(&[2, 4]), &set(&[1, 2, 3, 4]), Target::Version(3));
        assert_eq!(plan.reverts, vec![4]);
        assert_eq!(plan.applies, vec![1, 3]);
    }

    #[test]
    fn test_target_zero_reverts_everything() {
        let plan = MigrationPlan::compute(&set(&[1, 2, 3]), &set(&[1, 2, 3]), Target::Version(0));
        assert_eq!(plan.reverts, vec![3, 2, 1]);
        assert!(plan.applies.is_empty());
    }

    #[test]
    fn test_plan_empty_when_up_to_date() {
        let plan = MigrationPlan::compute(&set(&[1, 2]), &set(&[1, 2]), Target::Latest);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plan_is_pure_of_its_inputs() {
        let applied = set(&[1, 2]);
        let available = set(&[1, 2, 3, 4]);
        let a = MigrationPlan::compute(&applied, &available, Target::Version(4));
        let b = MigrationPlan::compute(&applied, &available, Target::Version(4));
        assert_eq!(a, b);
    }
}
