//! End-to-end migration runs against the scripted executor.

use std::sync::Arc;

use async_trait::async_trait;

use crossdb_migrate::testing::{CollectingLog, ScriptedExecutor};
use crossdb_migrate::{
    ColumnDef, Config, FkAction, Migration, MigrationRunner, MigrationSet, Result, Row, RunStatus,
    SemanticType, SqlValue, TableDef, Target, TransformationProvider,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("crossdb_migrate=debug")
        .try_init();
}

struct CreateUsers;

#[async_trait]
impl Migration for CreateUsers {
    fn version(&self) -> i64 {
        1
    }

    fn name(&self) -> &str {
        "create users"
    }

    async fn up(&self, schema: &TransformationProvider) -> Result<()> {
        schema
            .add_table(&TableDef::new(
                "users",
                vec![
                    ColumnDef::new("id", SemanticType::Int64).auto_increment(),
                    ColumnDef::new("name", SemanticType::String(120)).not_null(),
                ],
            ))
            .await
    }

    async fn down(&self, schema: &TransformationProvider) -> Result<()> {
        schema.remove_table("users").await
    }
}

struct CreatePosts;

#[async_trait]
impl Migration for CreatePosts {
    fn version(&self) -> i64 {
        2
    }

    fn name(&self) -> &str {
        "create posts"
    }

    async fn up(&self, schema: &TransformationProvider) -> Result<()> {
        schema
            .add_table(&TableDef::new(
                "posts",
                vec![
                    ColumnDef::new("id", SemanticType::Int64).auto_increment(),
                    ColumnDef::new("user_id", SemanticType::Int64).not_null(),
                    ColumnDef::new("body", SemanticType::Text),
                ],
            ))
            .await?;
        schema
            .add_foreign_key(
                "fk_posts_users",
                "posts",
                &["user_id"],
                "users",
                &["id"],
                FkAction::Cascade,
            )
            .await
    }

    async fn down(&self, schema: &TransformationProvider) -> Result<()> {
        schema.remove_table("posts").await
    }
}

fn config(db_type: &str) -> Config {
    Config::from_yaml(&format!("database:\n  type: {db_type}\n")).unwrap()
}

fn migrations() -> MigrationSet {
    let mut set = MigrationSet::new();
    set.register(Arc::new(CreateUsers)).unwrap();
    set.register(Arc::new(CreatePosts)).unwrap();
    set
}

fn runner(db_type: &str) -> (Arc<ScriptedExecutor>, Arc<CollectingLog>, MigrationRunner) {
    init_tracing();
    let executor = Arc::new(ScriptedExecutor::new());
    let log = Arc::new(CollectingLog::new());
    let runner = MigrationRunner::from_config_with_log(
        &config(db_type),
        executor.clone(),
        migrations(),
        log.clone(),
    )
    .unwrap();
    (executor, log, runner)
}

#[tokio::test]
async fn forward_run_applies_in_order_with_ledger_updates() {
    let (executor, _log, runner) = runner("postgres");

    let report = runner.migrate_to(Target::Latest).await.unwrap();
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.applied, vec![1, 2]);
    assert!(report.reverted.is_empty());
    assert!(!report.dry_run);

    let executed = executor.executed();
    let position = |needle: &str| {
        executed
            .iter()
            .position(|s| s.contains(needle))
            .unwrap_or_else(|| panic!("no executed statement contains {needle:?}"))
    };

    // The ledger table is provisioned first
    assert_eq!(executed[0], "CREATE TABLE schema_info (version BIGINT NOT NULL)");

    // Each step runs inside its own transaction, with the ledger insert in
    // the same unit of work as the schema change
    let create_users = position("CREATE TABLE users");
    let create_posts = position("CREATE TABLE posts");
    let first_commit = position("COMMIT");
    let first_ledger_insert = position("INSERT INTO schema_info");
    assert!(executed[create_users - 1] == "BEGIN");
    assert!(create_users < first_ledger_insert);
    assert!(first_ledger_insert < first_commit);
    assert!(first_commit < create_posts);

    // Two steps, two ledger inserts
    let inserts: Vec<_> = executed
        .iter()
        .filter(|s| s.starts_with("INSERT INTO schema_info"))
        .collect();
    assert_eq!(inserts.len(), 2);

    // The foreign key lands with its owning migration
    let add_fk = position("ADD CONSTRAINT fk_posts_users");
    assert!(create_posts < add_fk);
}

#[tokio::test]
async fn failed_step_halts_and_keeps_prior_versions() {
    let (executor, _log, runner) = runner("postgres");
    executor.fail_matching("CREATE TABLE posts");

    let report = runner.migrate_to(Target::Latest).await.unwrap();
    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(report.failed_version, Some(2));
    assert_eq!(report.applied, vec![1]);
    assert!(report.error.as_deref().unwrap().contains("injected failure"));

    let executed = executor.executed();
    // The failed step was rolled back
    assert!(executed.iter().any(|s| s == "ROLLBACK"));
    // Version 1's ledger insert stands; version 2 never reached the ledger
    let inserts: Vec<_> = executed
        .iter()
        .filter(|s| s.starts_with("INSERT INTO schema_info"))
        .collect();
    assert_eq!(inserts.len(), 1);
}

#[tokio::test]
async fn dry_run_never_writes() {
    let (executor, log, runner) = runner("postgres");
    let runner = runner.with_dry_run(true);

    let report = runner.migrate_to(Target::Latest).await.unwrap();
    assert_eq!(report.status, RunStatus::Completed);
    assert!(report.dry_run);
    assert_eq!(report.applied, vec![1, 2]);

    // Nothing was executed: no DDL, no ledger writes, no transactions
    assert!(executor.executed().is_empty());
    // Introspection reads still went to the database
    assert!(!executor.recorded().is_empty());
    // The generated SQL is all visible through the sink
    let sql = log.sql_statements();
    assert!(sql.iter().any(|s| s.contains("CREATE TABLE users")));
    assert!(sql.iter().any(|s| s.contains("CREATE TABLE posts")));
}

#[tokio::test]
async fn backward_run_reverts_most_recent_first() {
    let (executor, _log, runner) = runner("postgres");
    executor.on_scalar("'schema_info'", SqlValue::I64(1));
    executor.on_query(
        "FROM schema_info",
        vec![
            Row::new(vec![SqlValue::I64(1)]),
            Row::new(vec![SqlValue::I64(2)]),
        ],
    );

    let report = runner.migrate_to(Target::Version(0)).await.unwrap();
    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.reverted, vec![2, 1]);
    assert!(report.applied.is_empty());

    let executed = executor.executed();
    let drop_posts = executed.iter().position(|s| s == "DROP TABLE posts").unwrap();
    let drop_users = executed.iter().position(|s| s == "DROP TABLE users").unwrap();
    assert!(drop_posts < drop_users);

    let deletes: Vec<_> = executed
        .iter()
        .filter(|s| s.starts_with("DELETE FROM schema_info"))
        .collect();
    assert_eq!(deletes.len(), 2);
}

#[tokio::test]
async fn partial_downgrade_stops_at_target() {
    let (executor, _log, runner) = runner("postgres");
    executor.on_scalar("'schema_info'", SqlValue::I64(1));
    executor.on_query(
        "FROM schema_info",
        vec![
            Row::new(vec![SqlValue::I64(1)]),
            Row::new(vec![SqlValue::I64(2)]),
        ],
    );

    let report = runner.migrate_to(Target::Version(1)).await.unwrap();
    assert_eq!(report.reverted, vec![2]);
    assert!(report.applied.is_empty());

    let executed = executor.executed();
    assert!(executed.iter().any(|s| s == "DROP TABLE posts"));
    assert!(!executed.iter().any(|s| s == "DROP TABLE users"));
}

#[tokio::test]
async fn reverting_an_undiscovered_version_is_a_planning_error() {
    init_tracing();
    let executor = Arc::new(ScriptedExecutor::new());
    executor.on_scalar("'schema_info'", SqlValue::I64(1));
    executor.on_query(
        "FROM schema_info",
        vec![
            Row::new(vec![SqlValue::I64(1)]),
            Row::new(vec![SqlValue::I64(2)]),
        ],
    );

    // Only version 2 is discovered; version 1 is applied but undiscoverable
    let mut set = MigrationSet::new();
    set.register(Arc::new(CreatePosts)).unwrap();
    let runner = MigrationRunner::from_config(&config("postgres"), executor.clone(), set).unwrap();

    let err = runner.migrate_to(Target::Version(0)).await.unwrap_err();
    assert!(err.to_string().contains("1"));
    // Planning failed before any step: nothing was dropped
    assert!(!executor.executed().iter().any(|s| s.starts_with("DROP")));
}

#[tokio::test]
async fn up_to_date_run_does_nothing() {
    let (executor, _log, runner) = runner("postgres");
    executor.on_scalar("'schema_info'", SqlValue::I64(1));
    executor.on_query(
        "FROM schema_info",
        vec![
            Row::new(vec![SqlValue::I64(1)]),
            Row::new(vec![SqlValue::I64(2)]),
        ],
    );

    let report = runner.migrate_to(Target::Latest).await.unwrap();
    assert_eq!(report.status, RunStatus::Completed);
    assert!(report.applied.is_empty());
    assert!(report.reverted.is_empty());
    // Reads only
    assert!(executor.executed().is_empty());
}

#[tokio::test]
async fn oracle_steps_run_without_transactions() {
    let (executor, log, runner) = runner("oracle");
    executor.fail_matching("CREATE TABLE posts");

    let report = runner.migrate_to(Target::Latest).await.unwrap();
    assert_eq!(report.status, RunStatus::Failed);
    assert_eq!(report.failed_version, Some(2));

    let executed = executor.executed();
    // No transaction wrapping on an engine without transactional DDL
    assert!(!executed.iter().any(|s| s.starts_with("BEGIN")));
    assert!(!executed.iter().any(|s| s == "ROLLBACK"));
    // Version 1 got its emulation objects
    assert!(executed.iter().any(|s| s.starts_with("CREATE SEQUENCE users_seq")));
    assert!(executed.iter().any(|s| s.contains("TRIGGER users_trg")));
    // The failure is reported as possibly needing manual correction
    assert!(log
        .warnings()
        .iter()
        .any(|w| w.contains("manual correction")));
}
