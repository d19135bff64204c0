use crate::error::DbError;
use configuration::DatabaseConfig;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::path::Path;

/// Schema scripts, in the order they must run (visit references the other two).
pub const SCHEMA_SCRIPTS: [&str; 3] = ["caregiver.sql", "patient.sql", "visit.sql"];

/// Establishes a connection pool to the PostgreSQL database.
///
/// The pool is owned by the caller and handed to whatever needs it; nothing in
/// this crate keeps a global handle. Broken idle connections are discarded by
/// the pool itself and replaced on the next acquire, so they never reach a
/// caller as an error.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    tracing::info!(
        user = %config.user,
        database = %config.database,
        host = %config.host,
        port = config.port,
        max_connections = config.max_connections,
        idle_timeout_ms = config.idle_timeout_ms,
        connect_timeout_ms = config.connect_timeout_ms,
        "DB connection settings."
    );

    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .idle_timeout(config.idle_timeout())
        .acquire_timeout(config.connect_timeout())
        .test_before_acquire(true)
        .after_connect(|_conn, meta| {
            Box::pin(async move {
                tracing::debug!(age = ?meta.age, "Opened new database connection.");
                Ok(())
            })
        })
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Outcome of running one schema script.
#[derive(Debug)]
pub struct ScriptOutcome {
    pub script: String,
    pub result: Result<(), DbError>,
}

/// What happened when the schema scripts ran.
#[derive(Debug, Default)]
pub struct BootstrapReport {
    pub outcomes: Vec<ScriptOutcome>,
}

impl BootstrapReport {
    /// Names of the scripts that did not apply cleanly.
    pub fn failed_scripts(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.script.clone())
            .collect()
    }

    pub fn is_ready(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Turns the report into the readiness gate: `Ok` only if every script applied.
    pub fn ensure_ready(&self) -> Result<(), DbError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(DbError::SchemaBootstrap(self.failed_scripts()))
        }
    }
}

/// Runs the caregiver, patient and visit table scripts from `schema_dir`.
///
/// Each script is attempted even when an earlier one failed; failures are
/// logged and recorded in the returned report. Callers gate startup on
/// [`BootstrapReport::ensure_ready`].
pub async fn bootstrap_schema(pool: &PgPool, schema_dir: &Path) -> BootstrapReport {
    let mut report = BootstrapReport::default();

    for script in SCHEMA_SCRIPTS {
        let path = schema_dir.join(script);
        let result = run_script(pool, &path).await;

        match &result {
            Ok(()) => tracing::info!(script, "Schema script applied."),
            Err(e) => tracing::error!(script, error = %e, "Schema script failed."),
        }

        report.outcomes.push(ScriptOutcome {
            script: script.to_string(),
            result,
        });
    }

    report
}

async fn run_script(pool: &PgPool, path: &Path) -> Result<(), DbError> {
    let sql = tokio::fs::read_to_string(path).await.map_err(|e| {
        DbError::Config(format!("cannot read schema file {}: {}", path.display(), e))
    })?;

    // Scripts may hold several statements, so they go through the simple query protocol.
    sqlx::raw_sql(&sql).execute(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(script: &str, ok: bool) -> ScriptOutcome {
        ScriptOutcome {
            script: script.to_string(),
            result: if ok {
                Ok(())
            } else {
                Err(DbError::Query("relation \"caregiver\" does not exist".into()))
            },
        }
    }

    #[test]
    fn report_is_ready_when_every_script_applied() {
        let report = BootstrapReport {
            outcomes: SCHEMA_SCRIPTS.iter().map(|s| outcome(s, true)).collect(),
        };
        assert!(report.is_ready());
        assert!(report.ensure_ready().is_ok());
    }

    #[test]
    fn one_failure_blocks_readiness_and_is_named() {
        let report = BootstrapReport {
            outcomes: vec![
                outcome("caregiver.sql", true),
                outcome("patient.sql", true),
                outcome("visit.sql", false),
            ],
        };
        assert!(!report.is_ready());
        match report.ensure_ready() {
            Err(DbError::SchemaBootstrap(failed)) => assert_eq!(failed, vec!["visit.sql"]),
            other => panic!("expected SchemaBootstrap, got {other:?}"),
        }
    }

    #[test]
    fn shipped_scripts_exist_and_are_idempotent() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../sql");
        for script in SCHEMA_SCRIPTS {
            let sql = std::fs::read_to_string(dir.join(script)).unwrap();
            assert!(sql.contains("CREATE TABLE IF NOT EXISTS"), "{script}");
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn bootstrap_runs_against_live_database() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = PgPool::connect(&url).await.expect("pool creation failed");
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../sql");

        let first = bootstrap_schema(&pool, &dir).await;
        assert!(first.is_ready(), "{:?}", first.failed_scripts());

        // Running twice must not fail.
        let second = bootstrap_schema(&pool, &dir).await;
        assert!(second.is_ready(), "{:?}", second.failed_scripts());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn missing_schema_dir_fails_every_script() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = PgPool::connect(&url).await.expect("pool creation failed");

        let report = bootstrap_schema(&pool, Path::new("/nonexistent")).await;
        assert_eq!(report.failed_scripts().len(), SCHEMA_SCRIPTS.len());
    }
}
