//! Per-test databases cloned from a migrated template.
//!
//! The template is named after a hash of `migrations/`, so a schema change
//! produces a fresh template while unchanged schemas are migrated once per
//! cluster. Ad hoc SQL goes through `postgres` rather than Diesel.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::types::ToSql;
use postgres::{Client, NoTls};
use study_assistant::domain::ports::RepositoryError;
use uuid::Uuid;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "study_template";
const TEMPLATE_PROVISION_RETRIES: usize = 5;
const TEMPLATE_PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

fn template_database_name() -> Result<String, RepositoryError> {
    let hash = hash_directory(migrations_dir())
        .map_err(|err| RepositoryError::query(format!("hash migrations: {err}")))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

/// Render a `postgres` error with its SQLSTATE and server message.
///
/// The `Display` form collapses server errors to `db error`.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// Create the template on first use and return its name.
fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, RepositoryError> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| RepositoryError::query(format!("template check: {err:?}")))?;

    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| RepositoryError::query(format!("create template: {err:?}")))?;

        let url = cluster.connection().database_url(&template_name);
        migrate_schema(&url)?;
    }

    Ok(template_name)
}

fn provision_template_database_attempt(
    cluster: &ClusterHandle,
    attempt: usize,
) -> Result<TemporaryDatabase, RepositoryError> {
    let template_name = ensure_template_database(cluster).map_err(|error| {
        RepositoryError::query(format!(
            "template check: attempt {attempt}/{TEMPLATE_PROVISION_RETRIES}: {error}"
        ))
    })?;
    let db_name = format!("test_{}", Uuid::new_v4());
    cluster
        .temporary_database_from_template(db_name.as_str(), template_name.as_str())
        .map_err(|error| {
            RepositoryError::query(format!(
                "create database from template: attempt {attempt}/{TEMPLATE_PROVISION_RETRIES}: {error:?}"
            ))
        })
}

/// Provision a migrated database that is dropped with the returned guard.
pub fn provision_template_database(
    cluster: &ClusterHandle,
) -> Result<TemporaryDatabase, RepositoryError> {
    let mut last_error = None;
    for attempt in 1..=TEMPLATE_PROVISION_RETRIES {
        match provision_template_database_attempt(cluster, attempt) {
            Ok(database) => return Ok(database),
            Err(error) => last_error = Some(error),
        };
        if attempt < TEMPLATE_PROVISION_RETRIES {
            std::thread::sleep(TEMPLATE_PROVISION_RETRY_DELAY);
        }
    }

    Err(last_error.unwrap_or_else(|| {
        RepositoryError::query("create database from template: exhausted retries")
    }))
}

/// Run every pending migration against `url`.
pub fn migrate_schema(url: &str) -> Result<(), RepositoryError> {
    let mut conn = PgConnection::establish(url)
        .map_err(|err| RepositoryError::connection(format!("{err:?}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| RepositoryError::query(format!("migration: {err:?}")))?;
    Ok(())
}

/// Execute one parameterised statement, returning the affected row count.
pub fn execute(url: &str, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<u64, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .execute(sql, params)
        .map_err(|err| format_postgres_error(&err))
}

/// Run a query returning a single `BIGINT`, such as `SELECT count(*)`.
pub fn query_i64(url: &str, sql: &str, params: &[&(dyn ToSql + Sync)]) -> Result<i64, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let row = client
        .query_one(sql, params)
        .map_err(|err| format_postgres_error(&err))?;
    row.try_get(0).map_err(|err| format_postgres_error(&err))
}
