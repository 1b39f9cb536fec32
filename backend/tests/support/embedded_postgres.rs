//! Shared embedded PostgreSQL helpers for integration tests.
//!
//! - Each test gets its own database cloned from a template that already has
//!   the embedded Diesel migrations applied, so schemas never drift.
//! - Direct SQL for fixtures and table teardown uses `postgres` to stay clear
//!   of Diesel transaction semantics.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pg_embedded_setup_unpriv::test_support::{hash_directory, shared_cluster_handle};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::{Client, NoTls};
use rewards_backend::domain::ports::PointsPersistenceError;
use rewards_backend::outbound::persistence::run_pending_migrations;
use uuid::Uuid;

use super::format_postgres_error;

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "rewards_template";
const TEMPLATE_PROVISION_RETRIES: usize = 5;
const TEMPLATE_PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

fn template_database_name() -> Result<String, PointsPersistenceError> {
    let hash = hash_directory(migrations_dir())
        .map_err(|err| PointsPersistenceError::query(format!("hash migrations: {err}")))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

/// Process-wide embedded cluster shared by every test in the binary.
pub fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    shared_cluster_handle().map_err(|err| format!("{err:?}"))
}

/// Creates or reuses a template database with the latest migrations applied.
fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, PointsPersistenceError> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| PointsPersistenceError::query(format!("template check: {err:?}")))?;

    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| PointsPersistenceError::query(format!("create template: {err:?}")))?;

        let url = cluster.connection().database_url(&template_name);
        run_pending_migrations(&url)?;
    }

    Ok(template_name)
}

fn provision_template_database_attempt(
    cluster: &ClusterHandle,
    attempt: usize,
) -> Result<TemporaryDatabase, PointsPersistenceError> {
    let template_name = ensure_template_database(cluster).map_err(|error| {
        PointsPersistenceError::query(format!(
            "template check: attempt {attempt}/{TEMPLATE_PROVISION_RETRIES}: {error}"
        ))
    })?;
    let db_name = format!("test_{}", Uuid::new_v4().simple());
    cluster
        .temporary_database_from_template(db_name.as_str(), template_name.as_str())
        .map_err(|error| {
            PointsPersistenceError::query(format!(
                "create database from template: attempt {attempt}/{TEMPLATE_PROVISION_RETRIES}: {error:?}"
            ))
        })
}

/// Provisions a temporary database cloned from the migration template.
pub fn provision_template_database(
    cluster: &ClusterHandle,
) -> Result<TemporaryDatabase, PointsPersistenceError> {
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
        PointsPersistenceError::query("create database from template: exhausted retries")
    }))
}

/// Drops the ledger table to simulate schema loss mid-flight.
pub fn drop_ledger_table(url: &str) -> Result<(), PointsPersistenceError> {
    let mut client = Client::connect(url, NoTls)
        .map_err(|err| PointsPersistenceError::connection(format_postgres_error(&err)))?;
    client
        .batch_execute("DROP TABLE IF EXISTS point_ledger_entries CASCADE;")
        .map_err(|err| PointsPersistenceError::query(format_postgres_error(&err)))?;
    Ok(())
}
