//! SQL schema definitions and migrations.
//!
//! This module contains the database schema used by SQL backends. Two tables
//! hold application data:
//!
//! - `users`: one row per account, `username` is `UNIQUE`
//! - `uploaded_files`: one row per successful upload, duplicates allowed
//!
//! Auto-increment id columns are spelled differently by SQLite and PostgreSQL,
//! so table statements are produced per [`DbKind`].
//!
//! # Migration System
//!
//! The migration system uses code-based migrations rather than SQL files to handle
//! dialect differences between SQLite and PostgreSQL. Each migration is a function
//! that receives the backend and can execute database-specific SQL as needed.
//!
//! ## Adding a New Migration
//!
//! 1. Increment `SCHEMA_VERSION`
//! 2. Add a new `migrate_vN_to_vM` async function
//! 3. Add the migration to the match statement in `run_migration`

use crate::Result;
use crate::backend::errors::BackendError;

use super::{DbKind, SqlxBackend};

/// Current schema version.
///
/// Increment this when making schema changes that require migration.
pub const SCHEMA_VERSION: i64 = 1;

/// Column definition of an auto-assigned 64-bit primary key.
fn id_column(kind: DbKind) -> &'static str {
    match kind {
        DbKind::Sqlite => "id INTEGER PRIMARY KEY AUTOINCREMENT",
        DbKind::Postgres => "id BIGSERIAL PRIMARY KEY",
    }
}

/// SQL statements to create the schema tables for the given dialect.
pub fn create_tables(kind: DbKind) -> Vec<String> {
    let id = id_column(kind);
    vec![
        // BIGINT (64-bit) used for portability between SQLite and PostgreSQL
        "CREATE TABLE IF NOT EXISTS schema_version (
            version BIGINT PRIMARY KEY
        )"
        .to_string(),
        // Accounts. password_hash holds an Argon2 PHC string.
        format!(
            "CREATE TABLE IF NOT EXISTS users (
                {id},
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL
            )"
        ),
        // Upload records. filename is the sanitized stored name.
        format!(
            "CREATE TABLE IF NOT EXISTS uploaded_files (
                {id},
                filename TEXT NOT NULL,
                uploader TEXT NOT NULL
            )"
        ),
    ]
}

/// SQL statements to create indexes.
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_uploaded_files_filename ON uploaded_files(filename)",
];

/// Initialize the database schema.
///
/// Creates tables and indexes if they don't exist, and handles migrations
/// if the schema version has changed.
pub async fn initialize(backend: &SqlxBackend) -> Result<()> {
    let pool = backend.pool();

    for statement in create_tables(backend.kind()) {
        sqlx::query(&statement)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Schema creation failed: {e} - SQL: {statement}"),
                source: Some(e),
            })?;
    }

    let row: Option<(i64,)> = sqlx::query_as("SELECT version FROM schema_version")
        .fetch_optional(pool)
        .await
        .map_err(|e| BackendError::SqlxError {
            reason: format!("Failed to check schema version: {e}"),
            source: Some(e),
        })?;

    match row {
        None => {
            sqlx::query("INSERT INTO schema_version (version) VALUES ($1)")
                .bind(SCHEMA_VERSION)
                .execute(pool)
                .await
                .map_err(|e| BackendError::SqlxError {
                    reason: format!("Failed to initialize schema version: {e}"),
                    source: Some(e),
                })?;
        }
        Some((current_version,)) if current_version < SCHEMA_VERSION => {
            migrate(backend, current_version, SCHEMA_VERSION).await?;
        }
        Some((current_version,)) if current_version > SCHEMA_VERSION => {
            return Err(BackendError::Configuration {
                reason: format!(
                    "database schema v{current_version} is newer than supported v{SCHEMA_VERSION}"
                ),
            }
            .into());
        }
        Some(_) => {}
    }

    for statement in CREATE_INDEXES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Index creation failed: {e} - SQL: {statement}"),
                source: Some(e),
            })?;
    }

    Ok(())
}

/// Run migrations sequentially from one schema version to another.
async fn migrate(backend: &SqlxBackend, from: i64, to: i64) -> Result<()> {
    tracing::info!(from, to, "Starting SQL schema migration");

    let mut current = from;
    while current < to {
        let next = current + 1;
        tracing::info!(from = current, to = next, "Running migration");

        run_migration(backend, current, next).await?;

        sqlx::query("UPDATE schema_version SET version = $1")
            .bind(next)
            .execute(backend.pool())
            .await
            .map_err(|e| BackendError::SqlxError {
                reason: format!("Failed to update schema version to {next}: {e}"),
                source: Some(e),
            })?;

        tracing::info!(version = next, "Migration completed");
        current = next;
    }

    Ok(())
}

/// Execute a single migration step.
///
/// There are no migrations yet, so any request to migrate is an error.
async fn run_migration(_backend: &SqlxBackend, from: i64, to: i64) -> Result<()> {
    Err(BackendError::SqlxError {
        reason: format!(
            "Unknown migration path: v{from} to v{to}. \
             SCHEMA_VERSION was incremented without adding a migration."
        ),
        source: None,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_specific_ids() {
        let sqlite = create_tables(DbKind::Sqlite);
        let postgres = create_tables(DbKind::Postgres);
        assert_eq!(sqlite.len(), postgres.len());
        assert!(sqlite[1].contains("AUTOINCREMENT"));
        assert!(postgres[1].contains("BIGSERIAL"));
        assert!(sqlite[1].contains("username TEXT NOT NULL UNIQUE"));
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_unknown_migration_is_rejected() {
        let backend = SqlxBackend::sqlite_in_memory().await.unwrap();
        let err = run_migration(&backend, SCHEMA_VERSION, SCHEMA_VERSION + 1)
            .await
            .unwrap_err();
        assert!(err.is_database_error());
        assert!(err.to_string().contains("Unknown migration path"));
    }
}
