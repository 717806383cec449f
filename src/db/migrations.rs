//! Blocking migration helpers.
//!
//! `diesel_migrations` drives a synchronous `PgConnection`, so async callers
//! wrap these in `tokio::task::spawn_blocking`.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::error::{AppError, AppResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn connect(database_url: &str, operation: &str) -> AppResult<PgConnection> {
    PgConnection::establish(database_url).map_err(|e| AppError::Database {
        operation: operation.to_string(),
        source: anyhow::anyhow!("Connection error: {}", e),
    })
}

fn migration_error(operation: &str, e: impl std::fmt::Display) -> AppError {
    AppError::Database {
        operation: operation.to_string(),
        source: anyhow::anyhow!("Migration error: {}", e),
    }
}

/// Names of migrations not yet applied.
pub fn pending_migrations(database_url: &str) -> AppResult<Vec<String>> {
    let mut conn = connect(database_url, "establish connection for migration check")?;
    let pending = conn
        .pending_migrations(MIGRATIONS)
        .map_err(|e| migration_error("check pending migrations", e))?;
    Ok(pending.iter().map(|m| m.name().to_string()).collect())
}

/// Applies all pending migrations and returns their versions.
pub fn run_pending_migrations(database_url: &str) -> AppResult<Vec<String>> {
    let mut conn = connect(database_url, "establish connection for migrations")?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| migration_error("run pending migrations", e))?;
    Ok(applied.iter().map(|v| v.to_string()).collect())
}

/// Reverts up to `steps` migrations, newest first. Stops early once nothing
/// is left to revert.
pub fn revert_migrations(database_url: &str, steps: u32) -> AppResult<Vec<String>> {
    let mut conn = connect(database_url, "establish connection for rollback")?;
    let mut reverted = Vec::new();
    for _ in 0..steps {
        let applied = conn
            .applied_migrations()
            .map_err(|e| migration_error("list applied migrations", e))?;
        if applied.is_empty() {
            break;
        }
        let version = conn
            .revert_last_migration(MIGRATIONS)
            .map_err(|e| migration_error("revert migration", e))?;
        reverted.push(version.to_string());
    }
    Ok(reverted)
}
