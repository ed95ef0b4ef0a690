//! SQLite-based registry using `SeaORM`.
//!
//! A single `SqliteStore` implements `DomainRepository`, `RecordRepository`,
//! `ProxyRepository` and `ZoneSnapshotSource`, backed by a local `SQLite` database.
//! Multi-row mutations and zone snapshots run inside one transaction each.

mod domain_repo;
pub(crate) mod entity;
mod migration;
mod proxy_repo;
mod record_repo;
mod zone_source;

use std::path::Path;

use oniongate_core::error::{CoreError, CoreResult};
use sea_orm::{DbErr, Database, DatabaseConnection, SqlErr};
use sea_orm_migration::MigratorTrait;

use migration::Migrator;

/// SQLite-based registry for the CLI and other long-running frontends.
///
/// Every storage trait of the core is implemented against a single `SQLite` file,
/// so one `Arc<SqliteStore>` can be handed to each `ServiceContext` slot.
pub struct SqliteStore {
    /// Shared `SeaORM` database connection.
    pub(crate) db: DatabaseConnection,
}

impl SqliteStore {
    /// Open (or create) the registry database and bring its schema up to date.
    ///
    /// # Errors
    /// Returns `CoreError::StorageError` if directory creation, database
    /// connection, or schema migration fails.
    pub async fn new(db_path: &Path) -> CoreResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::StorageError(format!("Failed to create directory: {e}")))?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let db = Database::connect(&db_url)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to connect to SQLite: {e}")))?;

        let store = Self { db };

        // Ensure schema is up to date before the store is used.
        Migrator::up(&store.db, None)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to run migrations: {e}")))?;

        log::debug!("Opened registry database at {}", db_path.display());
        Ok(store)
    }
}

/// Map a database error, turning unique-index violations into `Conflict`.
pub(crate) fn storage_err(context: &str, conflict: impl FnOnce() -> String, e: &DbErr) -> CoreError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => CoreError::Conflict(conflict()),
        _ => CoreError::StorageError(format!("{context}: {e}")),
    }
}

/// Map a database error with no conflict interpretation.
pub(crate) fn db_err(context: &str) -> impl FnOnce(DbErr) -> CoreError + '_ {
    move |e| CoreError::StorageError(format!("{context}: {e}"))
}

/// Decode a 0/1 column.
pub(crate) fn flag(value: i32) -> bool {
    value != 0
}

/// Encode a 0/1 column.
pub(crate) fn to_flag(value: bool) -> i32 {
    i32::from(value)
}
