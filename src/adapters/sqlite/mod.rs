//! SQLite database adapters for ragkeeper.

pub mod chunk_repository;
pub mod connection;
pub mod migrations;

pub use chunk_repository::SqliteChunkRepository;
pub use connection::{create_pool, create_test_pool, ConnectionError};
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::DatabaseConfig;

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::SerializationError(e.to_string()))
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

pub async fn initialize_database(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(config).await?;
    let migrator = Migrator::new(pool.clone());
    let applied = migrator
        .run_embedded_migrations(all_embedded_migrations())
        .await?;
    tracing::debug!(path = %config.path, applied, "database ready");
    Ok(pool)
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    let migrator = Migrator::new(pool.clone());
    migrator
        .run_embedded_migrations(all_embedded_migrations())
        .await?;
    Ok(pool)
}
