//! Database layer for yatube.
//!
//! `PostgreSQL` through SeaORM: entities for users, groups, posts, comments
//! and follows, the migrations that create them with their constraints, and
//! one repository per entity.

pub mod entities;
pub mod migrations;
pub mod repositories;
pub mod test_utils;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::log::LevelFilter;
use yatube_common::{AppError, AppResult, config::DatabaseConfig};

use crate::migrations::Migrator;

/// Pool settings for a database section of the configuration.
#[must_use]
pub fn connect_options(config: &DatabaseConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(&config.url);
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);
    opt
}

/// Open the connection pool.
pub async fn init(config: &DatabaseConfig) -> AppResult<DatabaseConnection> {
    Database::connect(connect_options(config))
        .await
        .map_err(|e| AppError::Database(format!("Failed to connect: {e}")))
}

/// Apply every pending migration.
pub async fn migrate(db: &DatabaseConnection) -> AppResult<()> {
    let pending = Migrator::get_pending_migrations(db)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if pending.is_empty() {
        tracing::debug!("Schema is up to date");
        return Ok(());
    }

    tracing::info!(count = pending.len(), "Applying migrations");
    Migrator::up(db, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}
