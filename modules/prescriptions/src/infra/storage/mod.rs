pub mod entity;
pub mod migrations;
pub mod sea_orm_repo;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

use crate::config::DatabaseConfig;

const MEMORY_CONN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Open the configured database and bring its schema up to date.
///
/// In-memory `SQLite` lives inside a single connection, so the pool is pinned
/// to one long-lived connection.
///
/// # Errors
/// Returns an error if the connection or a migration fails.
pub async fn connect(cfg: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.sqlx_logging(false);
    if cfg.url.contains(":memory:") {
        opts.max_connections(1)
            .min_connections(1)
            .idle_timeout(MEMORY_CONN_LIFETIME)
            .max_lifetime(MEMORY_CONN_LIFETIME);
    }

    let db = Database::connect(opts).await?;
    if cfg.run_migrations {
        migrations::Migrator::up(&db, None).await?;
        tracing::info!("prescription schema is up to date");
    }
    Ok(db)
}
