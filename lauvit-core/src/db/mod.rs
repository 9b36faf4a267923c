pub mod models;
pub mod operations;
pub mod schema;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{debug, info};

use crate::config::Config;
use crate::error::{LauvitError, Result};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const BUSY_TIMEOUT_MS: u32 = 5000;

#[derive(Debug)]
struct ConnectionOptions {
    busy_timeout_ms: u32,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {};
             PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
            self.busy_timeout_ms
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Opens the pool and applies any pending migrations.
///
/// An in-memory database lives inside a single connection, so for `:memory:`
/// the pool holds exactly one connection and never recycles it.
pub fn establish_pool(config: &Config) -> Result<DbPool> {
    let max_size = if config.is_in_memory() {
        1
    } else {
        config.pool_size
    };
    info!(
        "Opening database {} with up to {} connections",
        config.database_url, max_size
    );

    let manager = ConnectionManager::<SqliteConnection>::new(config.database_url.as_str());
    let mut builder = Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionOptions {
            busy_timeout_ms: BUSY_TIMEOUT_MS,
        }));
    if config.is_in_memory() {
        builder = builder.max_lifetime(None).idle_timeout(None);
    }
    let pool = builder.build(manager)?;

    run_migrations(&pool)?;
    Ok(pool)
}

pub fn open_in_memory() -> Result<DbPool> {
    establish_pool(&Config::in_memory())
}

pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut pooled = pool.get()?;
    let conn: &mut SqliteConnection = &mut pooled;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| LauvitError::Migration(e.to_string()))?;

    if applied.is_empty() {
        debug!("No pending migrations");
    }
    for version in applied {
        info!("Migration {} applied successfully", version);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_pool_keeps_its_single_connection() {
        let pool = open_in_memory().unwrap();
        assert_eq!(pool.max_size(), 1);
        assert_eq!(pool.max_lifetime(), None);
        assert_eq!(pool.idle_timeout(), None);
    }

    #[test]
    fn file_pool_recycles_connections() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_url: dir.path().join("pool.db").to_string_lossy().into_owned(),
            pool_size: 3,
            ..Default::default()
        };
        let pool = establish_pool(&config).unwrap();
        assert_eq!(pool.max_size(), 3);
        assert!(pool.max_lifetime().is_some());
    }
}
