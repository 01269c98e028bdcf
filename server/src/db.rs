use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, PoolError};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT_MS: u32 = 5_000;

#[derive(Error, Debug)]
pub enum DbSetupError {
    #[error("Failed to create database pool: {0}")]
    Pool(#[from] PoolError),

    #[error("Failed to run database migrations: {0}")]
    Migration(Box<dyn std::error::Error + Send + Sync>),
}

/// Applied to every pooled connection when it is opened.
#[derive(Debug, Clone, Copy)]
struct ConnectionPragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MS))
            .map_err(r2d2::Error::QueryError)
    }
}

pub fn is_in_memory(database_url: &str) -> bool {
    database_url == ":memory:" || database_url.contains("mode=memory")
}

/// Open the pool and bring the schema up to date.
///
/// Every connection to `:memory:` is a separate database, so in-memory pools
/// hold exactly one connection and never recycle it.
pub fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, DbSetupError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let builder = r2d2::Pool::builder().connection_customizer(Box::new(ConnectionPragmas));

    let pool = if is_in_memory(database_url) {
        builder
            .max_size(1)
            .min_idle(Some(1))
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)?
    } else {
        builder.max_size(max_connections.max(1)).build(manager)?
    };

    // Run pending migrations on startup
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(DbSetupError::Migration)?;
    for version in &applied {
        tracing::info!(%version, "applied database migration");
    }

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_detection() {
        assert!(is_in_memory(":memory:"));
        assert!(is_in_memory("file:cookbook?mode=memory&cache=shared"));
        assert!(!is_in_memory("cookbook.db"));
    }

    #[test]
    fn test_in_memory_pool_keeps_schema_across_checkouts() {
        let pool = create_pool(":memory:", 8).unwrap();
        assert_eq!(pool.max_size(), 1);

        {
            let mut conn = pool.get().unwrap();
            conn.batch_execute("INSERT INTO recipes (name) VALUES ('Toast')")
                .unwrap();
        }

        let mut conn = pool.get().unwrap();
        let count: i64 = crate::schema::recipes::table
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_schema_rejects_non_array_ingredients() {
        let pool = create_pool(":memory:", 1).unwrap();
        let mut conn = pool.get().unwrap();
        let result =
            conn.batch_execute("INSERT INTO recipes (name, ingredients) VALUES ('Toast', '{}')");
        assert!(result.is_err());
    }
}
