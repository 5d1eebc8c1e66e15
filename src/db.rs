use diesel::r2d2::{ConnectionManager, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::data::models::StoreError;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

/// Builds a connection pool for the given database URL.
pub fn establish_pool(database_url: &str) -> Result<DbPool, StoreError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Ok(Pool::builder().build(manager)?)
}

/// Builds a pool from `DATABASE_URL`, falling back to a local file.
pub fn pool_from_env() -> Result<DbPool, StoreError> {
    dotenv::dotenv().ok();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "phrasedeck.db".to_string());
    establish_pool(&database_url)
}

/// Runs any pending embedded migrations.
pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), StoreError> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Migration(e.to_string()))?;
    if !applied.is_empty() {
        log::info!("applied {} migration(s)", applied.len());
    }
    Ok(())
}
