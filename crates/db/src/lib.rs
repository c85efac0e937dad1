//! Persistence for identities and refresh-token sessions.
//!
//! - [`repositories`] -- Raw sqlx queries against PostgreSQL.
//! - [`store`] -- The [`AuthStore`] seam the identity authority is built on.
//! - [`pg`] -- Transactional PostgreSQL implementation of [`AuthStore`].
//! - [`memory`] -- In-process implementation for tests and local runs.

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod repositories;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryAuthStore;
pub use pg::PgAuthStore;
pub use store::AuthStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
