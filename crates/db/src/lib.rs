//! PostgreSQL persistence for dropdeck: pool setup, migrations, row models
//! and the `NodeStore` implementations for decks and comments.

pub mod models;
pub mod repositories;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Postgres, Transaction};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Begin a transaction at `SERIALIZABLE` isolation.
///
/// Used for reparenting: two concurrent moves that would jointly form a
/// cycle cannot both commit; the loser fails with SQLSTATE `40001`.
pub async fn begin_serializable(pool: &DbPool) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}
