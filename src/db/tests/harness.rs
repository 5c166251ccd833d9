//! Test harness for SQLite repository tests.

use sqlx::SqlitePool;

/// Create an in-memory SQLite pool with the production schema applied.
///
/// A single connection keeps every query on the same in-memory database.
pub async fn create_sqlite_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    run_sqlite_migrations(&pool).await;
    pool
}

/// Run SQLite migrations on the pool
///
/// Uses the actual migration files to ensure tests match production schema
pub async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations_sqlx/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
