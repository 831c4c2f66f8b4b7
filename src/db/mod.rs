//! Database connection pool and migration utilities.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;

/// Parse connection options; `password`, when set, overrides the one in the URL.
pub fn connect_options(
    database_url: &str,
    password: Option<&str>,
) -> Result<PgConnectOptions, sqlx::Error> {
    let options = PgConnectOptions::from_str(database_url)?;
    Ok(match password {
        Some(password) => options.password(password),
        None => options,
    })
}

/// Create a PostgreSQL connection pool.
pub async fn create_pool(
    database_url: &str,
    password: Option<&str>,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(connect_options(database_url, password)?)
        .await
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
