//! Database connection management.

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::secrets::DatabaseCredentials;
use crate::{Config, Error, Result};

const CREATE_DAYS: &str = r#"
CREATE TABLE IF NOT EXISTS days (
    id UUID PRIMARY KEY,
    date TEXT NOT NULL UNIQUE,
    schedule TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_SCHEDULES: &str = r#"
CREATE TABLE IF NOT EXISTS schedules (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    friendly_name TEXT NOT NULL,
    schedule JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Connection options, preferring host, port and database from the secret.
///
/// Credentials are passed as fields, never spliced into a URL.
fn connect_options(config: &Config, creds: &DatabaseCredentials) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(creds.host.as_deref().unwrap_or(&config.db_host))
        .port(creds.port.unwrap_or(5432))
        .username(&creds.username)
        .password(&creds.password)
        .database(creds.dbname.as_deref().unwrap_or(&config.db_name))
}

/// Create a database connection pool.
pub async fn create_pool(config: &Config, creds: &DatabaseCredentials) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(connect_options(config, creds))
        .await
        .map_err(Error::Database)?;

    Ok(pool)
}

/// Create the `days` and `schedules` tables if they do not exist.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in [CREATE_DAYS, CREATE_SCHEDULES] {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ready");
    Ok(())
}
