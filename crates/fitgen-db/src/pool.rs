use std::time::Duration;

use anyhow::{Context, Result, bail};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, Connection, Executor, PgConnection, PgPool};
use tracing::info;

use crate::config::DbConfig;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Tables owned by the fitgen schema, in dependency order.
pub const TABLES: [&str; 4] = ["users", "user_preferences", "workouts", "workout_history"];

/// Each request holds at most one connection.
const MAX_CONNECTIONS: u32 = 10;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&config.database_url)
        .await
        .with_context(|| format!("failed to connect to database at {}", config.database_url))
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to run database migrations")?;
    info!("fitgen schema is up to date");
    Ok(())
}

/// Liveness probe for the health endpoint.
pub async fn ping(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .context("database ping failed")?;
    Ok(())
}

/// `CREATE DATABASE` takes no bind parameters, so only plain identifiers pass.
fn checked_db_name(config: &DbConfig) -> Result<&str> {
    let name = config
        .database_name()
        .context("could not determine database name from URL")?;
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("database name {name:?} must be letters, digits and underscores");
    }
    Ok(name)
}

/// Create the target database through the `postgres` maintenance database
/// when it does not exist yet.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<()> {
    let name = checked_db_name(config)?;
    let maintenance_url = config.maintenance_url();

    let mut conn: PgConnection = maintenance_url
        .parse::<PgConnectOptions>()
        .context("invalid maintenance database URL")?
        .connect()
        .await
        .with_context(|| format!("failed to connect to maintenance database at {maintenance_url}"))?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(name)
            .fetch_one(&mut conn)
            .await
            .context("failed to query pg_database")?;

    if exists {
        info!(db = name, "database already exists");
    } else {
        conn.execute(format!("CREATE DATABASE {name}").as_str())
            .await
            .with_context(|| format!("failed to create database {name}"))?;
        info!(db = name, "database created");
    }

    conn.close().await.context("failed to close maintenance connection")?;
    Ok(())
}

/// Row counts for the fitgen tables, printed after `db-init`.
pub async fn table_counts(pool: &PgPool) -> Result<Vec<(&'static str, i64)>> {
    let mut counts = Vec::with_capacity(TABLES.len());
    for table in TABLES {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .with_context(|| format!("failed to count rows in {table}"))?;
        counts.push((table, count));
    }
    Ok(counts)
}
