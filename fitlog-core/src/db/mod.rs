pub mod analysis;
pub mod exercises;
pub mod goals;
pub mod health;
pub mod models;
pub mod users;
pub mod workouts;

use std::str::FromStr;

use log::{debug, info};
use serde::Serialize;
use sqlx::SqlitePool;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};

use crate::config::{DatabaseConfig, DatabaseLocation, MEMORY_DB_URL};
use crate::error::{FitlogError, Result};

/// Opens a pool for `config` with foreign keys enforced on every connection.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    let options = match &config.location {
        DatabaseLocation::File(path) => SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal),
        DatabaseLocation::Memory => SqliteConnectOptions::from_str(MEMORY_DB_URL)?,
    }
    .foreign_keys(true)
    .busy_timeout(config.busy_timeout);

    let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
    if config.location == DatabaseLocation::Memory {
        // the database disappears with its last connection
        pool_options = pool_options
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }

    debug!("Opening database {:?}", config.location);
    let pool = pool_options.connect_with(options).await?;
    Ok(pool)
}

pub async fn clear_all_tables(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM weightlift_sets")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM run_intervals")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM workouts").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM goals").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM health_records")
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM exercises").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM users").execute(&mut *tx).await?;
    tx.commit().await?;
    info!("Cleared all tables");
    Ok(())
}

/// Row counts shown on the landing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub users: i64,
    pub health_records: i64,
    pub workouts: i64,
    pub goals: i64,
    pub exercises: i64,
}

pub async fn table_counts(pool: &SqlitePool) -> Result<TableCounts> {
    let (users, health_records, workouts, goals, exercises) =
        sqlx::query_as::<_, (i64, i64, i64, i64, i64)>(
            "SELECT
                (SELECT COUNT(*) FROM users),
                (SELECT COUNT(*) FROM health_records),
                (SELECT COUNT(*) FROM workouts),
                (SELECT COUNT(*) FROM goals),
                (SELECT COUNT(*) FROM exercises)",
        )
        .fetch_one(pool)
        .await?;

    Ok(TableCounts {
        users,
        health_records,
        workouts,
        goals,
        exercises,
    })
}

struct Migration {
    name: &'static str,
    up_sql: &'static str,
}

const MIGRATION_2026_10_01_000000_SETUP_TABLES: &str =
    include_str!("../../migrations/2026-10-01-000000_setup_tables/up.sql");

const MIGRATIONS: &[Migration] = &[Migration {
    name: "2026-10-01-000000_setup_tables",
    up_sql: MIGRATION_2026_10_01_000000_SETUP_TABLES,
}];

async fn init_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER NOT NULL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s','now') AS INTEGER))
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn is_migration_applied(pool: &SqlitePool, migration_name: &str) -> Result<bool> {
    let result =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _migrations WHERE name = ?1")
            .bind(migration_name)
            .fetch_one(pool)
            .await?;
    Ok(result > 0)
}

fn parse_sql_statements(sql: &str) -> Vec<String> {
    sql.lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with("--")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

async fn apply_migration(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    let mut tx = pool.begin().await?;

    for statement in parse_sql_statements(migration.up_sql) {
        sqlx::query(&statement)
            .execute(&mut *tx)
            .await
            .map_err(|e| FitlogError::Migration {
                name: migration.name,
                message: format!("{} - Error: {}", statement, e),
            })?;
    }

    sqlx::query("INSERT INTO _migrations (name) VALUES (?1)")
        .bind(migration.name)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn init_database(pool: &SqlitePool) -> Result<()> {
    init_migrations_table(pool).await?;

    for migration in MIGRATIONS {
        if is_migration_applied(pool, migration.name).await? {
            debug!("Migration {} already applied, skipping", migration.name);
            continue;
        }

        info!("Applying migration: {}", migration.name);
        apply_migration(pool, migration).await?;
        info!("Migration {} applied successfully", migration.name);
    }

    Ok(())
}
