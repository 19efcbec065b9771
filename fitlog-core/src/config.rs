use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{FitlogError, Result};

pub const DEFAULT_DB_PATH: &str = "fitness_tracker.db";
pub const MEMORY_DB_URL: &str = "sqlite::memory:";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    Memory,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub location: DatabaseLocation,
    pub max_connections: u32,
    pub busy_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            location: DatabaseLocation::File(PathBuf::from(DEFAULT_DB_PATH)),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }
}

impl DatabaseConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DatabaseLocation::File(path.into()),
            ..Default::default()
        }
    }

    /// A private in-memory database. Always a single connection, otherwise each
    /// pooled connection would see its own empty database.
    pub fn memory() -> Self {
        Self {
            location: DatabaseLocation::Memory,
            max_connections: 1,
            ..Default::default()
        }
    }

    /// Reads `DATABASE_URL`, `FITLOG_MAX_CONNECTIONS` and `FITLOG_BUSY_TIMEOUT_MS`.
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(None)
    }

    /// Like [`DatabaseConfig::from_env`], but `database` replaces `DATABASE_URL`
    /// entirely, so a stale value in the environment is never parsed.
    pub fn from_env_with(database: Option<&str>) -> Result<Self> {
        Self::from_lookup(with_database(|key| env::var(key).ok(), database))
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("DATABASE_URL") {
            Some(url) if !url.trim().is_empty() => Self {
                location: parse_location(&url)?,
                ..Default::default()
            },
            _ => Self::default(),
        };

        if let Some(raw) = lookup("FITLOG_MAX_CONNECTIONS") {
            let n: u32 = raw.trim().parse().map_err(|_| {
                FitlogError::Config(format!("FITLOG_MAX_CONNECTIONS is not a number: {raw}"))
            })?;
            if n == 0 {
                return Err(FitlogError::Config(
                    "FITLOG_MAX_CONNECTIONS must be at least 1".to_string(),
                ));
            }
            config.max_connections = n;
        }

        if let Some(raw) = lookup("FITLOG_BUSY_TIMEOUT_MS") {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                FitlogError::Config(format!("FITLOG_BUSY_TIMEOUT_MS is not a number: {raw}"))
            })?;
            config.busy_timeout = Duration::from_millis(ms);
        }

        if config.location == DatabaseLocation::Memory {
            config.max_connections = 1;
        }

        Ok(config)
    }
}

fn with_database<'a, F>(
    lookup: F,
    database: Option<&'a str>,
) -> impl Fn(&str) -> Option<String> + 'a
where
    F: Fn(&str) -> Option<String> + 'a,
{
    move |key| match (key, database) {
        ("DATABASE_URL", Some(url)) => Some(url.to_string()),
        _ => lookup(key),
    }
}

/// Accepts a bare path, `sqlite:path`, `sqlite://path` or `sqlite::memory:`.
pub fn parse_location(url: &str) -> Result<DatabaseLocation> {
    let url = url.trim();
    if url == MEMORY_DB_URL || url == ":memory:" {
        return Ok(DatabaseLocation::Memory);
    }

    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);

    if path.contains("://") {
        return Err(FitlogError::Config(format!(
            "only SQLite databases are supported, got {url}"
        )));
    }
    if path.is_empty() {
        return Err(FitlogError::Config("empty database path".to_string()));
    }

    Ok(DatabaseLocation::File(PathBuf::from(path)))
}
