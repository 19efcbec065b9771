use log::info;
use sqlx::SqlitePool;

use crate::config::DatabaseConfig;
use crate::db;
use crate::error::Result;

/// Owns the connection pool. Every accessor borrows the pool explicitly;
/// connections return to the pool when each call finishes, on error paths too.
#[derive(Debug, Clone)]
pub struct Tracker {
    pool: SqlitePool,
}

impl Tracker {
    /// Connects and brings the schema up to date.
    pub async fn open(config: &DatabaseConfig) -> Result<Self> {
        let pool = db::connect(config).await?;
        db::init_database(&pool).await?;
        info!("Database ready at {:?}", config.location);
        Ok(Self { pool })
    }

    pub async fn open_in_memory() -> Result<Self> {
        Self::open(&DatabaseConfig::memory()).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}
