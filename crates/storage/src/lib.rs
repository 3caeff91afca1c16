pub mod codec;
pub mod dto;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub use error::{Result, StorageError};
use repository::GameRepository;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// How long to wait for a pooled connection before reporting the store unreachable.
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_acquire_timeout(mut self, acquire_timeout: Duration) -> Self {
        self.acquire_timeout = acquire_timeout;
        self
    }

    /// Host part of the URL, with credentials stripped, for logging.
    pub fn redacted_url(&self) -> &str {
        self.url.split('@').next_back().unwrap_or("unknown")
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
    }
}

#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        Self::connect(&DatabaseConfig::new(database_url)).await
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = config.pool_options().connect(&config.url).await?;
        Ok(Self { pool })
    }

    /// Builds the pool without opening a connection; the first query connects.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self> {
        let pool = config.pool_options().connect_lazy(&config.url)?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn games(&self) -> GameRepository<'_> {
        GameRepository::new(&self.pool)
    }
}
