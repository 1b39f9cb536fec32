//! Server settings loaded via OrthoConfig and the derived server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use rewards_backend::outbound::persistence::{DbPool, PoolConfig};
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_TRANSACTION_TIMEOUT_MS: u64 = 5_000;

/// Settings layered from defaults, a config file, `REWARDS_*` environment
/// variables and command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REWARDS")]
pub struct ServerSettings {
    /// PostgreSQL connection string; absent selects the in-memory store.
    pub database_url: Option<String>,
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<String>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Deadline for each redemption transaction, in milliseconds.
    pub transaction_timeout_ms: Option<u64>,
    /// Apply pending migrations before serving.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
}

impl ServerSettings {
    /// Parse the bind address, falling back to the default.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw}: {err}"),
            )
        })
    }

    /// Pool settings for the configured database, if any.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_deref().map(|url| {
            PoolConfig::new(url)
                .with_max_size(self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE))
        })
    }

    /// Transaction deadline; zero disables it.
    pub fn transaction_timeout(&self) -> Option<Duration> {
        match self
            .transaction_timeout_ms
            .unwrap_or(DEFAULT_TRANSACTION_TIMEOUT_MS)
        {
            0 => None,
            millis => Some(Duration::from_millis(millis)),
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) transaction_timeout: Option<Duration>,
}

impl ServerConfig {
    /// Construct a configuration serving from the in-memory store.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            transaction_timeout: None,
        }
    }

    /// Attach a database connection pool for the PostgreSQL adapters.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Bound every redemption transaction by `timeout`.
    #[must_use]
    pub fn with_transaction_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.transaction_timeout = timeout;
        self
    }
}
