//! bb8 pool of `diesel-async` PostgreSQL connections.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// Failure to create the pool or borrow from it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("connection pool could not be built: {0}")]
    Build(String),
    /// Checkout timed out or the connection could not be opened.
    #[error("no pooled connection available: {0}")]
    Checkout(String),
}

impl PoolError {
    /// Underlying cause without the variant prefix.
    #[must_use]
    pub fn cause(&self) -> &str {
        match self {
            Self::Build(cause) | Self::Checkout(cause) => cause,
        }
    }
}

/// Connection string plus sizing for [`DbPool::new`].
///
/// ```
/// use std::time::Duration;
/// use seed_ledger::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://localhost/seed")
///     .with_max_size(4)
///     .with_connection_timeout(Duration::from_secs(5));
/// assert_eq!(config.max_size(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    url: String,
    max_size: u32,
    min_idle: Option<u32>,
    checkout_timeout: Duration,
}

impl PoolConfig {
    /// Ten connections, two idle, thirty second checkout timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_size: 10,
            min_idle: Some(2),
            checkout_timeout: Duration::from_secs(30),
        }
    }

    /// Cap the pool; an idle floor above the cap is lowered to match.
    #[must_use]
    pub fn with_max_size(self, max_size: u32) -> Self {
        Self {
            max_size,
            min_idle: self.min_idle.map(|idle| idle.min(max_size)),
            ..self
        }
    }

    #[must_use]
    pub fn with_min_idle(self, min_idle: Option<u32>) -> Self {
        Self { min_idle, ..self }
    }

    #[must_use]
    pub fn with_connection_timeout(self, checkout_timeout: Duration) -> Self {
        Self {
            checkout_timeout,
            ..self
        }
    }

    #[must_use]
    pub fn max_size(&self) -> u32 {
        self.max_size
    }
}

/// Shared handle; clones borrow from the same pool.
#[derive(Clone)]
pub struct DbPool(Pool<AsyncPgConnection>);

impl DbPool {
    /// Open the pool, establishing the idle connections up front.
    ///
    /// # Errors
    /// [`PoolError::Build`] when the URL is malformed or the server refuses
    /// the initial connections.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.checkout_timeout)
            .build(AsyncDieselConnectionManager::new(config.url))
            .await
            .map(Self)
            .map_err(|err| PoolError::Build(err.to_string()))
    }

    /// Borrow a connection.
    ///
    /// # Errors
    /// [`PoolError::Checkout`] when none frees up before the timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.0
            .get()
            .await
            .map_err(|err| PoolError::Checkout(err.to_string()))
    }
}
