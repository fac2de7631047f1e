//! Connection pool behind the PostgreSQL store provider.
//!
//! Pool sizing and timeouts come straight from `[database]` in the
//! configuration file. URLs are redacted before they reach the logs.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info};

use catalog_core::config::DatabaseConfig;
use catalog_core::error::{AppError, ErrorKind};

/// Shared sqlx pool used by every PostgreSQL repository.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open the pool and wait for the first connection.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let target = redact_url(&config.url);
        info!(
            target_url = %target,
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            acquire_timeout_s = config.connect_timeout_seconds,
            "Opening catalog store pool"
        );

        let pool = pool_options(config)
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Catalog store at {target} is unreachable: {e}"),
                    e,
                )
            })?;

        info!(target_url = %target, "Catalog store pool ready");
        Ok(Self { pool })
    }

    /// The sqlx pool, for repositories and migrations.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial query; `Ok(false)` means the server answered
    /// with something unexpected.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        let answer = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Catalog store ping failed", e))?;
        debug!(idle = self.pool.num_idle(), size = self.pool.size(), "Catalog store ping");
        Ok(answer == 1)
    }

    /// Wait for checked-out connections to return, then close them.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Catalog store pool closed");
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
}

/// Replace the password in a connection URL with `****`.
pub fn redact_url(url: &str) -> String {
    let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
    match url.rfind('@') {
        Some(at) if at > scheme_end => match url[scheme_end..at].find(':') {
            Some(colon) => format!("{}:****{}", &url[..scheme_end + colon], &url[at..]),
            None => url.to_string(),
        },
        _ => url.to_string(),
    }
}
