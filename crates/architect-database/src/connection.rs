//! PostgreSQL connection pool management.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use architect_core::config::DatabaseConfig;
use architect_core::error::{AppError, ErrorKind};

/// Shared handle to the credential store's connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open a pool sized and timed by `config`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            url = %redact_url(&config.url),
            max_connections = config.max_connections,
            "Opening credential store pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to credential store: {e}"),
                    e,
                )
            })?;

        Ok(Self { pool })
    }

    /// Open a pool and bring the schema up to date.
    pub async fn connect_and_migrate(config: &DatabaseConfig) -> Result<Self, AppError> {
        let db = Self::connect(config).await?;
        crate::migration::run_migrations(&db.pool).await?;
        Ok(db)
    }

    /// Borrow the underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check that the store answers a trivial query.
    pub async fn health_check(&self) -> bool {
        match sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(v) => v == 1,
            Err(e) => {
                warn!(error = %e, "Credential store health check failed");
                false
            }
        }
    }

    /// Close all connections in the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Credential store pool closed");
    }
}

/// Replace the password in a connection URL so it can be logged.
fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://").map(|p| p + 3) else {
        return url.to_string();
    };
    let Some(at) = url[scheme_end..].find('@').map(|p| p + scheme_end) else {
        return url.to_string();
    };
    match url[scheme_end..at].find(':') {
        Some(colon) => format!("{}:****{}", &url[..scheme_end + colon], &url[at..]),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_url() {
        assert_eq!(
            redact_url("postgres://architect:hunter2@db:5432/architect"),
            "postgres://architect:****@db:5432/architect"
        );
        assert_eq!(
            redact_url("postgres://architect@db/architect"),
            "postgres://architect@db/architect"
        );
        assert_eq!(redact_url("not a url"), "not a url");
    }
}
