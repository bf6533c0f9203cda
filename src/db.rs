use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;

use crate::config::DatabaseConfig;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Database schema error: {0}")]
    Schema(String),
}

pub type DbResult<T> = Result<T, DatabaseError>;

/// Represents an established database connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

/// Database health status
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DbHealthStatus {
    Healthy,
    Unhealthy,
}

/// Complete database health check result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseHealth {
    pub status: DbHealthStatus,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Database {
    /// Create a new database connection pool from configuration.
    ///
    /// The connect attempt is bounded by the configured timeout so an
    /// unreachable server fails fast and the caller can fall back to the
    /// file store instead of hanging the request path.
    pub async fn connect(config: &DatabaseConfig, url: &str) -> DbResult<Self> {
        info!("Initializing database connection");
        debug!(
            "Database configuration: max_conn={}, min_conn={}, timeout={}s",
            config.max_connections, config.min_connections, config.connect_timeout_seconds
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect(url)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                DatabaseError::Connection(e)
            })?;

        info!("Successfully connected to database");

        let db = Self { pool };
        db.ensure_schema().await?;

        Ok(db)
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> DatabaseHealth {
        // Measure query execution time
        let start = std::time::Instant::now();

        let result = sqlx::query("SELECT 1").fetch_one(&self.pool).await;

        let elapsed = start.elapsed();

        match result {
            Ok(_) => DatabaseHealth {
                status: DbHealthStatus::Healthy,
                response_time_ms: elapsed.as_millis() as u64,
                message: None,
            },
            Err(e) => DatabaseHealth {
                status: DbHealthStatus::Unhealthy,
                response_time_ms: elapsed.as_millis() as u64,
                message: Some(format!("Database query failed: {}", e)),
            },
        }
    }

    /// Create the `short_links` table when it does not exist yet.
    async fn ensure_schema(&self) -> DbResult<()> {
        info!("Ensuring short_links schema");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS short_links (
                code       VARCHAR(12) PRIMARY KEY,
                target_url TEXT        NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                hits       BIGINT      NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!("Schema bootstrap failed: {}", e);
            DatabaseError::Schema(e.to_string())
        })?;

        Ok(())
    }
}
