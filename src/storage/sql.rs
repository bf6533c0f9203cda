// src/storage/sql.rs - Relational link store
use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::debug;
use sqlx::PgPool;

use super::{CreateOutcome, LinkStore};
use crate::db::Database;
use crate::errors::storage::is_unique_violation;
use crate::errors::StorageError;
use crate::models::ShortLink;

/// Link store backed by the `short_links` table. `code` carries a unique
/// key, so insert races surface as constraint violations instead of lost
/// updates.
pub struct SqlLinkStore {
    pool: PgPool,
}

impl SqlLinkStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }
}

#[async_trait]
impl LinkStore for SqlLinkStore {
    async fn create(&self, code: &str, target_url: &str) -> Result<CreateOutcome, StorageError> {
        let result = sqlx::query("INSERT INTO short_links (code, target_url) VALUES ($1, $2)")
            .bind(code)
            .bind(target_url)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(CreateOutcome::Created),
            Err(err) if is_unique_violation(&err) => {
                debug!("Insert collided on code '{}'", code);
                Ok(CreateOutcome::Duplicate)
            }
            Err(err) => Err(StorageError::Database(err)),
        }
    }

    async fn lookup(&self, code: &str) -> Result<Option<ShortLink>, StorageError> {
        let link = sqlx::query_as::<_, ShortLink>(
            "SELECT code, target_url, created_at, hits FROM short_links WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }

    async fn exists(&self, code: &str) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT 1 FROM short_links WHERE code = $1 LIMIT 1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.is_some())
    }

    async fn purge_older_than(&self, days: u32) -> Result<u64, StorageError> {
        if days == 0 {
            return Ok(0);
        }

        let threshold = Utc::now() - Duration::days(i64::from(days));
        let result = sqlx::query("DELETE FROM short_links WHERE created_at < $1")
            .bind(threshold)
            .execute(&self.pool)
            .await?;

        let purged = result.rows_affected();
        if purged > 0 {
            debug!("Purged {} short links older than {} days", purged, days);
        }

        Ok(purged)
    }

    async fn record_hit(&self, code: &str) -> Result<(), StorageError> {
        sqlx::query("UPDATE short_links SET hits = hits + 1 WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
