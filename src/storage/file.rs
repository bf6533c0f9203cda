// src/storage/file.rs - JSON-file link store
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{CreateOutcome, LinkStore};
use crate::errors::StorageError;
use crate::models::ShortLink;

/// On-disk record layout: the file is a single JSON object keyed by code.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredLink {
    url: String,
    created_at: DateTime<Utc>,
}

/// Link store backed by a single pretty-printed JSON file.
///
/// This is the degrade-gracefully path used when no database connection can
/// be established. Every mutation holds `write_lock` across the whole
/// read-modify-write and lands through a temp-file rename, so concurrent
/// writers never interleave partial writes. Reads skip the lock; links are
/// immutable once created, so a slightly stale file is acceptable.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> BTreeMap<String, StoredLink> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return BTreeMap::new(),
        };

        match serde_json::from_str(&content) {
            Ok(links) => links,
            Err(err) => {
                warn!(
                    "Link store {} is not valid JSON ({}), treating as empty",
                    self.path.display(),
                    err
                );
                BTreeMap::new()
            }
        }
    }

    fn save(&self, links: &BTreeMap<String, StoredLink>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write the replacement file first, then swap it into place so a
        // crashed writer can never leave a truncated store behind.
        let json = serde_json::to_string_pretty(links)?;
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

#[async_trait]
impl LinkStore for JsonFileStore {
    async fn create(&self, code: &str, target_url: &str) -> Result<CreateOutcome, StorageError> {
        let _guard = self.write_lock.lock().await;

        // Re-check under the lock; a lock-free pre-check could lose a race
        // against a concurrent create.
        let mut links = self.load();
        if links.contains_key(code) {
            return Ok(CreateOutcome::Duplicate);
        }

        links.insert(
            code.to_string(),
            StoredLink {
                url: target_url.to_string(),
                created_at: Utc::now(),
            },
        );
        self.save(&links)?;

        Ok(CreateOutcome::Created)
    }

    async fn lookup(&self, code: &str) -> Result<Option<ShortLink>, StorageError> {
        let link = self.load().get(code).map(|stored| ShortLink {
            code: code.to_string(),
            target_url: stored.url.clone(),
            created_at: stored.created_at,
            hits: 0,
        });

        Ok(link)
    }

    async fn exists(&self, code: &str) -> Result<bool, StorageError> {
        Ok(self.load().contains_key(code))
    }

    async fn purge_older_than(&self, days: u32) -> Result<u64, StorageError> {
        if days == 0 {
            return Ok(0);
        }

        let _guard = self.write_lock.lock().await;

        let mut links = self.load();
        if links.is_empty() {
            return Ok(0);
        }

        let threshold = Utc::now() - Duration::days(i64::from(days));
        let before = links.len();
        links.retain(|_, stored| stored.created_at >= threshold);
        let purged = (before - links.len()) as u64;

        if purged > 0 {
            self.save(&links)?;
            debug!("Purged {} short links older than {} days", purged, days);
        }

        Ok(purged)
    }

    async fn record_hit(&self, _code: &str) -> Result<(), StorageError> {
        // The file layout does not carry a hit counter.
        Ok(())
    }
}
