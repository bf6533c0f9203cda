use std::sync::Arc;

mod shortener;

pub use shortener::ShortenerService;

use crate::config::Config;
use crate::db::Database;
use crate::storage::{JsonFileStore, LinkStore, SqlLinkStore};

/// Builds the shortening service from the configured backends.
///
/// The relational store is injected only when a database connection was
/// established; the JSON file store is always present as the fallback.
pub fn build(db: Option<&Database>, config: &Config) -> ShortenerService {
    let primary: Option<Arc<dyn LinkStore>> =
        db.map(|db| Arc::new(SqlLinkStore::new(db)) as Arc<dyn LinkStore>);
    let fallback: Arc<dyn LinkStore> =
        Arc::new(JsonFileStore::new(config.shortener.store_path.clone()));

    ShortenerService::new(primary, fallback, config.shortener.clone())
}
