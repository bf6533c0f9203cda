// src/storage/mod.rs - Link store backends
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

mod file;
mod sql;

pub use file::JsonFileStore;
pub use sql::SqlLinkStore;

use crate::errors::StorageError;
use crate::models::ShortLink;

/// Result of an insert attempt.
///
/// A duplicate is a normal outcome rather than an error so the shortening
/// service can retry with a new code without inspecting error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    Duplicate,
}

/// Capability contract shared by the relational store and the JSON-file
/// fallback. The shortening service and the redirect resolver only ever see
/// this trait, so the two backends are interchangeable at call time.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Inserts a new mapping. Reports `Duplicate` when the code is taken.
    async fn create(&self, code: &str, target_url: &str) -> Result<CreateOutcome, StorageError>;

    /// Fetches the mapping for a code, or `None` when absent.
    async fn lookup(&self, code: &str) -> Result<Option<ShortLink>, StorageError>;

    /// Checks whether a code is taken. Used as the generator's existence
    /// check.
    async fn exists(&self, code: &str) -> Result<bool, StorageError>;

    /// Deletes every record older than `days` days. Returns how many were
    /// removed.
    async fn purge_older_than(&self, days: u32) -> Result<u64, StorageError>;

    /// Increments the hit counter for a code. Best-effort; backends without
    /// a counter simply succeed.
    async fn record_hit(&self, code: &str) -> Result<(), StorageError>;
}
