//! Storage boundaries for catalog reconciliation.
//!
//! The ingestion pipeline talks to two collaborators:
//! - `CatalogStore`: the persistent book catalog. One ingestion cycle
//!   clears all ranks, then inserts unseen books and re-ranks known ones.
//! - `ChangeLedger`: a string key-value store remembering the last list
//!   digest, used to short-circuit unchanged cycles.
//!
//! Cycles are single-flight: callers must not run two ingestion cycles
//! against the same store concurrently.

pub mod local;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Book;

// Re-export for convenience
pub use local::{FileLedger, LocalCatalog};

/// Counts from one `upsert_ranked` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    /// Rows newly inserted
    pub inserted: usize,
    /// Rows already present whose rank was set
    pub updated: usize,
}

/// Trait for the persistent book catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Clear the rank on every currently-ranked row, so items dropped from
    /// the new list lose their stale position.
    async fn reset_all_ranks(&self) -> Result<()>;

    /// Return the subset of `keys` already present in the catalog.
    async fn find_existing_keys(&self, keys: &HashSet<String>) -> Result<HashSet<String>>;

    /// Insert books with unseen ISBNs; for known ISBNs set only the rank,
    /// unless `overwrite_fields` also refreshes the descriptive fields.
    /// Books without an ISBN are always inserted as new rows.
    async fn upsert_ranked(
        &self,
        books: &[Book],
        overwrite_fields: bool,
    ) -> Result<UpsertSummary>;
}

/// Trait for the change-detection ledger.
#[async_trait]
pub trait ChangeLedger: Send + Sync {
    /// Read a previously stored value.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}
