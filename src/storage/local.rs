//! Local filesystem catalog backend.
//!
//! Stores the whole catalog as one JSON document and the change ledger as
//! a flat key-value file next to it, for development and testing.
//! Production deployments put a real database behind `CatalogStore`.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── catalog.json   # All books, ranked and unranked
//! └── ledger.json    # Change-detection key-value state
//! ```
//!
//! Writes go to a temp file first and are renamed into place, so readers
//! never observe a half-written document.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Book;
use crate::storage::{CatalogStore, ChangeLedger, UpsertSummary};

const CATALOG_FILE: &str = "catalog.json";
const LEDGER_FILE: &str = "ledger.json";

/// On-disk catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    /// ISO 8601 timestamp of the last write
    pub updated_at: DateTime<Utc>,
    /// Next storage-assigned book identifier
    pub next_id: u64,
    /// All catalog rows
    pub books: Vec<Book>,
}

impl Default for CatalogData {
    fn default() -> Self {
        Self {
            updated_at: Utc::now(),
            next_id: 1,
            books: Vec::new(),
        }
    }
}

/// JSON-file catalog backend.
#[derive(Clone)]
pub struct LocalCatalog {
    root_dir: PathBuf,
}

impl LocalCatalog {
    /// Create a catalog rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn catalog_path(&self) -> PathBuf {
        self.root_dir.join(CATALOG_FILE)
    }

    /// Load the catalog document, or an empty one if none exists yet.
    pub async fn load(&self) -> Result<CatalogData> {
        Ok(read_json(&self.catalog_path()).await?.unwrap_or_default())
    }

    async fn save(&self, mut data: CatalogData) -> Result<()> {
        data.updated_at = Utc::now();
        write_json(&self.catalog_path(), &data).await
    }

    /// Currently ranked books, ordered by ascending rank.
    pub async fn ranked_books(&self) -> Result<Vec<Book>> {
        let data = self.load().await?;
        let mut ranked: Vec<Book> = data.books.into_iter().filter(|b| b.rank.is_some()).collect();
        ranked.sort_by_key(|b| b.rank);
        Ok(ranked)
    }
}

#[async_trait]
impl CatalogStore for LocalCatalog {
    async fn reset_all_ranks(&self) -> Result<()> {
        let mut data = self.load().await?;
        let cleared = data.books.iter().filter(|b| b.rank.is_some()).count();
        for book in &mut data.books {
            book.rank = None;
        }
        self.save(data).await?;
        log::debug!("Cleared rank on {} rows", cleared);
        Ok(())
    }

    async fn find_existing_keys(&self, keys: &HashSet<String>) -> Result<HashSet<String>> {
        let data = self.load().await?;
        Ok(data
            .books
            .iter()
            .filter(|b| b.has_isbn() && keys.contains(&b.isbn))
            .map(|b| b.isbn.clone())
            .collect())
    }

    async fn upsert_ranked(
        &self,
        books: &[Book],
        overwrite_fields: bool,
    ) -> Result<UpsertSummary> {
        let mut data = self.load().await?;
        let mut summary = UpsertSummary::default();

        for book in books {
            let existing = if book.has_isbn() {
                data.books.iter().position(|b| b.isbn == book.isbn)
            } else {
                // No natural key: nothing to merge with, always a new row.
                None
            };

            match existing {
                Some(index) => {
                    let row = &mut data.books[index];
                    row.rank = book.rank;
                    if overwrite_fields {
                        row.title = book.title.clone();
                        row.author = book.author.clone();
                        row.description = book.description.clone();
                        row.image_url = book.image_url.clone();
                    }
                    summary.updated += 1;
                }
                None => {
                    let mut row = book.clone();
                    row.local_id = Some(data.next_id);
                    data.next_id += 1;
                    data.books.push(row);
                    summary.inserted += 1;
                }
            }
        }

        self.save(data).await?;
        Ok(summary)
    }
}

/// JSON-file change ledger.
#[derive(Clone)]
pub struct FileLedger {
    root_dir: PathBuf,
}

impl FileLedger {
    /// Create a ledger rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn ledger_path(&self) -> PathBuf {
        self.root_dir.join(LEDGER_FILE)
    }

    async fn load(&self) -> Result<HashMap<String, String>> {
        Ok(read_json(&self.ledger_path()).await?.unwrap_or_default())
    }
}

#[async_trait]
impl ChangeLedger for FileLedger {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        write_json(&self.ledger_path(), &entries).await
    }
}

/// Read JSON from `path`, returning `None` if the file doesn't exist.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Io(e)),
    }
}

/// Write JSON to `path` atomically (write to temp, then rename).
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let bytes = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
