// src/pipeline/ingest.rs

//! Bestseller ingestion cycle.
//!
//! One cycle: fetch the ranked list, digest it, optionally short-circuit
//! when unchanged, fan out into bounded detail fetches, dedupe, then
//! reconcile the catalog (clear stale ranks, insert unseen books, re-rank
//! known ones). Data flows stage to stage through explicit arguments and
//! return values; there is no shared cycle state.
//!
//! Per-item detail failures are logged and dropped. A list fetch or
//! storage failure aborts the cycle and propagates to the caller; the next
//! scheduled cycle is the retry mechanism.

use std::collections::HashSet;

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::dedupe::dedupe_books;
use crate::pipeline::digest::list_digest;
use crate::services::{DetailFetcher, ListFetcher};
use crate::storage::{CatalogStore, ChangeLedger};

/// Ledger key under which the last ingested list digest is stored.
pub const LEDGER_DIGEST_KEY: &str = "bestseller:list-digest";

/// Summary of one ingestion cycle.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    /// Items on the fetched ranked list
    pub list_count: usize,
    /// Detail pages successfully extracted
    pub fetched: usize,
    /// Items dropped after exhausting their fetch attempts
    pub detail_failures: usize,
    /// Books handed to storage after deduplication
    pub persisted: usize,
    /// Rows newly inserted
    pub inserted: usize,
    /// Known rows whose rank was set
    pub updated: usize,
    /// Digest of the fetched list
    pub digest: String,
    /// Whether the cycle stopped early because the list was unchanged
    pub skipped_unchanged: bool,
}

/// Run one ingestion cycle.
///
/// The caller guarantees single-flight: no two cycles run concurrently
/// against the same store.
pub async fn run_ingest(
    config: &Config,
    list_fetcher: &ListFetcher,
    detail_fetcher: &DetailFetcher,
    store: &dyn CatalogStore,
    ledger: Option<&dyn ChangeLedger>,
) -> Result<IngestOutcome> {
    let links = list_fetcher.fetch_ranked_links().await?;
    log::info!("Fetched ranked list: {} items", links.len());

    let digest = list_digest(&links);
    let mut outcome = IngestOutcome {
        list_count: links.len(),
        digest: digest.clone(),
        ..IngestOutcome::default()
    };

    if config.ingest.enable_change_detection {
        if let Some(ledger) = ledger {
            let previous = ledger.get(LEDGER_DIGEST_KEY).await?;
            if previous.as_deref() == Some(digest.as_str()) {
                log::info!("List unchanged since last cycle, skipping detail fetch");
                outcome.skipped_unchanged = true;
                return Ok(outcome);
            }
        }
    }

    let details = detail_fetcher.fetch_all(&links).await;
    outcome.fetched = details.books.len();
    outcome.detail_failures = details.failures;
    if details.failures > 0 {
        log::warn!(
            "{} of {} detail fetches failed and were dropped",
            details.failures,
            details.requested
        );
    }

    let books = dedupe_books(details.books);
    outcome.persisted = books.len();

    // Clear stale positions first so items dropped from this cycle's list
    // end up unranked rather than keeping an outdated position.
    store.reset_all_ranks().await?;

    let keys: HashSet<String> = books
        .iter()
        .filter(|b| b.has_isbn())
        .map(|b| b.isbn.clone())
        .collect();
    let existing = store.find_existing_keys(&keys).await?;
    log::info!(
        "Persisting {} books ({} known, {} new)",
        books.len(),
        existing.len(),
        books.len() - existing.len()
    );

    let summary = store
        .upsert_ranked(&books, config.ingest.overwrite_existing_fields)
        .await?;
    outcome.inserted = summary.inserted;
    outcome.updated = summary.updated;

    if config.ingest.enable_change_detection {
        if let Some(ledger) = ledger {
            ledger.set(LEDGER_DIGEST_KEY, &digest).await?;
        }
    }

    log::info!(
        "Cycle complete: {} listed, {} persisted, {} inserted, {} re-ranked, {} dropped",
        outcome.list_count,
        outcome.persisted,
        outcome.inserted,
        outcome.updated,
        outcome.detail_failures
    );

    Ok(outcome)
}
