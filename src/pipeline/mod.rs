// src/pipeline/mod.rs

//! Ingestion pipeline stages.

pub mod dedupe;
pub mod digest;
pub mod ingest;

pub use dedupe::dedupe_books;
pub use digest::list_digest;
pub use ingest::{IngestOutcome, LEDGER_DIGEST_KEY, run_ingest};
