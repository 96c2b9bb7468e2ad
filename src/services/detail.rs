// src/services/detail.rs

//! Book detail fetcher.
//!
//! Fetches detail pages for ranked links, extracting title, author,
//! description, cover image and ISBN. Extraction is best-effort: an empty
//! read can be a transient race with page rendering, so incomplete results
//! are retried a bounded number of times, and whatever was extracted after
//! the final attempt is returned with sentinel placeholders filling the
//! gaps. Only a transport failure on every attempt drops an item.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{
    AUTHOR_MISSING, Book, Config, DESCRIPTION_MISSING, IMAGE_MISSING, RankedLink, TITLE_MISSING,
};
use crate::services::list::parse_selector;
use crate::utils::{PageSource, resolve_url, text};

/// Summary of a detail fan-out run.
#[derive(Debug, Default)]
pub struct DetailOutcome {
    /// Successfully extracted books (sentinel fields included)
    pub books: Vec<Book>,
    /// Number of ranked links dispatched
    pub requested: usize,
    /// Items dropped after exhausting their attempt budget
    pub failures: usize,
}

/// Fields extracted from one detail page parse. `None` means the page
/// yielded nothing usable for that field on this attempt.
#[derive(Debug, Default)]
struct DetailFields {
    title: Option<String>,
    author: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    isbn: Option<String>,
}

impl DetailFields {
    fn is_complete(&self) -> bool {
        self.title.is_some()
            && self.author.is_some()
            && self.description.is_some()
            && self.image_url.is_some()
            && self.isbn.is_some()
    }

    fn into_book(self, rank: u32) -> Book {
        Book {
            isbn: self.isbn.unwrap_or_default(),
            title: self.title.unwrap_or_else(|| TITLE_MISSING.to_string()),
            author: self.author.unwrap_or_else(|| AUTHOR_MISSING.to_string()),
            description: self
                .description
                .unwrap_or_else(|| DESCRIPTION_MISSING.to_string()),
            image_url: self.image_url.unwrap_or_else(|| IMAGE_MISSING.to_string()),
            rank: Some(rank),
            favorite_count: 0,
            local_id: None,
        }
    }
}

/// Service fetching and extracting book detail pages.
pub struct DetailFetcher {
    config: Arc<Config>,
    source: Arc<dyn PageSource>,
    title_selector: Selector,
    author_selector: Selector,
    description_selector: Selector,
    image_selector: Selector,
    info_row_selector: Selector,
    isbn_label: String,
    isbn_pattern: Regex,
}

impl DetailFetcher {
    /// Create a new detail fetcher, compiling the configured selectors.
    pub fn new(config: Arc<Config>, source: Arc<dyn PageSource>) -> Result<Self> {
        let detail = &config.source.detail;
        let title_selector = parse_selector(&detail.title)?;
        let author_selector = parse_selector(&detail.author)?;
        let description_selector = parse_selector(&detail.description)?;
        let image_selector = parse_selector(&detail.image)?;
        let info_row_selector = parse_selector(&detail.info_row)?;
        let isbn_label = detail.isbn_label.to_lowercase();
        let isbn_pattern = Regex::new(r"\b\d{13}\b")
            .map_err(|e| AppError::config(format!("ISBN pattern: {e}")))?;

        Ok(Self {
            config,
            source,
            title_selector,
            author_selector,
            description_selector,
            image_selector,
            info_row_selector,
            isbn_label,
            isbn_pattern,
        })
    }

    /// Fetch details for all ranked links, at most `max_concurrent` in
    /// flight at once, and gather every result before returning.
    ///
    /// Per-item failures are logged with their rank and URL and counted;
    /// they never abort sibling fetches.
    pub async fn fetch_all(&self, links: &[RankedLink]) -> DetailOutcome {
        let concurrency = self.config.crawler.max_concurrent.max(1);
        let delay = Duration::from_millis(self.config.crawler.request_delay_ms);

        let mut outcome = DetailOutcome {
            requested: links.len(),
            ..DetailOutcome::default()
        };

        let mut detail_stream = stream::iter(links.iter().cloned())
            .map(|link| async move {
                let result = self.fetch_detail(link.rank, &link.url).await;
                (link, result)
            })
            .buffer_unordered(concurrency);

        while let Some((link, result)) = detail_stream.next().await {
            match result {
                Ok(book) => outcome.books.push(book),
                Err(error) => {
                    outcome.failures += 1;
                    log::warn!("Dropping rank {} ({}): {}", link.rank, link.url, error);
                }
            }

            if delay.as_millis() > 0 {
                tokio::time::sleep(delay).await;
            }
        }

        outcome
    }

    /// Fetch and extract a single detail page, retrying while fields are
    /// missing and attempts remain.
    ///
    /// Transport failures consume attempts from the same budget; if no
    /// attempt produced a parseable body the last transport error is
    /// surfaced as a per-item fetch error.
    pub async fn fetch_detail(&self, rank: u32, url: &str) -> Result<Book> {
        let max_attempts = self.config.crawler.max_attempts_per_item.max(1);
        let mut extracted: Option<DetailFields> = None;
        let mut last_transport: Option<AppError> = None;

        for attempt in 1..=max_attempts {
            match self.source.fetch_html(url).await {
                Ok(body) => {
                    let fields = self.parse_detail(&body);
                    let complete = fields.is_complete();
                    extracted = Some(fields);
                    if complete {
                        break;
                    }
                    if attempt < max_attempts {
                        log::debug!(
                            "Incomplete extraction for rank {} ({}), attempt {}/{}",
                            rank,
                            url,
                            attempt,
                            max_attempts
                        );
                    }
                }
                Err(error) => {
                    log::debug!(
                        "Fetch failed for rank {} ({}), attempt {}/{}: {}",
                        rank,
                        url,
                        attempt,
                        max_attempts,
                        error
                    );
                    last_transport = Some(error);
                }
            }
        }

        match extracted {
            Some(fields) => Ok(fields.into_book(rank)),
            None => {
                let message = last_transport
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no fetch attempts were made".to_string());
                Err(AppError::detail_fetch(rank, url, message))
            }
        }
    }

    /// Extract all fields from one detail page body.
    fn parse_detail(&self, body: &str) -> DetailFields {
        let document = Html::parse_document(body);

        let image_url = document
            .select(&self.image_selector)
            .next()
            .and_then(|el| el.value().attr("src"))
            .and_then(text::non_empty)
            .map(|src| resolve_url(&self.config.source.base_url, &src));

        DetailFields {
            title: self.select_text(&document, &self.title_selector),
            author: self.select_text(&document, &self.author_selector),
            description: self.select_text(&document, &self.description_selector),
            image_url,
            isbn: self.extract_isbn(&document),
        }
    }

    /// Text of the first match for `selector`, markup stripped and
    /// whitespace collapsed. Adjacent text nodes are joined with spaces so
    /// sibling elements don't run together.
    fn select_text(&self, document: &Html, selector: &Selector) -> Option<String> {
        document
            .select(selector)
            .next()
            .map(|el| el.text().collect::<Vec<_>>().join(" "))
            .and_then(|t| text::non_empty(&t))
    }

    /// Walk the product info table for the row labeled with the ISBN
    /// marker and pull the first 13-digit run out of it.
    fn extract_isbn(&self, document: &Html) -> Option<String> {
        for row in document.select(&self.info_row_selector) {
            let row_text = row.text().collect::<Vec<_>>().join(" ");
            if !row_text.to_lowercase().contains(&self.isbn_label) {
                continue;
            }
            if let Some(found) = self.isbn_pattern.find(&row_text) {
                return Some(found.as_str().to_string());
            }
        }
        None
    }
}
