//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Bestseller source site settings
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Ingestion cycle behavior
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Catalog storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.list_url.trim().is_empty() {
            return Err(AppError::validation("source.list_url is empty"));
        }
        if self.source.base_url.trim().is_empty() {
            return Err(AppError::validation("source.base_url is empty"));
        }
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.crawler.max_attempts_per_item == 0 {
            return Err(AppError::validation(
                "crawler.max_attempts_per_item must be > 0",
            ));
        }
        Ok(())
    }
}

/// Bestseller source site settings: where the ranked list lives and which
/// selectors extract data from its pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL of the bestseller list page
    #[serde(default = "defaults::list_url")]
    pub list_url: String,

    /// Base URL for resolving relative detail links
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// CSS selector for the ranked item anchors, in document order
    #[serde(default = "defaults::item_selector")]
    pub item_selector: String,

    /// HTML attribute holding the detail link
    #[serde(default = "defaults::link_attr")]
    pub link_attr: String,

    /// Selectors for detail page extraction
    #[serde(default)]
    pub detail: DetailSelectors,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            list_url: defaults::list_url(),
            base_url: defaults::base_url(),
            item_selector: defaults::item_selector(),
            link_attr: defaults::link_attr(),
            detail: DetailSelectors::default(),
        }
    }
}

/// CSS selectors for the book detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailSelectors {
    /// Selector for the title element
    #[serde(default = "defaults::title_selector")]
    pub title: String,

    /// Selector for the author element
    #[serde(default = "defaults::author_selector")]
    pub author: String,

    /// Selector for the description container
    #[serde(default = "defaults::description_selector")]
    pub description: String,

    /// Selector for the cover image element
    #[serde(default = "defaults::image_selector")]
    pub image: String,

    /// Selector for rows of the product info table
    #[serde(default = "defaults::info_row_selector")]
    pub info_row: String,

    /// Label text identifying the ISBN row within the info table
    #[serde(default = "defaults::isbn_label")]
    pub isbn_label: String,
}

impl Default for DetailSelectors {
    fn default() -> Self {
        Self {
            title: defaults::title_selector(),
            author: defaults::author_selector(),
            description: defaults::description_selector(),
            image: defaults::image_selector(),
            info_row: defaults::info_row_selector(),
            isbn_label: defaults::isbn_label(),
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrent detail requests
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Fetch+parse attempts per detail page before settling for sentinels
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts_per_item: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
            max_attempts_per_item: defaults::max_attempts(),
        }
    }
}

/// Ingestion cycle behavior.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IngestConfig {
    /// Skip the detail fan-out when the list digest matches the last cycle.
    /// Off by default: every cycle re-fetches details unconditionally.
    #[serde(default)]
    pub enable_change_detection: bool,

    /// Overwrite descriptive fields of already-known books with freshly
    /// scraped values instead of updating only the rank.
    #[serde(default)]
    pub overwrite_existing_fields: bool,
}

/// Catalog storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding catalog.json and ledger.json
    #[serde(default = "defaults::storage_root")]
    pub root_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: defaults::storage_root(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level filter (overridden by RUST_LOG)
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Source defaults
    pub fn list_url() -> String {
        "https://www.booklake.dev/bestsellers".into()
    }
    pub fn base_url() -> String {
        "https://www.booklake.dev".into()
    }
    pub fn item_selector() -> String {
        "ol.bestseller-list li a.book-link".into()
    }
    pub fn link_attr() -> String {
        "href".into()
    }

    // Detail page defaults
    pub fn title_selector() -> String {
        "h1.book-title".into()
    }
    pub fn author_selector() -> String {
        "span.book-author".into()
    }
    pub fn description_selector() -> String {
        "div.book-description".into()
    }
    pub fn image_selector() -> String {
        "img.book-cover".into()
    }
    pub fn info_row_selector() -> String {
        "table.book-info tr".into()
    }
    pub fn isbn_label() -> String {
        "ISBN".into()
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; shelfrank/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        0
    }
    pub fn max_concurrent() -> usize {
        5
    }
    pub fn max_attempts() -> u32 {
        3
    }

    // Storage defaults
    pub fn storage_root() -> String {
        "data/catalog".into()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}
