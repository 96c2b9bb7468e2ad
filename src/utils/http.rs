// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::CrawlerConfig;

/// Source of raw page bodies.
///
/// The crawler services fetch through this seam so tests can feed fixture
/// HTML without a network.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the body of `url` as text. Non-2xx responses are errors.
    async fn fetch_html(&self, url: &str) -> Result<String>;
}

/// `PageSource` backed by a configured `reqwest` client.
pub struct HttpPageSource {
    client: reqwest::Client,
}

impl HttpPageSource {
    /// Build the client with the configured user agent and timeout.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}
