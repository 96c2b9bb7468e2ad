// src/services/list.rs

//! Bestseller list fetcher.
//!
//! Fetches the ranked list page and extracts an ordered sequence of
//! (rank, detail link) pairs using the configured CSS selector.

use std::sync::Arc;

use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Config, RankedLink};
use crate::utils::{PageSource, resolve_url};

/// Service fetching the ranked bestseller list.
pub struct ListFetcher {
    config: Arc<Config>,
    source: Arc<dyn PageSource>,
    item_selector: Selector,
}

impl ListFetcher {
    /// Create a new list fetcher, compiling the configured selector.
    pub fn new(config: Arc<Config>, source: Arc<dyn PageSource>) -> Result<Self> {
        let item_selector = parse_selector(&config.source.item_selector)?;
        Ok(Self {
            config,
            source,
            item_selector,
        })
    }

    /// Fetch the list page and return ranked links in document order.
    ///
    /// Rank is the 1-based position among qualifying anchors (matched by
    /// the item selector and carrying a link attribute). A page with no
    /// qualifying anchors yields an empty list, not an error.
    pub async fn fetch_ranked_links(&self) -> Result<Vec<RankedLink>> {
        let list_url = &self.config.source.list_url;
        let body = self
            .source
            .fetch_html(list_url)
            .await
            .map_err(|e| AppError::list_fetch(list_url, e))?;

        Ok(self.parse_list(&body))
    }

    /// Extract ranked links from a list page body.
    fn parse_list(&self, body: &str) -> Vec<RankedLink> {
        let document = Html::parse_document(body);
        let attr = self.config.source.link_attr.as_str();
        let base = self.config.source.base_url.as_str();

        let mut links = Vec::new();
        for element in document.select(&self.item_selector) {
            let Some(href) = element.value().attr(attr) else {
                continue;
            };
            if href.trim().is_empty() {
                continue;
            }
            links.push(RankedLink {
                rank: links.len() as u32 + 1,
                url: resolve_url(base, href.trim()),
            });
        }
        links
    }
}

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixtureSource(String);

    #[async_trait]
    impl PageSource for FixtureSource {
        async fn fetch_html(&self, _url: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PageSource for FailingSource {
        async fn fetch_html(&self, url: &str) -> Result<String> {
            Err(AppError::storage(format!("unreachable: {url}")))
        }
    }

    fn fetcher_for(body: &str) -> ListFetcher {
        let config = Arc::new(Config::default());
        ListFetcher::new(config, Arc::new(FixtureSource(body.to_string()))).unwrap()
    }

    const LIST_PAGE: &str = r#"
        <html><body>
        <ol class="bestseller-list">
            <li><a class="book-link" href="/book/1">First</a></li>
            <li><a class="book-link" href="/book/2">Second</a></li>
            <li><a class="book-link" href="https://other.example.com/book/3">Third</a></li>
        </ol>
        </body></html>
    "#;

    #[tokio::test]
    async fn ranks_follow_document_order() {
        let fetcher = fetcher_for(LIST_PAGE);
        let links = fetcher.fetch_ranked_links().await.unwrap();

        assert_eq!(links.len(), 3);
        assert_eq!(
            links.iter().map(|l| l.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(links[0].url, "https://www.booklake.dev/book/1");
        assert_eq!(links[2].url, "https://other.example.com/book/3");
    }

    #[tokio::test]
    async fn anchors_without_href_are_skipped() {
        let body = r#"
            <ol class="bestseller-list">
                <li><a class="book-link">no link</a></li>
                <li><a class="book-link" href="/book/7">Seven</a></li>
            </ol>
        "#;
        let fetcher = fetcher_for(body);
        let links = fetcher.fetch_ranked_links().await.unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].rank, 1);
        assert_eq!(links[0].url, "https://www.booklake.dev/book/7");
    }

    #[tokio::test]
    async fn empty_page_yields_empty_list() {
        let fetcher = fetcher_for("<html><body></body></html>");
        let links = fetcher.fetch_ranked_links().await.unwrap();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn fetch_failure_is_a_list_fetch_error() {
        let config = Arc::new(Config::default());
        let fetcher = ListFetcher::new(config, Arc::new(FailingSource)).unwrap();

        let err = fetcher.fetch_ranked_links().await.unwrap_err();
        assert!(matches!(err, AppError::ListFetch { .. }));
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(parse_selector("[[invalid").is_err());
    }
}
