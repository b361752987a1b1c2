//! HTTP page fetcher
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Resolving site-relative links against the configured base URL
//! - Keeping a bounded recency cache of fetched pages
//! - Error classification (404 means "no page", anything else aborts)

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::{HarvestError, Result};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, StatusCode};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Source of page text and binary resources
///
/// Extraction and tree walking fetch through this trait so that nested
/// fetches (route detail pages, photo pages) can be stubbed in tests.
#[async_trait]
pub trait PageSource: Send {
    /// Fetches a page as text; an absent page yields an empty string
    async fn fetch_text(&mut self, url: &str) -> Result<String>;

    /// Fetches a binary resource; never cached
    async fn fetch_binary(&mut self, url: &str) -> Result<Vec<u8>>;

    /// Absolute form of a link, used as the origin of parsed records
    fn page_url(&self, url: &str) -> String {
        url.to_string()
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use route_harvest::config::UserAgentConfig;
/// use route_harvest::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "RouteHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> std::result::Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Resolves a link found on the site against the base URL
///
/// Absolute links are kept; anything else is appended to the base, and
/// `..` segments are collapsed.
pub fn resolve_url(base: &str, link: &str) -> Result<String> {
    let joined = if link.contains("://") {
        link.to_string()
    } else {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            link.trim_start_matches('/')
        )
    };
    Ok(Url::parse(&joined)?.to_string())
}

/// Bounded recency cache of page texts
///
/// When more than `capacity` pages are held, the `trim` oldest are evicted.
#[derive(Debug)]
pub struct PageCache {
    capacity: usize,
    trim: usize,
    order: VecDeque<String>,
    pages: HashMap<String, String>,
}

impl PageCache {
    pub fn new(capacity: usize, trim: usize) -> Self {
        Self {
            capacity,
            trim: trim.max(1),
            order: VecDeque::new(),
            pages: HashMap::new(),
        }
    }

    pub fn get(&self, url: &str) -> Option<&String> {
        self.pages.get(url)
    }

    pub fn insert(&mut self, url: String, text: String) {
        if self.pages.contains_key(&url) {
            self.pages.insert(url, text);
            return;
        }

        if self.order.len() >= self.capacity {
            for _ in 0..self.trim.min(self.order.len()) {
                if let Some(old) = self.order.pop_front() {
                    self.pages.remove(&old);
                }
            }
        }

        self.order.push_back(url.clone());
        self.pages.insert(url, text);
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// HTTP implementation of [`PageSource`]
pub struct PageFetcher {
    client: Client,
    base_url: String,
    cache: PageCache,
}

impl PageFetcher {
    /// Creates a fetcher for the configured site
    ///
    /// # Arguments
    ///
    /// * `crawler` - Base URL and cache bounds
    /// * `user_agent` - Identification sent with every request
    pub fn new(crawler: &CrawlerConfig, user_agent: &UserAgentConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(user_agent)?,
            base_url: crawler.base_url.clone(),
            cache: PageCache::new(crawler.cache_size, crawler.cache_trim),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a GET request; `None` means the page does not exist
    async fn get(&self, url: &str) -> Result<Option<reqwest::Response>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| HarvestError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("Page not found: {}", url);
            return Ok(None);
        }

        if !status.is_success() {
            return Err(HarvestError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(Some(response))
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch_text(&mut self, url: &str) -> Result<String> {
        let full_url = resolve_url(&self.base_url, url)?;
        if let Some(text) = self.cache.get(&full_url) {
            return Ok(text.clone());
        }

        debug!("Fetching {}", full_url);
        let text = match self.get(&full_url).await? {
            Some(response) => response.text().await.map_err(|source| HarvestError::Http {
                url: full_url.clone(),
                source,
            })?,
            None => String::new(),
        };

        self.cache.insert(full_url, text.clone());
        Ok(text)
    }

    async fn fetch_binary(&mut self, url: &str) -> Result<Vec<u8>> {
        let full_url = resolve_url(&self.base_url, url)?;

        debug!("Fetching binary {}", full_url);
        match self.get(&full_url).await? {
            Some(response) => {
                let bytes = response.bytes().await.map_err(|source| HarvestError::Http {
                    url: full_url.clone(),
                    source,
                })?;
                Ok(bytes.to_vec())
            }
            None => Ok(Vec::new()),
        }
    }

    fn page_url(&self, url: &str) -> String {
        resolve_url(&self.base_url, url).unwrap_or_else(|_| url.to_string())
    }
}
