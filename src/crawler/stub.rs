//! In-memory page source for unit tests

use crate::crawler::PageSource;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Serves canned pages keyed by the exact link requested
///
/// Unknown links behave like a missing page: empty text or no bytes.
#[derive(Debug, Default)]
pub struct StubSource {
    pages: HashMap<String, String>,
    binaries: HashMap<String, Vec<u8>>,
    requests: Vec<String>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), text.to_string());
        self
    }

    pub fn with_binary(mut self, url: &str, bytes: &[u8]) -> Self {
        self.binaries.insert(url.to_string(), bytes.to_vec());
        self
    }

    pub fn requests(&self) -> &[String] {
        &self.requests
    }

    pub fn requested(&self, url: &str) -> bool {
        self.requests.iter().any(|r| r == url)
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.iter().filter(|r| *r == url).count()
    }
}

#[async_trait]
impl PageSource for StubSource {
    async fn fetch_text(&mut self, url: &str) -> Result<String> {
        self.requests.push(url.to_string());
        Ok(self.pages.get(url).cloned().unwrap_or_default())
    }

    async fn fetch_binary(&mut self, url: &str) -> Result<Vec<u8>> {
        self.requests.push(url.to_string());
        Ok(self.binaries.get(url).cloned().unwrap_or_default())
    }
}
