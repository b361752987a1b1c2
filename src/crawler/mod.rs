//! Crawler module for page fetching and crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageSource` trait, with a page cache
//! - Walking an area's page tree
//! - The resumable four-level crawl

mod coordinator;
mod fetcher;
#[cfg(test)]
pub(crate) mod stub;
mod walker;

pub use coordinator::{CrawlReport, HierarchicalCrawler};
pub use fetcher::{build_http_client, resolve_url, PageCache, PageFetcher, PageSource};
pub use walker::{prettify, walk_tree};
