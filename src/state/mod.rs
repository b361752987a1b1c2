//! Crawl state persisted between runs
//!
//! # Components
//!
//! - `CrawlCheckpoint`: per-level listing cursors plus the cached listings
//! - `CheckpointStore`: JSON persistence that tolerates missing or corrupt files

mod checkpoint;

pub use checkpoint::{CheckpointStore, CrawlCheckpoint, GroupedSection, ListingGroup, ListingSection};
