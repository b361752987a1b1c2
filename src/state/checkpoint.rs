//! Crawl checkpoint
//!
//! The checkpoint holds the position of the crawl at each of the four
//! listing levels together with the listings themselves, so a resumed run
//! iterates exactly the items the interrupted run saw.
//!
//! Regions form one flat listing. Countries, country regions and areas are
//! grouped by the URL of their parent item, since names repeat across the
//! site ("North" under several countries). Each group keeps its own cursor
//! and the level keeps the last cursor written.

use crate::extract::ListItem;
use crate::output::RetryPolicy;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The top-level listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingSection {
    pub current: usize,
    pub items: Vec<ListItem>,
}

/// The listing found under one parent item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingGroup {
    /// URL of the parent item
    pub key: String,
    pub current: usize,
    pub items: Vec<ListItem>,
}

/// Listings of one level, grouped by parent URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedSection {
    pub current: usize,
    pub groups: Vec<ListingGroup>,
}

impl GroupedSection {
    pub fn group(&self, key: &str) -> Option<&ListingGroup> {
        self.groups.iter().find(|g| g.key == key)
    }

    /// Caches the listing under `key`; its cursor starts at zero
    pub fn insert_group(&mut self, key: &str, items: Vec<ListItem>) {
        match self.groups.iter_mut().find(|g| g.key == key) {
            Some(group) => {
                group.items = items;
                group.current = 0;
            }
            None => self.groups.push(ListingGroup {
                key: key.to_string(),
                current: 0,
                items,
            }),
        }
    }

    /// Moves the cursor of the group under `key`
    pub fn advance(&mut self, key: &str, index: usize) {
        if let Some(group) = self.groups.iter_mut().find(|g| g.key == key) {
            group.current = index;
        }
        self.current = index;
    }
}

/// Persisted crawl position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlCheckpoint {
    /// Hash of the configuration the checkpoint was written with
    #[serde(default)]
    pub config_hash: Option<String>,
    #[serde(default)]
    pub regions: ListingSection,
    #[serde(default)]
    pub countries: GroupedSection,
    #[serde(default)]
    pub country_regions: GroupedSection,
    #[serde(default)]
    pub areas: GroupedSection,
}

impl CrawlCheckpoint {
    pub fn is_fresh(&self) -> bool {
        self.regions.items.is_empty()
    }
}

/// Loads and saves the checkpoint document
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
    retry: RetryPolicy,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        Self {
            path: path.into(),
            retry,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the checkpoint
    ///
    /// A missing, unreadable or corrupt document yields a fresh checkpoint.
    pub fn load(&self) -> CrawlCheckpoint {
        if !self.path.exists() {
            debug!("No checkpoint at {}", self.path.display());
            return CrawlCheckpoint::default();
        }

        let content = match self.retry.run("Read checkpoint", || fs::read_to_string(&self.path)) {
            Ok(content) => content,
            Err(e) => {
                warn!("Checkpoint {} is unreadable, starting fresh: {}", self.path.display(), e);
                return CrawlCheckpoint::default();
            }
        };

        match serde_json::from_str::<CrawlCheckpoint>(&content) {
            Ok(checkpoint) => {
                info!(
                    "Loaded checkpoint: region {}/{}",
                    checkpoint.regions.current,
                    checkpoint.regions.items.len()
                );
                checkpoint
            }
            Err(e) => {
                warn!("Checkpoint {} is corrupt, starting fresh: {}", self.path.display(), e);
                CrawlCheckpoint::default()
            }
        }
    }

    /// Writes the checkpoint through a temporary file
    pub fn save(&self, checkpoint: &CrawlCheckpoint) -> Result<()> {
        let json = serde_json::to_string_pretty(checkpoint)?;
        let tmp = self.path.with_extension("json.tmp");

        self.retry.run("Write checkpoint", || {
            if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir)?;
            }
            fs::write(&tmp, &json)?;
            fs::rename(&tmp, &self.path)
        })?;

        debug!("Checkpoint saved to {}", self.path.display());
        Ok(())
    }

    /// Removes the checkpoint document, if any
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            self.retry.run("Remove checkpoint", || fs::remove_file(&self.path))?;
            info!("Checkpoint cleared");
        }
        Ok(())
    }
}
