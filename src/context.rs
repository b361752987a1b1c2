//! Process context
//!
//! Built once at startup and passed by reference. It owns the loaded
//! configuration and builds every component from it.

use crate::config::{load_config_with_hash, Config};
use crate::crawler::{HierarchicalCrawler, PageFetcher};
use crate::output::{RetryPolicy, StagingWriter};
use crate::state::CheckpointStore;
use crate::storage::{open_store, IngestDumper, SqliteRecordStore};
use crate::Result;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct HarvestContext {
    config: Config,
    config_hash: String,
}

impl HarvestContext {
    pub fn new(config: Config, config_hash: impl Into<String>) -> Self {
        Self {
            config,
            config_hash: config_hash.into(),
        }
    }

    /// Loads and validates the configuration file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let (config, hash) = load_config_with_hash(path)?;
        Ok(Self::new(config, hash))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_hash(&self) -> &str {
        &self.config_hash
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.config.retry)
    }

    pub fn fetcher(&self) -> Result<PageFetcher> {
        PageFetcher::new(&self.config.crawler, &self.config.user_agent)
    }

    pub fn checkpoint_store(&self) -> CheckpointStore {
        CheckpointStore::new(&self.config.output.checkpoint_path, self.retry_policy())
    }

    pub fn staging_writer(&self) -> StagingWriter {
        StagingWriter::new(&self.config.output.staging_dir, self.retry_policy())
    }

    pub fn record_store(&self) -> Result<SqliteRecordStore> {
        open_store(Path::new(&self.config.output.database_path))
    }

    /// Crawler over the live site; `max_results` overrides the configured cap
    pub fn crawler(&self, max_results: Option<usize>) -> Result<HierarchicalCrawler<PageFetcher>> {
        let crawler = HierarchicalCrawler::new(
            self.fetcher()?,
            self.checkpoint_store(),
            self.config.crawler.batch_size,
            max_results.or(self.config.crawler.max_results),
        );
        Ok(crawler.with_config_hash(self.config_hash.clone()))
    }

    pub fn ingest_dumper(&self) -> IngestDumper {
        IngestDumper::new(
            self.staging_writer(),
            self.config.output.images_dir.as_ref().map(PathBuf::from),
            self.config.crawler.base_url.clone(),
        )
    }
}
