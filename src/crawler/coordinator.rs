//! Crawler coordinator - the resumable four-level crawl
//!
//! The site lists regions, each region lists countries, each country lists
//! country regions and each country region lists areas. Every area entry is
//! the root of a page tree that is walked and turned into parsed areas.
//!
//! Listings are cached in the checkpoint the first time they are fetched.
//! A level's cursor moves past an item only once everything below that item
//! has been processed, so an interrupted or capped run resumes exactly where
//! the unfinished work is. The area level is the exception: an area entry is
//! processed in one piece, so its cursor always moves on.

use crate::crawler::{prettify, walk_tree, PageSource};
use crate::extract::{parse_listing, ListItem};
use crate::model::ParsedArea;
use crate::output::BatchSink;
use crate::state::{CheckpointStore, CrawlCheckpoint, GroupedSection};
use crate::tree::assemble_areas;
use crate::{HarvestError, Result};
use std::mem;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of one crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Area trees walked
    pub trees: u64,
    pub areas: u64,
    pub sectors: u64,
    pub routes: u64,
    /// Batches handed to the sink
    pub batches: u64,
    /// Whether every region was fully processed
    pub complete: bool,
    /// Whether the run stopped at the result cap
    pub capped: bool,
}

#[derive(Debug, Clone, Copy)]
enum Level {
    Countries,
    CountryRegions,
    Areas,
}

/// Drives the crawl over all listing levels
pub struct HierarchicalCrawler<S> {
    source: S,
    checkpoints: CheckpointStore,
    checkpoint: CrawlCheckpoint,
    config_hash: Option<String>,
    batch_size: usize,
    max_results: Option<usize>,
    pending: Vec<ParsedArea>,
    report: CrawlReport,
}

impl<S: PageSource> HierarchicalCrawler<S> {
    /// Creates a crawler
    ///
    /// # Arguments
    ///
    /// * `source` - Where pages come from
    /// * `checkpoints` - Where the crawl position is loaded from and saved to
    /// * `batch_size` - Number of areas collected before a batch is delivered
    /// * `max_results` - Stop once this many areas were produced
    pub fn new(
        source: S,
        checkpoints: CheckpointStore,
        batch_size: usize,
        max_results: Option<usize>,
    ) -> Self {
        Self {
            source,
            checkpoints,
            checkpoint: CrawlCheckpoint::default(),
            config_hash: None,
            batch_size: batch_size.max(1),
            max_results,
            pending: Vec::new(),
            report: CrawlReport::default(),
        }
    }

    /// Records the configuration hash in saved checkpoints
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn checkpoint(&self) -> &CrawlCheckpoint {
        &self.checkpoint
    }

    /// Runs the crawl, delivering batches of parsed areas to `sink`
    ///
    /// Before each delivery the checkpoint is saved, so a crash loses at
    /// most the batch being delivered and the next run picks it up again.
    pub async fn run(&mut self, sink: &mut dyn BatchSink) -> Result<CrawlReport> {
        let start_time = Instant::now();
        self.report = CrawlReport::default();
        self.pending.clear();
        self.checkpoint = self.checkpoints.load();

        if let (Some(saved), Some(current)) = (&self.checkpoint.config_hash, &self.config_hash) {
            if saved != current {
                warn!("Configuration changed since the checkpoint was written; resuming anyway");
            }
        }
        if self.config_hash.is_some() {
            self.checkpoint.config_hash = self.config_hash.clone();
        }

        if self.checkpoint.is_fresh() {
            info!("Fetching region listing");
            self.checkpoint.regions.items = self.listing("").await?;
            self.checkpoint.regions.current = 0;
        } else {
            info!(
                "Resuming at region {}/{}",
                self.checkpoint.regions.current,
                self.checkpoint.regions.items.len()
            );
        }

        let regions = self.checkpoint.regions.items.clone();
        let mut complete = true;
        for (i, region) in regions.iter().enumerate().skip(self.checkpoint.regions.current) {
            info!("Region: {}...", region.name);

            let done = region.is_empty() || self.crawl_region(region, sink).await?;
            if done {
                self.checkpoint.regions.current = i + 1;
            }

            if self.cap_reached() {
                complete = done && i + 1 == regions.len();
                break;
            }
        }

        if self.pending.is_empty() {
            self.checkpoints.save(&self.checkpoint)?;
        } else {
            self.flush(sink)?;
        }

        self.report.complete = complete;
        self.report.capped = self.cap_reached();
        info!(
            "Crawl finished in {:?}: {} trees, {} areas, {} sectors, {} routes",
            start_time.elapsed(),
            self.report.trees,
            self.report.areas,
            self.report.sectors,
            self.report.routes
        );

        Ok(self.report)
    }

    /// Countries of one region; true once all of them are done
    async fn crawl_region(&mut self, region: &ListItem, sink: &mut dyn BatchSink) -> Result<bool> {
        let (start, countries) = self.open_group(Level::Countries, region).await?;

        for (i, country) in countries.iter().enumerate().skip(start) {
            info!("Country: {} -> {}...", region.name, country.name);

            let done = country.is_empty() || self.crawl_country(region, country, sink).await?;
            if done {
                self.section(Level::Countries).advance(&region.url, i + 1);
            }

            if self.cap_reached() || !done {
                return Ok(done && i + 1 == countries.len());
            }
        }

        Ok(true)
    }

    /// Country regions of one country; true once all of them are done
    async fn crawl_country(
        &mut self,
        region: &ListItem,
        country: &ListItem,
        sink: &mut dyn BatchSink,
    ) -> Result<bool> {
        let (start, country_regions) = self.open_group(Level::CountryRegions, country).await?;

        for (i, country_region) in country_regions.iter().enumerate().skip(start) {
            info!(
                "Country region: {} -> {} -> {}...",
                region.name, country.name, country_region.name
            );

            let done = country_region.is_empty()
                || self
                    .crawl_country_region(region, country, country_region, sink)
                    .await?;
            if done {
                self.section(Level::CountryRegions)
                    .advance(&country.url, i + 1);
            }

            if self.cap_reached() || !done {
                return Ok(done && i + 1 == country_regions.len());
            }
        }

        Ok(true)
    }

    /// Area trees of one country region; true once all of them are done
    async fn crawl_country_region(
        &mut self,
        region: &ListItem,
        country: &ListItem,
        country_region: &ListItem,
        sink: &mut dyn BatchSink,
    ) -> Result<bool> {
        let (start, areas) = self.open_group(Level::Areas, country_region).await?;
        let extra_tags = vec![
            region.name.clone(),
            country.name.clone(),
            country_region.name.clone(),
        ];

        for (i, area) in areas.iter().enumerate().skip(start) {
            info!(
                "Tree: {} -> {} -> {} -> {}...",
                region.name, country.name, country_region.name, area.name
            );

            if !area.is_empty() {
                self.crawl_tree(area, &extra_tags).await?;
            }
            self.section(Level::Areas)
                .advance(&country_region.url, i + 1);
            self.deliver_ready(sink)?;

            if self.cap_reached() {
                return Ok(i + 1 == areas.len());
            }
        }

        Ok(true)
    }

    /// Walks one area tree and queues the resulting areas
    async fn crawl_tree(&mut self, item: &ListItem, extra_tags: &[String]) -> Result<()> {
        let Some(tree) = walk_tree(&mut self.source, &item.url).await? else {
            debug!("Empty tree at {}", prettify(&item.url));
            return Ok(());
        };
        self.report.trees += 1;

        let areas = assemble_areas(&tree, extra_tags, &mut self.source).await?;
        for area in &areas {
            self.report.areas += 1;
            self.report.sectors += area.sectors.len() as u64;
            self.report.routes += area.route_count() as u64;
        }
        debug!("{} areas from {}", areas.len(), prettify(&item.url));

        self.pending.extend(areas);
        Ok(())
    }

    /// Cached listing of `parent` with its cursor, fetched on first use
    async fn open_group(
        &mut self,
        level: Level,
        parent: &ListItem,
    ) -> Result<(usize, Vec<ListItem>)> {
        if let Some(group) = self.section(level).group(&parent.url) {
            return Ok((group.current, group.items.clone()));
        }

        let items = self.listing(&parent.url).await?;
        self.section(level).insert_group(&parent.url, items.clone());
        Ok((0, items))
    }

    /// Fetches a listing; a missing listing page aborts the run
    async fn listing(&mut self, url: &str) -> Result<Vec<ListItem>> {
        let content = self.source.fetch_text(url).await?;
        if content.is_empty() {
            return Err(HarvestError::MissingListing {
                url: self.source.page_url(url),
            });
        }
        Ok(parse_listing(&content))
    }

    fn section(&mut self, level: Level) -> &mut GroupedSection {
        match level {
            Level::Countries => &mut self.checkpoint.countries,
            Level::CountryRegions => &mut self.checkpoint.country_regions,
            Level::Areas => &mut self.checkpoint.areas,
        }
    }

    fn cap_reached(&self) -> bool {
        self.max_results
            .is_some_and(|max| self.report.areas >= max as u64)
    }

    /// Delivers a full batch, if one is ready, between area trees
    fn deliver_ready(&mut self, sink: &mut dyn BatchSink) -> Result<()> {
        if self.pending.len() >= self.batch_size {
            self.flush(sink)?;
        }
        Ok(())
    }

    /// Saves the checkpoint, then hands all pending areas to the sink
    fn flush(&mut self, sink: &mut dyn BatchSink) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        self.checkpoints.save(&self.checkpoint)?;
        let batch = mem::take(&mut self.pending);
        info!("Delivering batch of {} areas", batch.len());
        sink.deliver(batch)?;
        self.report.batches += 1;
        Ok(())
    }
}
