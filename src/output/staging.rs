//! Staging writer
//!
//! Parsed areas are written to a three-tier folder layout:
//!
//! ```text
//! <root>/<Area>/metadata.json
//! <root>/<Area>/<Sector>/metadata.json
//! <root>/<Area>/<Sector>/routes.json
//! <root>/<Area>/<Sector>/image.jpg
//! ```
//!
//! Identities already present on disk are copied onto incoming records
//! before anything is written, so staging the same area again never mints
//! a new identity.

use crate::extract::path_component;
use crate::model::{ParsedArea, ParsedSector};
use crate::output::records::{StagedArea, StagedRoute, StagedSector};
use crate::output::{BatchSink, RetryPolicy, StagingSummary};
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const METADATA_FILE: &str = "metadata.json";
pub const ROUTES_FILE: &str = "routes.json";
pub const IMAGE_FILE: &str = "image.jpg";

/// Writes parsed batches to the staging folder and reads them back
#[derive(Debug, Clone)]
pub struct StagingWriter {
    root: PathBuf,
    retry: RetryPolicy,
    total: StagingSummary,
}

impl StagingWriter {
    pub fn new(root: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        Self {
            root: root.into(),
            retry,
            total: StagingSummary::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Everything written through [`BatchSink::deliver`] so far
    pub fn total(&self) -> StagingSummary {
        self.total
    }

    /// Stages a batch of areas
    ///
    /// # Arguments
    ///
    /// * `areas` - Freshly parsed areas; identities are taken from disk
    ///
    /// # Returns
    ///
    /// Counts of the staged records
    pub fn write(&self, areas: &[ParsedArea]) -> Result<StagingSummary> {
        let mut summary = StagingSummary::new();

        for area in areas {
            let folder = path_component(&area.name);
            if folder.is_empty() {
                warn!("Skipping area with unusable name {:?}", area.name);
                continue;
            }

            let area_dir = self.root.join(folder);
            self.ensure_dir(&area_dir)?;

            let mut staged = StagedArea::from(area);
            if let Some(existing) = self.read_area(&area_dir) {
                staged.id = staged.id.or(existing.id);
            }
            self.write_json(&area_dir.join(METADATA_FILE), &staged)?;
            summary.areas += 1;

            for sector in &area.sectors {
                self.write_sector(&area_dir, staged.id, sector, &mut summary)?;
            }

            debug!("Staged area {} ({} sectors)", area.name, area.sectors.len());
        }

        Ok(summary)
    }

    fn write_sector(
        &self,
        area_dir: &Path,
        area_id: Option<Uuid>,
        sector: &ParsedSector,
        summary: &mut StagingSummary,
    ) -> Result<()> {
        let folder = path_component(&sector.name);
        if folder.is_empty() {
            warn!("Skipping sector with unusable name {:?}", sector.name);
            return Ok(());
        }

        let dir = area_dir.join(folder);
        self.ensure_dir(&dir)?;

        let mut staged = StagedSector::from(sector);
        let existing = self.read_sector(&dir);
        staged.id = staged.id.or(existing.as_ref().and_then(|s| s.id));
        staged.area_id = area_id.or(existing.and_then(|s| s.area_id));
        self.write_json(&dir.join(METADATA_FILE), &staged)?;
        summary.sectors += 1;

        if let Some(image) = sector.image.as_ref().filter(|bytes| !bytes.is_empty()) {
            let path = dir.join(IMAGE_FILE);
            self.retry.run("Write image", || fs::write(&path, image))?;
            summary.images += 1;
        }

        let routes = merge_route_ids(sector, staged.id, &self.read_routes(&dir));
        summary.routes += routes.len() as u64;
        self.write_json(&dir.join(ROUTES_FILE), &routes)
    }

    /// Reads `<dir>/metadata.json` as area metadata
    pub fn read_area(&self, dir: &Path) -> Option<StagedArea> {
        self.read_json(&dir.join(METADATA_FILE))
    }

    /// Reads `<dir>/metadata.json` as sector metadata
    pub fn read_sector(&self, dir: &Path) -> Option<StagedSector> {
        self.read_json(&dir.join(METADATA_FILE))
    }

    /// Reads `<dir>/routes.json`; absent or corrupt files yield no routes
    pub fn read_routes(&self, dir: &Path) -> Vec<StagedRoute> {
        self.read_json(&dir.join(ROUTES_FILE)).unwrap_or_default()
    }

    /// Sub-folders of `dir` in name order
    pub fn child_dirs(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = self.retry.run("List folder", || {
            fs::read_dir(dir)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<_>>>()
        })?;

        let mut dirs: Vec<PathBuf> = entries.into_iter().filter(|p| p.is_dir()).collect();
        dirs.sort();
        Ok(dirs)
    }

    /// Writes a staged file through a temporary file, so a failed write
    /// leaves the previous version in place
    pub fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        self.retry.run("Write staged file", || {
            fs::write(&tmp, &json)?;
            fs::rename(&tmp, path)
        })?;
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        if !path.exists() {
            return None;
        }

        let content = match self.retry.run("Read staged file", || fs::read_to_string(path)) {
            Ok(content) => content,
            Err(e) => {
                warn!("Ignoring unreadable staged file {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring corrupt staged file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        self.retry.run("Create folder", || fs::create_dir_all(dir))?;
        Ok(())
    }
}

/// Graded routes of `sector`, each unidentified one adopting the identity
/// of an existing route with the same name (ignoring case)
fn merge_route_ids(
    sector: &ParsedSector,
    sector_id: Option<Uuid>,
    existing: &[StagedRoute],
) -> Vec<StagedRoute> {
    let mut claimed: HashSet<Uuid> = sector.routes.iter().filter_map(|r| r.id).collect();

    sector
        .graded_routes()
        .into_iter()
        .filter_map(|route| StagedRoute::from_parsed(route, sector_id))
        .map(|mut route| {
            if route.id.is_none() {
                let name = route.name.to_lowercase();
                route.id = existing
                    .iter()
                    .filter_map(|old| old.id.filter(|_| old.name.to_lowercase() == name))
                    .find(|id| !claimed.contains(id));
                if let Some(id) = route.id {
                    claimed.insert(id);
                }
            }
            route
        })
        .collect()
}

impl BatchSink for StagingWriter {
    fn deliver(&mut self, areas: Vec<ParsedArea>) -> Result<()> {
        let summary = self.write(&areas)?;
        info!(
            "Staged {} areas, {} sectors, {} routes",
            summary.areas, summary.sectors, summary.routes
        );
        self.total.absorb(summary);
        Ok(())
    }
}
