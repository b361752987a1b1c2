//! Staging folder ingest
//!
//! Walks `<root>/<Area>/<Sector>` in name order and upserts every staged
//! record into a [`RecordStore`]. Identities handed out by the store are
//! written back to the staged files, which are otherwise left untouched.

use crate::extract::normalize_name;
use crate::output::{StagedSector, StagingWriter, IMAGE_FILE, METADATA_FILE, ROUTES_FILE};
use crate::storage::{AreaRecord, RecordStore, RouteRecord, SectorRecord};
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Counts of records pushed to the store by one ingest pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub areas: u64,
    pub sectors: u64,
    pub routes: u64,
    pub images: u64,
    /// Staged files rewritten with new identities
    pub rewritten: u64,
}

pub struct IngestDumper {
    staging: StagingWriter,
    images_dir: Option<PathBuf>,
    default_origin: String,
}

impl IngestDumper {
    /// Creates a dumper over a staging folder
    ///
    /// # Arguments
    ///
    /// * `staging` - Reader/writer of the staging folder
    /// * `images_dir` - Where sector images are copied, if anywhere
    /// * `default_origin` - Origin for staged records without a usable one
    pub fn new(
        staging: StagingWriter,
        images_dir: Option<PathBuf>,
        default_origin: impl Into<String>,
    ) -> Self {
        Self {
            staging,
            images_dir,
            default_origin: default_origin.into(),
        }
    }

    /// Ingests every staged area
    pub fn dump_all(&self, store: &mut dyn RecordStore) -> Result<IngestSummary> {
        let mut summary = IngestSummary::default();
        let root = self.staging.root();

        if !root.is_dir() {
            warn!("Staging folder {} does not exist", root.display());
            return Ok(summary);
        }

        info!("Ingesting staged records from {}", root.display());
        for area_dir in self.staging.child_dirs(root)? {
            self.dump_area(store, &area_dir, &mut summary)?;
        }

        info!(
            "Ingested {} areas, {} sectors, {} routes ({} files updated)",
            summary.areas, summary.sectors, summary.routes, summary.rewritten
        );
        Ok(summary)
    }

    fn dump_area(
        &self,
        store: &mut dyn RecordStore,
        dir: &Path,
        summary: &mut IngestSummary,
    ) -> Result<()> {
        let Some(mut staged) = self.staging.read_area(dir) else {
            warn!("No usable area metadata in {}", dir.display());
            return Ok(());
        };

        let place = staged.fields(&self.default_origin);
        let area_tags = place.tags.clone();
        let id = store.upsert_area(&AreaRecord {
            id: staged.id,
            place,
        })?;
        summary.areas += 1;

        if staged.id != Some(id) {
            staged.id = Some(id);
            self.staging.write_json(&dir.join(METADATA_FILE), &staged)?;
            summary.rewritten += 1;
        }

        debug!("Area {} -> {}", staged.name, id);

        let mut order = 0;
        for sector_dir in self.staging.child_dirs(dir)? {
            let Some(sector) = self.staging.read_sector(&sector_dir) else {
                warn!("No usable sector metadata in {}", sector_dir.display());
                continue;
            };
            order += 1;
            self.dump_sector(store, id, &area_tags, order, sector, &sector_dir, summary)?;
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn dump_sector(
        &self,
        store: &mut dyn RecordStore,
        area_id: Uuid,
        area_tags: &[String],
        order: u32,
        mut staged: StagedSector,
        dir: &Path,
        summary: &mut IngestSummary,
    ) -> Result<()> {
        let mut place = staged.fields(&self.default_origin);
        if place.tags.is_empty() {
            place.tags = area_tags.to_vec();
        }

        let is_new = staged.id.is_none();
        let id = store.upsert_sector(&SectorRecord {
            id: staged.id,
            area_id,
            place,
            order,
        })?;
        summary.sectors += 1;

        if staged.id != Some(id) || staged.area_id != Some(area_id) {
            staged.id = Some(id);
            staged.area_id = Some(area_id);
            staged.order = order;
            self.staging.write_json(&dir.join(METADATA_FILE), &staged)?;
            summary.rewritten += 1;
        }

        self.dump_routes(store, id, is_new, dir, summary)?;
        self.copy_image(id, dir, summary)
    }

    fn dump_routes(
        &self,
        store: &mut dyn RecordStore,
        sector_id: Uuid,
        is_new_sector: bool,
        dir: &Path,
        summary: &mut IngestSummary,
    ) -> Result<()> {
        let mut routes = self.staging.read_routes(dir);
        if routes.is_empty() {
            return Ok(());
        }

        let mut changed = is_new_sector;
        for (index, route) in routes.iter_mut().enumerate() {
            changed |= route.id.is_none() || route.sector_id != Some(sector_id);
            route.order = index as u32 + 1;
            route.sector_id = Some(sector_id);

            let name = normalize_name(&route.name, false);
            let id = store.upsert_route(&RouteRecord {
                id: route.id,
                sector_id,
                name: if name.is_empty() { route.name.trim().to_string() } else { name },
                description: route.description.trim().to_string(),
                grade: route.grade(),
                order: route.order,
                climbing: route.climbing(),
            })?;
            route.id = Some(id);
            summary.routes += 1;
        }

        if changed {
            self.staging.write_json(&dir.join(ROUTES_FILE), &routes)?;
            summary.rewritten += 1;
        }
        Ok(())
    }

    /// Copies `<dir>/image.jpg` to `<images>/<sector id>/image.jpg`
    fn copy_image(&self, sector_id: Uuid, dir: &Path, summary: &mut IngestSummary) -> Result<()> {
        let Some(images_dir) = &self.images_dir else {
            return Ok(());
        };

        let source = dir.join(IMAGE_FILE);
        if !source.is_file() {
            return Ok(());
        }

        let target_dir = images_dir.join(sector_id.to_string());
        let target = target_dir.join(IMAGE_FILE);
        let retry = self.staging.retry();
        retry.run("Create image folder", || fs::create_dir_all(&target_dir))?;
        retry.run("Copy image", || fs::copy(&source, &target))?;
        summary.images += 1;
        Ok(())
    }
}
