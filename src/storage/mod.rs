//! Storage module for the primary record store
//!
//! This module handles:
//! - SQLite database initialization and schema management
//! - Area, sector and route upserts keyed by identity
//! - Ingesting the staging folder into the store
//! - Staged and stored record statistics

mod ingest;
mod schema;
mod sqlite;
pub mod stats;
mod traits;

pub use ingest::{IngestDumper, IngestSummary};
pub use sqlite::SqliteRecordStore;
pub use stats::{load_statistics, print_statistics, HarvestStatistics};
pub use traits::{RecordStore, StorageError, StorageResult};

use crate::model::{ClimbingTypes, RouteGrade};
use crate::output::PlaceFields;
use crate::Result;
use std::path::Path;
use uuid::Uuid;

/// Initializes or opens the record store
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteRecordStore)` - Successfully initialized store
/// * `Err(HarvestError)` - Failed to initialize store
pub fn open_store(path: &Path) -> Result<SqliteRecordStore> {
    SqliteRecordStore::new(path)
}

/// An area as handed to the store
#[derive(Debug, Clone, PartialEq)]
pub struct AreaRecord {
    pub id: Option<Uuid>,
    pub place: PlaceFields,
}

/// A sector as handed to the store
#[derive(Debug, Clone, PartialEq)]
pub struct SectorRecord {
    pub id: Option<Uuid>,
    pub area_id: Uuid,
    pub place: PlaceFields,
    pub order: u32,
}

/// A route as handed to the store
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRecord {
    pub id: Option<Uuid>,
    pub sector_id: Uuid,
    pub name: String,
    pub description: String,
    pub grade: RouteGrade,
    pub order: u32,
    pub climbing: ClimbingTypes,
}
