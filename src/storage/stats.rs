//! Statistics over the staging folder and the record store
//!
//! This module provides functionality for counting staged and stored
//! records and displaying the result.

use crate::output::StagingWriter;
use crate::storage::RecordStore;
use crate::Result;

/// Record counts on both sides of the ingest pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestStatistics {
    /// Staged area folders with readable metadata
    pub staged_areas: u64,

    /// Staged sector folders with readable metadata
    pub staged_sectors: u64,

    /// Entries across all staged route lists
    pub staged_routes: u64,

    /// Staged records of any kind still waiting for an identity
    pub pending: u64,

    /// Stored counts, when a store was given
    pub stored_areas: Option<u64>,
    pub stored_sectors: Option<u64>,
    pub stored_routes: Option<u64>,
}

/// Counts staged records and, optionally, stored ones
///
/// # Arguments
///
/// * `staging` - The staging folder to scan
/// * `store` - The record store to query, if one is available
///
/// # Returns
///
/// * `Ok(HarvestStatistics)` - Successfully collected statistics
/// * `Err(HarvestError)` - Failed to list the staging folder or query the store
pub fn load_statistics(
    staging: &StagingWriter,
    store: Option<&dyn RecordStore>,
) -> Result<HarvestStatistics> {
    let mut stats = HarvestStatistics::default();

    for area_dir in staging.child_dirs(staging.root())? {
        let Some(area) = staging.read_area(&area_dir) else {
            continue;
        };
        stats.staged_areas += 1;
        stats.pending += u64::from(area.id.is_none());

        for sector_dir in staging.child_dirs(&area_dir)? {
            let Some(sector) = staging.read_sector(&sector_dir) else {
                continue;
            };
            stats.staged_sectors += 1;
            stats.pending += u64::from(sector.id.is_none());

            let routes = staging.read_routes(&sector_dir);
            stats.staged_routes += routes.len() as u64;
            stats.pending += routes.iter().filter(|r| r.id.is_none()).count() as u64;
        }
    }

    if let Some(store) = store {
        stats.stored_areas = Some(store.count_areas()?);
        stats.stored_sectors = Some(store.count_sectors()?);
        stats.stored_routes = Some(store.count_routes()?);
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Staged:");
    println!("  Areas: {}", stats.staged_areas);
    println!("  Sectors: {}", stats.staged_sectors);
    println!("  Routes: {}", stats.staged_routes);
    println!("  Without identity: {}", stats.pending);
    println!();

    if let (Some(areas), Some(sectors), Some(routes)) =
        (stats.stored_areas, stats.stored_sectors, stats.stored_routes)
    {
        println!("Stored:");
        println!("  Areas: {}", areas);
        println!("  Sectors: {}", sectors);
        println!("  Routes: {}", routes);
        println!();
    }

    let staged = stats.staged_areas + stats.staged_sectors + stats.staged_routes;
    let ingested = if staged > 0 {
        ((staged - stats.pending.min(staged)) as f64 / staged as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Ingested: {:.1}% ({} / {} staged records have an identity)",
        ingested,
        staged - stats.pending.min(staged),
        staged
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ParsedArea, ParsedRoute, ParsedSector, RouteGrade};
    use crate::output::RetryPolicy;
    use crate::storage::{IngestDumper, SqliteRecordStore};
    use crate::ClimbingTypes;
    use std::time::Duration;
    use tempfile::TempDir;

    fn staged(dir: &TempDir) -> StagingWriter {
        let writer = StagingWriter::new(dir.path(), RetryPolicy::new(2, Duration::from_millis(1)));
        let area = ParsedArea {
            name: "Margalef".to_string(),
            sectors: vec![ParsedSector {
                name: "Raco de la Finestra".to_string(),
                routes: vec![ParsedRoute {
                    id: None,
                    name: "Kaja".to_string(),
                    description: String::new(),
                    grade: RouteGrade::parse("8a"),
                    order: 1,
                    climbing: ClimbingTypes::SPORT,
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        writer.write(&[area]).unwrap();
        writer
    }

    #[test]
    fn test_counts_staged_records() {
        let dir = TempDir::new().unwrap();
        let writer = staged(&dir);

        let stats = load_statistics(&writer, None).unwrap();
        assert_eq!(stats.staged_areas, 1);
        assert_eq!(stats.staged_sectors, 1);
        assert_eq!(stats.staged_routes, 1);
        assert_eq!(stats.pending, 3);
        assert!(stats.stored_areas.is_none());
    }

    #[test]
    fn test_counts_after_ingest() {
        let dir = TempDir::new().unwrap();
        let writer = staged(&dir);
        let mut store = SqliteRecordStore::new_in_memory().unwrap();
        IngestDumper::new(writer.clone(), None, "http://www.example.com/")
            .dump_all(&mut store)
            .unwrap();

        let stats = load_statistics(&writer, Some(&store)).unwrap();
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.stored_routes, Some(1));
    }
}
