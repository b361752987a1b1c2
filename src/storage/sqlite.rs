//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::model::{ClimbingTypes, Location, Seasons};
use crate::output::PlaceFields;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use crate::storage::{AreaRecord, RouteRecord, SectorRecord};
use crate::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use uuid::Uuid;

/// SQLite record store
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Creates a new SqliteRecordStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteRecordStore)` - Successfully opened/created database
    /// * `Err(HarvestError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn exists(&self, table: &str, id: Uuid) -> StorageResult<bool> {
        let found = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE id = ?1", table),
                params![id.to_string()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn count(&self, table: &str) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        Ok(count as u64)
    }
}

fn coordinates(location: Option<Location>) -> (Option<f64>, Option<f64>) {
    match location {
        Some(l) => (Some(l.latitude), Some(l.longitude)),
        None => (None, None),
    }
}

fn parse_id(value: &str) -> StorageResult<Uuid> {
    Uuid::parse_str(value).map_err(|e| StorageError::InvalidIdentity {
        value: value.to_string(),
        message: e.to_string(),
    })
}

impl RecordStore for SqliteRecordStore {
    fn upsert_area(&mut self, area: &AreaRecord) -> StorageResult<Uuid> {
        let id = area.id.unwrap_or_else(Uuid::new_v4);
        let place = &area.place;
        let (latitude, longitude) = coordinates(place.location);

        self.conn.execute(
            "INSERT INTO areas (id, name, description, tags, climbing, season, latitude, longitude, origin, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                tags = excluded.tags,
                climbing = excluded.climbing,
                season = excluded.season,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                origin = excluded.origin,
                updated_at = excluded.updated_at",
            params![
                id.to_string(),
                place.name,
                place.description,
                place.tags.join(","),
                place.climbing.bits(),
                place.season.bits(),
                latitude,
                longitude,
                place.origin,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(id)
    }

    fn upsert_sector(&mut self, sector: &SectorRecord) -> StorageResult<Uuid> {
        if !self.exists("areas", sector.area_id)? {
            return Err(StorageError::MissingParent {
                kind: "area",
                id: sector.area_id,
            });
        }

        let id = sector.id.unwrap_or_else(Uuid::new_v4);
        let place = &sector.place;
        let (latitude, longitude) = coordinates(place.location);

        self.conn.execute(
            "INSERT INTO sectors (id, area_id, name, description, tags, climbing, season, latitude, longitude, origin, sector_order, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                area_id = excluded.area_id,
                name = excluded.name,
                description = excluded.description,
                tags = excluded.tags,
                climbing = excluded.climbing,
                season = excluded.season,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                origin = excluded.origin,
                sector_order = excluded.sector_order,
                updated_at = excluded.updated_at",
            params![
                id.to_string(),
                sector.area_id.to_string(),
                place.name,
                place.description,
                place.tags.join(","),
                place.climbing.bits(),
                place.season.bits(),
                latitude,
                longitude,
                place.origin,
                sector.order,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(id)
    }

    fn upsert_route(&mut self, route: &RouteRecord) -> StorageResult<Uuid> {
        if !self.exists("sectors", route.sector_id)? {
            return Err(StorageError::MissingParent {
                kind: "sector",
                id: route.sector_id,
            });
        }

        let id = route.id.unwrap_or_else(Uuid::new_v4);

        self.conn.execute(
            "INSERT INTO routes (id, sector_id, name, description, grade, route_order, climbing, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                sector_id = excluded.sector_id,
                name = excluded.name,
                description = excluded.description,
                grade = excluded.grade,
                route_order = excluded.route_order,
                climbing = excluded.climbing,
                updated_at = excluded.updated_at",
            params![
                id.to_string(),
                route.sector_id.to_string(),
                route.name,
                route.description,
                route.grade.value(),
                route.order,
                route.climbing.bits(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(id)
    }

    fn get_area(&self, id: Uuid) -> StorageResult<Option<AreaRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, tags, climbing, season, latitude, longitude, origin
             FROM areas WHERE id = ?1",
        )?;

        let row = stmt
            .query_row(params![id.to_string()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    PlaceFields {
                        name: row.get(1)?,
                        description: row.get(2)?,
                        tags: row
                            .get::<_, String>(3)?
                            .split(',')
                            .filter(|t| !t.is_empty())
                            .map(str::to_string)
                            .collect(),
                        climbing: ClimbingTypes::from_bits(row.get(4)?),
                        season: Seasons::from_bits(row.get(5)?),
                        location: match (row.get::<_, Option<f64>>(6)?, row.get::<_, Option<f64>>(7)?) {
                            (Some(latitude), Some(longitude)) => Location::new(latitude, longitude),
                            _ => None,
                        },
                        origin: row.get(8)?,
                    },
                ))
            })
            .optional()?;

        match row {
            Some((id, place)) => Ok(Some(AreaRecord {
                id: Some(parse_id(&id)?),
                place,
            })),
            None => Ok(None),
        }
    }

    fn count_areas(&self) -> StorageResult<u64> {
        self.count("areas")
    }

    fn count_sectors(&self) -> StorageResult<u64> {
        self.count("sectors")
    }

    fn count_routes(&self) -> StorageResult<u64> {
        self.count("routes")
    }
}
