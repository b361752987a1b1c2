//! Storage traits and error types
//!
//! This module defines the trait interface for the primary record store
//! and associated error types.

use crate::storage::{AreaRecord, RouteRecord, SectorRecord};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid identity {value:?}: {message}")]
    InvalidIdentity { value: String, message: String },

    #[error("Unknown {kind} {id}")]
    MissingParent { kind: &'static str, id: Uuid },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for primary store implementations
///
/// Every upsert returns the identity of the stored record. A record without
/// an identity is inserted under a newly minted one; a record with an
/// identity replaces the stored row, or is inserted under that identity.
pub trait RecordStore {
    /// Inserts or updates an area
    ///
    /// # Arguments
    ///
    /// * `area` - The cleaned area record
    ///
    /// # Returns
    ///
    /// The identity of the stored area
    fn upsert_area(&mut self, area: &AreaRecord) -> StorageResult<Uuid>;

    /// Inserts or updates a sector
    ///
    /// # Arguments
    ///
    /// * `sector` - The cleaned sector record; its area must already be stored
    fn upsert_sector(&mut self, sector: &SectorRecord) -> StorageResult<Uuid>;

    /// Inserts or updates a route
    ///
    /// # Arguments
    ///
    /// * `route` - The route record; its sector must already be stored
    fn upsert_route(&mut self, route: &RouteRecord) -> StorageResult<Uuid>;

    /// Gets an area by identity
    fn get_area(&self, id: Uuid) -> StorageResult<Option<AreaRecord>>;

    /// Counts stored areas
    fn count_areas(&self) -> StorageResult<u64>;

    /// Counts stored sectors
    fn count_sectors(&self) -> StorageResult<u64>;

    /// Counts stored routes
    fn count_routes(&self) -> StorageResult<u64>;
}
