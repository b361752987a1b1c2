//! Output module for staging crawl results
//!
//! This module handles:
//! - The staged JSON record formats
//! - Writing parsed batches to the staging folder, keeping identities
//! - Retrying file-system operations that hit contention
//! - The batch delivery interface used by the crawler

pub mod records;
mod retry;
mod staging;
mod traits;

pub use records::{PlaceFields, StagedArea, StagedRoute, StagedSector};
pub use retry::{is_contention, RetryPolicy};
pub use staging::{StagingWriter, IMAGE_FILE, METADATA_FILE, ROUTES_FILE};
pub use traits::{BatchSink, StagingSummary};
