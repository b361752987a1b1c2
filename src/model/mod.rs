//! Domain model shared by extraction, accumulation, staging and ingest

mod grade;
mod place;
mod records;

pub use grade::{DifficultyLevel, GradeSystem, RouteGrade};
pub use place::{ClimbingTypes, Location, Seasons};
pub use records::{ParsedArea, ParsedRoute, ParsedSector};
