//! Parsed records produced by a crawl
//!
//! These are the flat outputs of the metadata accumulator. Identities stay
//! `None` until the staging writer reattaches one already on disk.

use crate::model::{ClimbingTypes, Location, RouteGrade, Seasons};
use uuid::Uuid;

/// A route extracted from a sector's route table
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRoute {
    pub id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub grade: Option<RouteGrade>,
    /// 1-based position across all pages of the route table
    pub order: u32,
    pub climbing: ClimbingTypes,
}

/// A sector: one page of the area tree that owns routes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedSector {
    pub id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub climbing: ClimbingTypes,
    pub season: Seasons,
    pub location: Option<Location>,
    pub origin: String,
    pub order: u32,
    pub routes: Vec<ParsedRoute>,
    pub image: Option<Vec<u8>>,
}

/// An area grouping the sectors found under one listing entry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedArea {
    pub id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub climbing: ClimbingTypes,
    pub season: Seasons,
    pub location: Option<Location>,
    pub origin: String,
    pub sectors: Vec<ParsedSector>,
}

impl ParsedSector {
    /// Routes that carry a grade, in table order
    pub fn graded_routes(&self) -> Vec<&ParsedRoute> {
        let mut routes: Vec<&ParsedRoute> =
            self.routes.iter().filter(|r| r.grade.is_some()).collect();
        routes.sort_by_key(|r| r.order);
        routes
    }
}

impl ParsedArea {
    pub fn route_count(&self) -> usize {
        self.sectors.iter().map(|s| s.routes.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(name: &str, order: u32, grade: Option<f64>) -> ParsedRoute {
        ParsedRoute {
            id: None,
            name: name.to_string(),
            description: String::new(),
            grade: grade.map(RouteGrade::new),
            order,
            climbing: ClimbingTypes::SPORT,
        }
    }

    #[test]
    fn test_graded_routes_filters_and_orders() {
        let sector = ParsedSector {
            routes: vec![
                route("Third", 3, Some(511.1)),
                route("Ungraded", 2, None),
                route("First", 1, Some(57.0)),
            ],
            ..Default::default()
        };

        let names: Vec<&str> = sector.graded_routes().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Third"]);
    }
}
