//! Staged record formats
//!
//! Staged files are JSON documents. Tags are stored comma-joined, flag
//! sets as plain integers and locations as `"lat,long"`.

use crate::extract::{format_tag, normalize_name};
use crate::model::{ClimbingTypes, Location, ParsedArea, ParsedRoute, ParsedSector, RouteGrade, Seasons};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A "via <url>" credit left in a hand-edited description
static VIA_ORIGIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bvia\s+(https?://\S+)").unwrap());

/// Area metadata (`<Area>/metadata.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StagedArea {
    pub id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub tags: String,
    pub climbing: u32,
    pub season: u32,
    pub location: String,
    pub origin: String,
}

/// Sector metadata (`<Area>/<Sector>/metadata.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StagedSector {
    pub id: Option<Uuid>,
    pub area_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub tags: String,
    pub climbing: u32,
    pub season: u32,
    pub location: String,
    pub origin: String,
    pub order: u32,
}

/// One entry of `<Area>/<Sector>/routes.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StagedRoute {
    pub id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    /// Raw numeric grade
    pub grade: f64,
    pub order: u32,
    pub climbing: u32,
}

pub fn join_tags(tags: &[String]) -> String {
    tags.join(",")
}

/// Splits a comma-joined tag list, re-slugging each entry
pub fn split_tags(tags: &str) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for tag in tags.split(',').map(format_tag) {
        if !tag.is_empty() && !result.contains(&tag) {
            result.push(tag);
        }
    }
    result
}

fn location_string(location: Option<Location>) -> String {
    location.map(|l| l.to_string()).unwrap_or_default()
}

impl From<&ParsedArea> for StagedArea {
    fn from(area: &ParsedArea) -> Self {
        Self {
            id: area.id,
            name: area.name.clone(),
            description: area.description.clone(),
            tags: join_tags(&area.tags),
            climbing: area.climbing.bits(),
            season: area.season.bits(),
            location: location_string(area.location),
            origin: area.origin.clone(),
        }
    }
}

impl From<&ParsedSector> for StagedSector {
    fn from(sector: &ParsedSector) -> Self {
        Self {
            id: sector.id,
            area_id: None,
            name: sector.name.clone(),
            description: sector.description.clone(),
            tags: join_tags(&sector.tags),
            climbing: sector.climbing.bits(),
            season: sector.season.bits(),
            location: location_string(sector.location),
            origin: sector.origin.clone(),
            order: sector.order,
        }
    }
}

impl StagedRoute {
    /// Stages a route; `None` for routes without a grade
    pub fn from_parsed(route: &ParsedRoute, sector_id: Option<Uuid>) -> Option<Self> {
        let grade = route.grade?;
        Some(Self {
            id: route.id,
            sector_id,
            name: route.name.clone(),
            description: route.description.clone(),
            grade: grade.value(),
            order: route.order,
            climbing: route.climbing.bits(),
        })
    }

    pub fn grade(&self) -> RouteGrade {
        RouteGrade::new(self.grade)
    }

    pub fn climbing(&self) -> ClimbingTypes {
        ClimbingTypes::from_bits(self.climbing)
    }
}

/// Fields shared by staged areas and sectors, cleaned for ingest
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceFields {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub climbing: ClimbingTypes,
    pub season: Seasons,
    pub location: Option<Location>,
    pub origin: String,
}

impl PlaceFields {
    /// Normalizes hand-editable staged values
    ///
    /// `default_origin` replaces an origin that is not an http(s) URL. A
    /// "via <url>" credit in the description overrides the origin and is
    /// removed from the description.
    #[allow(clippy::too_many_arguments)]
    fn clean(
        name: &str,
        description: &str,
        tags: &str,
        climbing: u32,
        season: u32,
        location: &str,
        origin: &str,
        default_origin: &str,
    ) -> Self {
        let normalized = normalize_name(name, true);
        let mut description = description.trim().to_string();
        let mut origin = origin.trim().to_string();
        if !origin.to_ascii_lowercase().starts_with("http") {
            origin = default_origin.to_string();
        }

        let via = VIA_ORIGIN
            .captures(&description)
            .and_then(|c| Some((c.get(0)?.range(), c.get(1)?.as_str().to_string())));
        if let Some((range, url)) = via {
            origin = url;
            description.replace_range(range, "");
            description = description.trim().to_string();
        }

        Self {
            name: if normalized.is_empty() { name.trim().to_string() } else { normalized },
            description,
            tags: split_tags(tags),
            climbing: ClimbingTypes::from_bits(climbing),
            season: Seasons::from_bits(season),
            location: Location::parse(location),
            origin,
        }
    }
}

impl StagedArea {
    pub fn fields(&self, default_origin: &str) -> PlaceFields {
        PlaceFields::clean(
            &self.name,
            &self.description,
            &self.tags,
            self.climbing,
            self.season,
            &self.location,
            &self.origin,
            default_origin,
        )
    }
}

impl StagedSector {
    pub fn fields(&self, default_origin: &str) -> PlaceFields {
        PlaceFields::clean(
            &self.name,
            &self.description,
            &self.tags,
            self.climbing,
            self.season,
            &self.location,
            &self.origin,
            default_origin,
        )
    }
}
