//! Route table extraction
//!
//! Route tables are laid out in rows of five cells: the route link sits in
//! the third cell and the grade in the fourth. Long tables continue on
//! `...more2.html`, `...more3.html` pages.

use crate::crawler::PageSource;
use crate::extract::normalize::{fix_punctuation, normalize_name};
use crate::model::{ParsedRoute, RouteGrade};
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

const CELLS_PER_ROW: usize = 5;

static ROUTES_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<h3[^>]+>Routes</h3>").unwrap());
static ROUTES_TABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<table[^>]+class="ftable">"#).unwrap());
static TABLE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</table>").unwrap());
static CELL_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<td").unwrap());
static CELL_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</td>").unwrap());
static ROUTE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<a\s+href="([^"]+)">([^<]+)</a>"#).unwrap());
static CELL_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r">([^<]+)").unwrap());
static ROUTE_DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<span\s+class="description">([^<]+)</span>"#).unwrap());

/// A graded row of the route table, before its detail page is read
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRow {
    pub name: String,
    pub detail_url: String,
    pub grade: RouteGrade,
}

/// Returns the body of the route table, if the page has one
fn route_table(content: &str) -> Option<&str> {
    let heading = ROUTES_HEADING.find(content)?;
    let rest = &content[heading.end()..];
    let table = ROUTES_TABLE.find(rest)?;
    let rest = &rest[table.start()..];
    let end = TABLE_END.find(rest)?;
    Some(&rest[..end.start()])
}

/// Text of a cell from its opening tag up to the next `</td>`
fn cell_at(table: &str, start: usize) -> &str {
    let rest = &table[start..];
    match CELL_END.find(rest) {
        Some(end) => &rest[..end.start()],
        None => "",
    }
}

/// Reads the route rows of one page
///
/// Only rows with both a non-empty normalized name and a parseable grade
/// are returned.
pub fn parse_route_rows(content: &str) -> Vec<RouteRow> {
    let Some(table) = route_table(content) else {
        return Vec::new();
    };

    let cells: Vec<usize> = CELL_START.find_iter(table).map(|m| m.start()).collect();
    let mut rows = Vec::new();

    for row in cells.chunks(CELLS_PER_ROW) {
        if row.len() < 4 {
            break;
        }

        let Some(link) = ROUTE_LINK.captures(cell_at(table, row[2])) else {
            continue;
        };
        let name = normalize_name(link[2].trim(), false);
        if name.is_empty() {
            continue;
        }

        let grade = CELL_TEXT
            .captures(cell_at(table, row[3]))
            .and_then(|caps| RouteGrade::parse(caps[1].trim()));

        if let Some(grade) = grade {
            rows.push(RouteRow {
                name,
                detail_url: link[1].trim().to_string(),
                grade,
            });
        }
    }

    rows
}

/// Finds the link to the given continuation page
pub fn next_page_url(content: &str, page: u32) -> Option<String> {
    let pattern = format!(r#"(?i)href="([^"]+more{}\.html)""#, page);
    Regex::new(&pattern)
        .ok()?
        .captures(content)
        .map(|caps| caps[1].trim().to_string())
}

/// Extracts the description span of a route detail page
pub fn parse_route_description(content: &str) -> String {
    ROUTE_DESCRIPTION
        .captures(content)
        .map(|caps| fix_punctuation(&caps[1]))
        .unwrap_or_default()
}

/// Reads a sector's routes, following continuation pages
///
/// Each route's detail page is fetched for its description. Orders are
/// 1-based and continue across pages.
pub async fn parse_routes<S>(source: &mut S, content: &str) -> Result<Vec<ParsedRoute>>
where
    S: PageSource + ?Sized,
{
    let mut routes = Vec::new();
    let mut visited = HashSet::new();
    let mut page_text = content.to_string();
    let mut page = 1;
    let mut order = 1;

    loop {
        for row in parse_route_rows(&page_text) {
            let description = if row.detail_url.is_empty() {
                String::new()
            } else {
                parse_route_description(&source.fetch_text(&row.detail_url).await?)
            };

            routes.push(ParsedRoute {
                id: None,
                name: row.name,
                description,
                climbing: row.grade.parsed_climbing(),
                grade: Some(row.grade),
                order,
            });
            order += 1;
        }

        match next_page_url(&page_text, page + 1) {
            Some(url) if visited.insert(url.clone()) => {
                debug!("Route table continues on {}", url);
                page_text = source.fetch_text(&url).await?;
                page += 1;
            }
            _ => break,
        }
    }

    Ok(routes)
}
