//! Page metadata ("wiki" info) extraction

use crate::extract::normalize::{fix_punctuation, normalize_name};
use crate::model::{ClimbingTypes, Location, Seasons};
use once_cell::sync::Lazy;
use regex::Regex;

static PAGE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<h2>([^>]+)</h2>").unwrap());
static DESCRIPTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<td[^>]+>\s*<!--[^>]+Description[^>]+-->([^<]+)</td>").unwrap()
});
static COORDINATES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<td[^>]+>(-?\d+(\.\d+)?),\s*(-?\d+(\.\d+)?)</td>").unwrap()
});
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9]+)").unwrap());
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]+").unwrap());

/// Metadata found on a single page
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WikiInfo {
    pub name: String,
    pub description: String,
    pub location: Option<Location>,
    pub climbing: ClimbingTypes,
    pub season: Seasons,
}

impl WikiInfo {
    /// Extracts page metadata
    ///
    /// Returns `None` when the page has no usable name.
    pub fn parse(content: &str) -> Option<Self> {
        let raw_name = PAGE_NAME.captures(content)?.get(1)?.as_str();
        let name = normalize_name(raw_name.trim(), true);
        if name.is_empty() {
            return None;
        }

        let mut description = DescriptionBuilder::default();
        if let Some(caps) = DESCRIPTION.captures(content) {
            description.start(&fix_punctuation(&caps[1]));
        }

        let nearest = field_value(content, "Nearest town or city");
        let directions = prefixed(
            &nearest,
            |town| format!("The nearest town or city is {}. ", town.trim_end_matches('.')),
            field_value(content, "Directions"),
        );
        description.section("Directions", &directions);

        let approach_time = approach_time(&field_value(content, "Approach Time"));
        let approach = prefixed(
            &approach_time,
            |time| format!("The approach time is {}. ", time.trim_end_matches('.').trim()),
            field_value(content, "Approach"),
        );
        description.section("Approach", &approach);

        description.section("Access issues", &field_value(content, "Access issues"));

        let mut climbing = parse_flags(&field_value(content, "Type of Climbing"), ClimbingTypes::from_name);
        if climbing.is_empty() {
            climbing = ClimbingTypes::SPORT;
        }

        Some(Self {
            name,
            description: description.finish(),
            location: parse_location(content),
            climbing,
            season: parse_flags(&field_value(content, "When to Climb"), Seasons::from_name),
        })
    }
}

/// Accumulates the composite description
#[derive(Default)]
struct DescriptionBuilder {
    text: String,
    has_general: bool,
}

impl DescriptionBuilder {
    fn start(&mut self, text: &str) {
        self.text.push_str(text);
        self.has_general = !self.text.is_empty();
    }

    fn section(&mut self, title: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        if self.has_general {
            self.text.push_str(&format!("### {}\n", title));
        }
        self.text.push_str(value);
        self.has_general = true;
    }

    fn finish(self) -> String {
        self.text
    }
}

/// Captures the table cell that follows a bold field label
pub fn field_value(content: &str, label: &str) -> String {
    let pattern = format!(
        r"(?is){}:\s*</strong>\s*</td>\s*<td[^>]+>([^<]+)</td>",
        regex::escape(label)
    );
    match Regex::new(&pattern) {
        Ok(re) => re
            .captures(content)
            .map(|caps| fix_punctuation(&caps[1]))
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

fn prefixed(prefix: &str, sentence: impl Fn(&str) -> String, value: String) -> String {
    if prefix.is_empty() {
        value
    } else {
        format!("{}{}", sentence(prefix.trim()), value)
    }
}

/// Spaces out numbers ("20min" -> "20 min"); keeps only values with a unit
fn approach_time(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let spaced = DIGITS.replace_all(raw, " $1 ");
    let spaced = SPACES.replace_all(spaced.trim(), " ").trim().to_string();
    if LETTERS.is_match(&spaced) {
        spaced
    } else {
        String::new()
    }
}

fn parse_location(content: &str) -> Option<Location> {
    let caps = COORDINATES.captures(content)?;
    let latitude = caps[1].parse::<f64>().ok()?;
    let longitude = caps[3].parse::<f64>().unwrap_or_default();
    Location::new(latitude, longitude)
}

/// OR-combines every token that names a flag; unknown tokens are ignored
fn parse_flags<T, F>(value: &str, from_name: F) -> T
where
    T: Default + std::ops::BitOrAssign,
    F: Fn(&str) -> Option<T>,
{
    let mut flags = T::default();
    for token in value.split(|c| c == ' ' || c == '\n' || c == '/') {
        let token = token.trim().trim_matches(&[',', '.', ';'][..]).trim();
        if let Some(flag) = from_name(token) {
            flags |= flag;
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(label: &str, value: &str) -> String {
        format!(
            "<tr><td class=\"l\"><strong>{}:</strong></td>\n<td class=\"v\">{}</td></tr>",
            label, value
        )
    }

    fn page(fields: &[(&str, &str)]) -> String {
        let mut html = String::from(
            "<html><h2>siurana</h2><table><tr>\
             <td class=\"d\"><!-- Begin Description -->world class limestone</td></tr>",
        );
        for (label, value) in fields {
            html.push_str(&field(label, value));
        }
        html.push_str("<tr><td class=\"geo\">41.2579, 0.9322</td></tr></table></html>");
        html
    }

    #[test]
    fn test_parse_basic_fields() {
        let info = WikiInfo::parse(&page(&[
            ("Type of Climbing", "Sport/Trad"),
            ("When to Climb", "Autumn, Winter and Spring."),
        ]))
        .unwrap();

        assert_eq!(info.name, "Siurana");
        assert_eq!(info.description, "World class limestone.");
        assert_eq!(info.climbing, ClimbingTypes::SPORT | ClimbingTypes::TRAD);
        assert_eq!(
            info.season,
            Seasons::AUTUMN | Seasons::WINTER | Seasons::SPRING
        );
        let location = info.location.unwrap();
        assert_eq!(location.latitude, 41.2579);
        assert_eq!(location.longitude, 0.9322);
    }

    #[test]
    fn test_description_sections() {
        let info = WikiInfo::parse(&page(&[
            ("Nearest town or city", "Cornudella"),
            ("Directions", "drive up the hill"),
            ("Approach Time", "10min"),
            ("Approach", "walk along the ridge"),
        ]))
        .unwrap();

        assert_eq!(
            info.description,
            "World class limestone.\n\
             ### Directions\n\
             The nearest town or city is Cornudella. Drive up the hill.\n\
             ### Approach\n\
             The approach time is 10 min. Walk along the ridge."
        );
    }

    #[test]
    fn test_climbing_defaults_to_sport() {
        let info = WikiInfo::parse(&page(&[("Type of Climbing", "unknown")])).unwrap();
        assert_eq!(info.climbing, ClimbingTypes::SPORT);
        assert!(info.season.is_empty());
    }

    #[test]
    fn test_out_of_range_latitude_is_dropped() {
        let html = "<h2>Somewhere</h2><td class=\"geo\">95.5, 10.1</td>";
        let info = WikiInfo::parse(html).unwrap();
        assert!(info.location.is_none());
    }

    #[test]
    fn test_missing_name_yields_none() {
        assert!(WikiInfo::parse("<html><p>no heading</p></html>").is_none());
        assert!(WikiInfo::parse("<h2>12.</h2>").is_none());
    }
}
