//! Category listing extraction

use crate::extract::normalize::normalize_name;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static LIST_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<dt>[^<]+<a\s+href="([^"]+)">([^<]+)</a>([^<]+)</dt>"#).unwrap()
});

/// One row of a category listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub name: String,
    pub url: String,
    /// Number of records under the entry; zero means "do not descend"
    pub total: u32,
}

impl ListItem {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Extracts every listing row from a page
///
/// Rows with an empty normalized name or an unreadable count are dropped.
pub fn parse_listing(content: &str) -> Vec<ListItem> {
    LIST_ITEM
        .captures_iter(content)
        .filter_map(|caps| {
            let name = normalize_name(caps[2].trim(), true);
            if name.is_empty() {
                return None;
            }
            let total = caps[3]
                .trim()
                .trim_matches(&['(', ')'][..])
                .trim()
                .parse::<u32>()
                .ok()?;
            Some(ListItem {
                name,
                url: caps[1].trim().to_string(),
                total,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_rows() {
        let html = r#"
            <dl>
            <dt> <a href="Europe/Spain/">spain</a> (1520)</dt>
            <dt> <a href="Europe/France/">france</a> (0)</dt>
            <dt> <a href="Europe/Nowhere/">12.</a> (4)</dt>
            <dt> <a href="Europe/Broken/">broken</a> (many)</dt>
            </dl>
        "#;

        let items = parse_listing(html);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Spain");
        assert_eq!(items[0].url, "Europe/Spain/");
        assert_eq!(items[0].total, 1520);
        assert!(items[1].is_empty());
    }

    #[test]
    fn test_parse_listing_without_rows() {
        assert!(parse_listing("<html><body>nothing here</body></html>").is_empty());
    }
}
