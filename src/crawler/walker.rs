//! Page tree walking
//!
//! Starting at an area's page, every sub-listing entry with a nonzero
//! record count is followed, depth first, into an arena [`WikiTree`].

use crate::crawler::PageSource;
use crate::extract::{parse_listing, parse_routes, WikiInfo};
use crate::tree::{NodeId, WikiNode, WikiTree};
use crate::Result;
use std::collections::HashSet;
use tracing::debug;

/// Shortens a listing URL for log output
///
/// `http://host/routes/Europe/Spain_North/` becomes `Europe -> Spain North`.
pub fn prettify(url: &str) -> String {
    const PREFIX: &str = "routes/";
    let lower = url.to_ascii_lowercase();
    match lower.find(PREFIX) {
        Some(index) if index > 0 => {
            let path = url[index + PREFIX.len()..]
                .replace('/', " -> ")
                .replace('_', " ");
            path.split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .trim_end_matches(&['-', '>', ' '][..])
                .trim()
                .to_string()
        }
        _ => url.to_string(),
    }
}

/// Walks the page tree rooted at `url`
///
/// Returns `None` when the root page is empty or missing. Links already
/// visited in this walk are not followed again.
pub async fn walk_tree<S>(source: &mut S, url: &str) -> Result<Option<WikiTree>>
where
    S: PageSource + ?Sized,
{
    let mut tree = WikiTree::new();
    let mut visited = HashSet::new();
    let mut stack: Vec<(String, Option<NodeId>)> = vec![(url.to_string(), None)];

    while let Some((link, parent)) = stack.pop() {
        if link.is_empty() || !visited.insert(source.page_url(&link)) {
            continue;
        }

        debug!("Tree node: {}", prettify(&source.page_url(&link)));
        let content = source.fetch_text(&link).await?;
        if content.is_empty() {
            continue;
        }

        let info = WikiInfo::parse(&content);
        let routes = parse_routes(source, &content).await?;
        let children: Vec<String> = parse_listing(&content)
            .into_iter()
            .filter(|item| !item.is_empty())
            .map(|item| item.url)
            .collect();

        let node = WikiNode::new(&link, info, routes, content);
        let id = match parent {
            Some(parent) => tree.add_child(parent, node),
            None => tree.set_root(node),
        };

        stack.extend(children.into_iter().rev().map(|child| (child, Some(id))));
    }

    Ok(if tree.is_empty() { None } else { Some(tree) })
}
