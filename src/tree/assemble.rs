//! Conversion of a walked tree into area and sector records

use crate::crawler::PageSource;
use crate::extract::extract_image;
use crate::model::{ParsedArea, ParsedSector};
use crate::tree::{merge_all, merge_wiki, tags, WikiTree};
use crate::Result;
use tracing::{debug, warn};

/// Builds the areas of one tree
///
/// Every sector node becomes a sector. Its area is the merged metadata of
/// its parent (of the node itself at the root); sectors are grouped by area
/// name in first-seen order. Areas without sectors are not returned.
///
/// # Arguments
///
/// * `tree` - Walked tree of one area listing entry
/// * `extra_tags` - Names of the enclosing listings (region, country, ...)
/// * `source` - Used to fetch sector images
pub async fn assemble_areas<S>(
    tree: &WikiTree,
    extra_tags: &[String],
    source: &mut S,
) -> Result<Vec<ParsedArea>>
where
    S: PageSource + ?Sized,
{
    let mut areas: Vec<ParsedArea> = Vec::new();
    let mut order = 0;

    for sector_id in tree.sector_nodes() {
        let node = tree.node(sector_id);
        let folded = merge_all(tree, sector_id);

        let Some(info) = folded.info else {
            debug!("Skipping unnamed sector node {}", node.url);
            continue;
        };

        let area_id = node.parent().unwrap_or(sector_id);
        let area_wiki = merge_wiki(tree, area_id);
        if area_wiki.name.is_empty() {
            warn!("No area name found above sector '{}', skipping", info.name);
            continue;
        }

        let sector_tags = tags(tree, sector_id, extra_tags);
        let area_tags = match node.parent() {
            Some(parent) => tags(tree, parent, extra_tags),
            None => sector_tags.clone(),
        };

        // Snapshots run root first; the first one with a photo wins
        let mut image = None;
        for content in &folded.contents {
            if let Some(bytes) = extract_image(source, content).await? {
                image = Some(bytes);
                break;
            }
        }

        order += 1;
        let sector = ParsedSector {
            id: None,
            name: info.name,
            description: info.description,
            tags: sector_tags,
            climbing: info.climbing,
            season: info.season,
            location: info.location,
            origin: source.page_url(&node.url),
            order,
            routes: folded.routes,
            image,
        };

        match areas.iter_mut().find(|a| a.name == area_wiki.name) {
            Some(area) => area.sectors.push(sector),
            None => areas.push(ParsedArea {
                id: None,
                name: area_wiki.name,
                description: area_wiki.description,
                tags: area_tags,
                climbing: area_wiki.climbing,
                season: area_wiki.season,
                location: area_wiki.location,
                origin: source.page_url(&tree.node(area_id).url),
                sectors: vec![sector],
            }),
        }
    }

    areas.retain(|a| !a.sectors.is_empty());
    Ok(areas)
}
