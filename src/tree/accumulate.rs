//! Metadata inheritance along the ancestor chain
//!
//! Both folds run strictly root-ward: a node only ever receives values from
//! its ancestors, never from siblings or descendants.

use crate::extract::{format_tag, WikiInfo};
use crate::model::ParsedRoute;
use crate::tree::{NodeId, WikiTree};

/// A node's own data folded with everything inherited from its ancestors
#[derive(Debug, Clone, Default)]
pub struct FoldedNode {
    pub info: Option<WikiInfo>,
    /// Own routes only; routes are never inherited
    pub routes: Vec<ParsedRoute>,
    /// Page snapshots, ancestors first
    pub contents: Vec<String>,
}

/// Fills the missing fields of `own` from `ancestor`
///
/// Location, climbing types and seasons are taken only when missing. With
/// `merge_description`, a nameless `own` adopts the ancestor's name and
/// description, and a named one adopts the ancestor's description only when
/// it is more than three times longer.
pub fn merge_wiki_with(mut own: WikiInfo, ancestor: &WikiInfo, merge_description: bool) -> WikiInfo {
    if own.location.is_none() {
        own.location = ancestor.location;
    }
    if own.climbing.is_empty() {
        own.climbing = ancestor.climbing;
    }
    if own.season.is_empty() {
        own.season = ancestor.season;
    }

    if merge_description {
        if own.name.trim().is_empty() && !ancestor.name.trim().is_empty() {
            own.name = ancestor.name.clone();
            own.description = ancestor.description.clone();
        } else if own.description.chars().count() * 3 < ancestor.description.chars().count() {
            own.description = ancestor.description.clone();
        }
    }

    own
}

/// Folds a node with its ancestors' metadata and page snapshots
///
/// Descriptions are not merged. Ancestor snapshots are prepended unless a
/// snapshot of the same length is already present.
pub fn merge_all(tree: &WikiTree, id: NodeId) -> FoldedNode {
    let mut folded: Option<FoldedNode> = None;

    for node_id in tree.lineage(id) {
        let node = tree.node(node_id);
        let mut current = FoldedNode {
            info: node.info.clone(),
            routes: node.routes.clone(),
            contents: node.contents.clone(),
        };

        if let Some(parent) = folded {
            current.info = match (current.info.take(), parent.info.as_ref()) {
                (Some(own), Some(inherited)) => Some(merge_wiki_with(own, inherited, false)),
                (own, _) => own,
            };
            current.contents = merge_contents(current.contents, parent.contents);
        }

        folded = Some(current);
    }

    folded.unwrap_or_default()
}

fn merge_contents(own: Vec<String>, inherited: Vec<String>) -> Vec<String> {
    if own.is_empty() {
        return inherited;
    }

    let mut merged: Vec<String> = inherited
        .into_iter()
        .filter(|c| !own.iter().any(|o| o.len() == c.len()))
        .collect();
    merged.extend(own);
    merged
}

/// Area-level metadata: the node's info merged with its whole ancestor chain
///
/// A node without info counts as empty, so it takes its nearest named
/// ancestor's name and description.
pub fn merge_wiki(tree: &WikiTree, id: NodeId) -> WikiInfo {
    tree.lineage(id)
        .into_iter()
        .fold(None, |inherited: Option<WikiInfo>, node_id| {
            let own = tree.node(node_id).info.clone().unwrap_or_default();
            Some(match inherited {
                Some(ancestor) => merge_wiki_with(own, &ancestor, true),
                None => own,
            })
        })
        .unwrap_or_default()
}

/// Tags of a node: `extra` first, then one slug per named ancestor, root
/// first, ending with the node's own. Duplicates keep their first position.
pub fn tags(tree: &WikiTree, id: NodeId, extra: &[String]) -> Vec<String> {
    let names = tree
        .lineage(id)
        .into_iter()
        .filter_map(|node_id| tree.node(node_id).info.as_ref().map(|i| i.name.as_str()));

    let mut result: Vec<String> = Vec::new();
    for tag in extra.iter().map(String::as_str).chain(names).map(format_tag) {
        if !tag.is_empty() && !result.contains(&tag) {
            result.push(tag);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClimbingTypes, Location, Seasons};
    use crate::tree::tests::{info, node, route};
    use crate::tree::WikiNode;

    fn chain(a: WikiInfo, b: WikiInfo, c: WikiInfo) -> (WikiTree, NodeId, NodeId, NodeId) {
        let mut tree = WikiTree::new();
        let a_id = tree.set_root(node("a", Some(a), vec![]));
        let b_id = tree.add_child(a_id, node("bb", Some(b), vec![]));
        let c_id = tree.add_child(b_id, node("ccc", Some(c), vec![route("r", 1)]));
        (tree, a_id, b_id, c_id)
    }

    #[test]
    fn test_merge_wiki_fills_missing_fields_from_ancestor() {
        let mut a = info("Costa Daurada", "Short.");
        a.location = Location::new(41.2, 0.9);
        a.season = Seasons::AUTUMN | Seasons::SPRING;
        a.climbing = ClimbingTypes::SPORT;

        let mut b = info("Siurana", "Limestone.");
        b.climbing = ClimbingTypes::TRAD;

        let (tree, _, b_id, _) = chain(a, b, info("El Pati", "Sector."));
        let merged = merge_wiki(&tree, b_id);

        assert_eq!(merged.name, "Siurana");
        assert_eq!(merged.location, Location::new(41.2, 0.9));
        assert_eq!(merged.season, Seasons::AUTUMN | Seasons::SPRING);
        assert_eq!(merged.climbing, ClimbingTypes::TRAD);
        assert_eq!(merged.description, "Limestone.");
    }

    #[test]
    fn test_merge_wiki_prefers_much_richer_ancestor_description() {
        let rich = "A long and detailed description of the whole region.";
        let (tree, _, b_id, _) = chain(
            info("Costa Daurada", rich),
            info("Siurana", "Nice."),
            info("El Pati", ""),
        );
        assert_eq!(merge_wiki(&tree, b_id).description, rich);

        let (tree, _, b_id, _) = chain(
            info("Costa Daurada", "Twelve chars"),
            info("Siurana", "Four"),
            info("El Pati", ""),
        );
        assert_eq!(merge_wiki(&tree, b_id).description, "Four");
    }

    #[test]
    fn test_merge_wiki_adopts_ancestor_name_when_missing() {
        let mut tree = WikiTree::new();
        let a = tree.set_root(node("a", Some(info("Siurana", "Village crag.")), vec![]));
        let b = tree.add_child(a, node("b", None, vec![]));

        let merged = merge_wiki(&tree, b);
        assert_eq!(merged.name, "Siurana");
        assert_eq!(merged.description, "Village crag.");
    }

    #[test]
    fn test_merge_all_keeps_description_and_routes_local() {
        let mut a = info("Costa Daurada", "A very very very long regional description.");
        a.season = Seasons::WINTER;
        let (tree, _, _, c_id) = chain(a, info("Siurana", ""), info("El Pati", "Short."));

        let folded = merge_all(&tree, c_id);
        let info = folded.info.unwrap();

        assert_eq!(info.name, "El Pati");
        assert_eq!(info.description, "Short.");
        assert_eq!(info.season, Seasons::WINTER);
        assert_eq!(folded.routes.len(), 1);
        assert_eq!(
            folded.contents,
            vec!["<html>a</html>", "<html>bb</html>", "<html>ccc</html>"]
        );
    }

    #[test]
    fn test_merge_all_skips_snapshots_of_equal_length() {
        let mut tree = WikiTree::new();
        let a = tree.set_root(WikiNode::new("a", None, vec![], "same".to_string()));
        let b = tree.add_child(a, WikiNode::new("b", None, vec![], "SAME".to_string()));

        assert_eq!(merge_all(&tree, b).contents, vec!["SAME"]);
    }

    #[test]
    fn test_tags_are_root_first_and_distinct() {
        let (tree, _, b_id, c_id) = chain(
            info("Spain", ""),
            info("Siurana", ""),
            info("El Pati", ""),
        );
        let extra = vec!["Europe".to_string(), "Spain".to_string()];

        assert_eq!(tags(&tree, c_id, &extra), vec!["europe", "spain", "siurana", "el-pati"]);
        assert_eq!(tags(&tree, b_id, &[]), vec!["spain", "siurana"]);
    }
}
