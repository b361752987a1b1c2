//! Arena-backed page tree of one area
//!
//! Nodes are owned by the tree and addressed by [`NodeId`]. Children are
//! owned top-down; the parent link is a plain handle and never owns.

mod accumulate;
mod assemble;

pub use accumulate::{merge_all, merge_wiki, merge_wiki_with, tags, FoldedNode};
pub use assemble::assemble_areas;

use crate::extract::WikiInfo;
use crate::model::ParsedRoute;

/// Handle of a node inside a [`WikiTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One page of the tree
#[derive(Debug, Clone, Default)]
pub struct WikiNode {
    /// Link the page was fetched from
    pub url: String,
    pub info: Option<WikiInfo>,
    /// Routes found on this page and its continuation pages
    pub routes: Vec<ParsedRoute>,
    /// Raw page text, kept for image lookup
    pub contents: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl WikiNode {
    pub fn new(url: &str, info: Option<WikiInfo>, routes: Vec<ParsedRoute>, content: String) -> Self {
        Self {
            url: url.to_string(),
            info,
            routes,
            contents: vec![content],
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// A sector node owns at least one route
    pub fn is_sector(&self) -> bool {
        !self.routes.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct WikiTree {
    nodes: Vec<WikiNode>,
    root: Option<NodeId>,
}

impl WikiTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root node; a tree has exactly one
    pub fn set_root(&mut self, node: WikiNode) -> NodeId {
        let id = self.push(node);
        self.root = Some(id);
        id
    }

    /// Attaches `node` as the last child of `parent`
    pub fn add_child(&mut self, parent: NodeId, mut node: WikiNode) -> NodeId {
        node.parent = Some(parent);
        let id = self.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    fn push(&mut self, node: WikiNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &WikiNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Path from the root down to `id`, both included
    pub fn lineage(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = vec![id];
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.node(parent).parent;
        }
        chain.reverse();
        chain
    }

    /// Nodes in pre-order, starting from the root
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        order
    }

    /// Nodes owning at least one route, in pre-order
    ///
    /// Routeless nodes stay in the tree so their metadata can still be
    /// inherited.
    pub fn sector_nodes(&self) -> Vec<NodeId> {
        self.pre_order()
            .into_iter()
            .filter(|id| self.node(*id).is_sector())
            .collect()
    }
}
