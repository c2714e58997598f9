/// Short-lived ancestor-subtree graph for "path to root" rendering.
///
/// Holds one focus node plus its full ancestor closure, with parent edges
/// re-shaped as child edges so a renderer walks from the subtree's roots
/// down to the focus. Built fresh per request and discarded after the view
/// is drawn; nothing here is optimized for repeated queries.
use std::collections::{HashMap, HashSet};

use crate::graph::{NO_NODES, Taxonomy};
use crate::newtypes::NodeId;

/// Transient graph over one node's ancestor closure.
#[derive(Debug, Clone)]
pub struct AncestorGraph {
    focus: NodeId,
    children: HashMap<NodeId, Vec<NodeId>>,
    parents: HashMap<NodeId, Vec<NodeId>>,
    nodes: HashSet<NodeId>,
}

impl AncestorGraph {
    /// Builds the ancestor subtree of `focus` over `source`.
    ///
    /// The closure walk is visited-set guarded, so unresolved cycles among
    /// the ancestors terminate; their members all end up in the subtree.
    pub fn build<T: Taxonomy>(source: &T, focus: NodeId) -> Self {
        let mut nodes: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![focus];
        nodes.insert(focus);

        while let Some(current) = stack.pop() {
            for &parent in source.parents_of(current) {
                if nodes.insert(parent) {
                    stack.push(parent);
                }
            }
        }

        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut parents: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for &node in &nodes {
            for &parent in source.parents_of(node) {
                if !nodes.contains(&parent) {
                    continue;
                }
                children.entry(parent).or_default().push(node);
                parents.entry(node).or_default().push(parent);
            }
        }
        for list in children.values_mut().chain(parents.values_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            focus,
            children,
            parents,
            nodes,
        }
    }

    /// The node this subtree was extracted for.
    pub fn focus(&self) -> NodeId {
        self.focus
    }
}

impl Taxonomy for AncestorGraph {
    fn children_of(&self, parent: NodeId) -> &[NodeId] {
        self.children.get(&parent).map_or(NO_NODES, Vec::as_slice)
    }

    fn parents_of(&self, child: NodeId) -> &[NodeId] {
        self.parents.get(&child).map_or(NO_NODES, Vec::as_slice)
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    fn nodes(&self) -> Vec<NodeId> {
        let mut all: Vec<NodeId> = self.nodes.iter().copied().collect();
        all.sort_unstable();
        all
    }

    fn roots(&self) -> Vec<NodeId> {
        let mut roots: Vec<NodeId> = self
            .nodes
            .iter()
            .copied()
            .filter(|nid| !self.parents.contains_key(nid))
            .collect();
        roots.sort_unstable();
        roots
    }
}
