/// Plain-array graph variant keyed directly by node identifier.
///
/// Stores both adjacency directions in nid-keyed hash maps plus two
/// ancillary membership sets. Used when identifiers are already dense enough
/// or no identity mapping is available; count queries walk the sets rather
/// than reading cached bitsets.
use std::collections::{HashMap, HashSet};

use crate::graph::{NO_NODES, Taxonomy, TaxonomyEdit};
use crate::newtypes::NodeId;

/// Nid-keyed immutable taxonomy graph.
///
/// Constructed by `GraphBuilder::finalize_compact`; shared freely for
/// queries once built.
#[derive(Debug, Clone)]
pub struct CompactGraph {
    assemblage: NodeId,
    children: HashMap<NodeId, Vec<NodeId>>,
    parents: HashMap<NodeId, Vec<NodeId>>,
    nodes: HashSet<NodeId>,
    with_parents: HashSet<NodeId>,
    with_children: HashSet<NodeId>,
}

impl CompactGraph {
    pub(crate) fn from_parts(
        assemblage: NodeId,
        children: HashMap<NodeId, Vec<NodeId>>,
        parents: HashMap<NodeId, Vec<NodeId>>,
        nodes: HashSet<NodeId>,
        with_parents: HashSet<NodeId>,
        with_children: HashSet<NodeId>,
    ) -> Self {
        Self {
            assemblage,
            children,
            parents,
            nodes,
            with_parents,
            with_children,
        }
    }

    /// The assemblage this graph is scoped to.
    pub fn assemblage(&self) -> NodeId {
        self.assemblage
    }

    /// Number of nodes with at least one parent.
    pub fn with_parents_count(&self) -> usize {
        self.with_parents.len()
    }

    /// Number of nodes with at least one child.
    pub fn with_children_count(&self) -> usize {
        self.with_children.len()
    }

    /// Total number of parent/child edges.
    pub fn edge_count(&self) -> usize {
        self.parents.values().map(Vec::len).sum()
    }
}

impl Taxonomy for CompactGraph {
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
            .with_children
            .iter()
            .copied()
            .filter(|nid| !self.with_parents.contains(nid))
            .collect();
        roots.sort_unstable();
        roots
    }
}

impl TaxonomyEdit for CompactGraph {
    fn remove_parent(&mut self, child: NodeId, parent: NodeId) -> bool {
        let removed = match self.parents.get_mut(&child) {
            Some(parents) => match parents.binary_search(&parent) {
                Ok(pos) => {
                    parents.remove(pos);
                    if parents.is_empty() {
                        self.parents.remove(&child);
                        self.with_parents.remove(&child);
                    }
                    true
                }
                Err(_) => false,
            },
            None => false,
        };
        if !removed {
            return false;
        }

        if let Some(children) = self.children.get_mut(&parent) {
            if let Ok(pos) = children.binary_search(&child) {
                children.remove(pos);
            }
            if children.is_empty() {
                self.children.remove(&parent);
                self.with_children.remove(&parent);
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::builder::GraphBuilder;

    const ASSEMBLAGE: NodeId = NodeId(-10);

    /// Builds the shared four-node diamond: 1 → {2, 3} → 4.
    fn diamond() -> CompactGraph {
        let builder = GraphBuilder::new(1);
        for (parent, child) in [(1, 2), (1, 3), (2, 4), (3, 4)] {
            builder.add(NodeId(parent), NodeId(child));
        }
        builder.finalize_compact(ASSEMBLAGE)
    }

    /// The concrete reference scenario holds on the compact variant.
    #[test]
    fn test_diamond_queries() {
        let g = diamond();
        assert_eq!(g.roots(), vec![NodeId(1)]);
        assert_eq!(g.children_of(NodeId(1)), &[NodeId(2), NodeId(3)]);
        assert_eq!(g.parents_of(NodeId(4)), &[NodeId(2), NodeId(3)]);
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 4);

        let descendants = g.descendants_of(NodeId(1));
        assert_eq!(descendants.len(), 3);
        for nid in [2, 3, 4] {
            assert!(descendants.contains(&NodeId(nid)));
        }
    }

    /// Unknown nodes yield empty results, never errors.
    #[test]
    fn test_unknown_node_is_empty() {
        let g = diamond();
        assert!(g.children_of(NodeId(99)).is_empty());
        assert!(g.parents_of(NodeId(99)).is_empty());
        assert!(!g.contains(NodeId(99)));
        assert!(g.descendants_of(NodeId(99)).is_empty());
    }

    /// Ancestor/descendant duality over every edge.
    #[test]
    fn test_child_parent_duality() {
        let g = diamond();
        for &parent in &g.nodes() {
            for &child in g.children_of(parent) {
                assert!(g.is_child_of(child, parent));
                assert!(g.descendants_of(parent).contains(&child));
            }
        }
    }

    /// `is_descendent_of` follows multi-step chains but not reverse edges.
    #[test]
    fn test_is_descendent_of() {
        let g = diamond();
        assert!(g.is_descendent_of(NodeId(4), NodeId(1)));
        assert!(g.is_descendent_of(NodeId(2), NodeId(1)));
        assert!(!g.is_descendent_of(NodeId(1), NodeId(4)));
        assert!(!g.is_descendent_of(NodeId(2), NodeId(3)));
    }

    /// Removing a parent edge updates both directions and membership sets.
    #[test]
    fn test_remove_parent() {
        let mut g = diamond();
        assert!(g.remove_parent(NodeId(4), NodeId(3)));
        assert_eq!(g.parents_of(NodeId(4)), &[NodeId(2)]);
        assert!(g.children_of(NodeId(3)).is_empty());
        assert!(!g.remove_parent(NodeId(4), NodeId(3)), "already removed");

        // 3 no longer has children, so it drops out of the root computation's
        // has-children side entirely.
        assert_eq!(g.with_children_count(), 2);
        assert_eq!(g.roots(), vec![NodeId(1)]);
    }

    /// Removing the last parent of a node makes it parentless (a new root
    /// candidate if it still has children).
    #[test]
    fn test_remove_last_parent_creates_root() {
        let mut g = diamond();
        assert!(g.remove_parent(NodeId(2), NodeId(1)));
        assert_eq!(g.roots(), vec![NodeId(1), NodeId(2)]);
    }

    /// `is_descendent_of` terminates on cyclic input.
    #[test]
    fn test_is_descendent_terminates_on_cycle() {
        let builder = GraphBuilder::new(1);
        for (parent, child) in [(1, 2), (2, 3), (3, 1)] {
            builder.add(NodeId(parent), NodeId(child));
        }
        let g = builder.finalize_compact(ASSEMBLAGE);
        // Every member of the cycle is an "ancestor" of every other.
        assert!(g.is_descendent_of(NodeId(1), NodeId(3)));
        assert!(g.is_descendent_of(NodeId(1), NodeId(1)));
    }
}
