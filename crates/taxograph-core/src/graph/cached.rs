/// Bitset-cached graph variant indexed by dense sequence.
///
/// Adjacency arrays live in dense vectors indexed by the per-assemblage
/// sequence, and node / has-parents / has-children membership is cached in
/// [`SequenceSet`] bitsets, so count queries are O(1) and per-node lookups
/// are a hash probe plus an array read. The nid↔sequence tables are copied
/// out of the identity mapping at finalize time, so the graph answers
/// queries without calling back into the store.
use crate::adjacency::SequenceSet;
use crate::graph::{NO_NODES, Taxonomy, TaxonomyEdit};
use crate::newtypes::{NodeId, Sequence};

/// Sequence-indexed immutable taxonomy graph with cached membership bitsets.
///
/// Constructed by `GraphBuilder::finalize`; shared freely for queries once
/// built.
#[derive(Debug, Clone)]
pub struct CachedGraph {
    assemblage: NodeId,
    nid_to_sequence: std::collections::HashMap<NodeId, Sequence>,
    sequence_to_nid: Vec<Option<NodeId>>,
    children: Vec<Vec<NodeId>>,
    parents: Vec<Vec<NodeId>>,
    node_set: SequenceSet,
    with_parents: SequenceSet,
    with_children: SequenceSet,
}

impl CachedGraph {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        assemblage: NodeId,
        nid_to_sequence: std::collections::HashMap<NodeId, Sequence>,
        sequence_to_nid: Vec<Option<NodeId>>,
        children: Vec<Vec<NodeId>>,
        parents: Vec<Vec<NodeId>>,
        node_set: SequenceSet,
        with_parents: SequenceSet,
        with_children: SequenceSet,
    ) -> Self {
        Self {
            assemblage,
            nid_to_sequence,
            sequence_to_nid,
            children,
            parents,
            node_set,
            with_parents,
            with_children,
        }
    }

    fn slot(&self, nid: NodeId) -> Option<usize> {
        self.nid_to_sequence.get(&nid).map(|seq| seq.index())
    }

    /// The assemblage this graph is scoped to.
    pub fn assemblage(&self) -> NodeId {
        self.assemblage
    }

    /// Size of the underlying sequence space (exclusive upper bound).
    ///
    /// Useful for pre-sizing per-traversal bookkeeping.
    pub fn sequence_capacity(&self) -> usize {
        self.sequence_to_nid.len()
    }

    /// Number of nodes with at least one parent. O(1).
    pub fn with_parents_count(&self) -> usize {
        self.with_parents.len()
    }

    /// Number of nodes with at least one child. O(1).
    pub fn with_children_count(&self) -> usize {
        self.with_children.len()
    }

    /// Total number of parent/child edges.
    pub fn edge_count(&self) -> usize {
        self.parents.iter().map(Vec::len).sum()
    }
}

impl Taxonomy for CachedGraph {
    fn children_of(&self, parent: NodeId) -> &[NodeId] {
        self.slot(parent)
            .and_then(|i| self.children.get(i))
            .map_or(NO_NODES, Vec::as_slice)
    }

    fn parents_of(&self, child: NodeId) -> &[NodeId] {
        self.slot(child)
            .and_then(|i| self.parents.get(i))
            .map_or(NO_NODES, Vec::as_slice)
    }

    fn node_count(&self) -> usize {
        self.node_set.len()
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nid_to_sequence
            .get(&node)
            .is_some_and(|&seq| self.node_set.contains(seq))
    }

    fn nodes(&self) -> Vec<NodeId> {
        let mut all: Vec<NodeId> = self
            .node_set
            .iter()
            .filter_map(|seq| self.sequence_to_nid.get(seq.index()).copied().flatten())
            .collect();
        all.sort_unstable();
        all
    }

    fn roots(&self) -> Vec<NodeId> {
        let mut roots: Vec<NodeId> = self
            .with_children
            .iter()
            .filter(|&seq| !self.with_parents.contains(seq))
            .filter_map(|seq| self.sequence_to_nid.get(seq.index()).copied().flatten())
            .collect();
        roots.sort_unstable();
        roots
    }
}

impl TaxonomyEdit for CachedGraph {
    fn remove_parent(&mut self, child: NodeId, parent: NodeId) -> bool {
        let Some(child_slot) = self.slot(child) else {
            return false;
        };
        let removed = match self.parents.get_mut(child_slot) {
            Some(parents) => match parents.binary_search(&parent) {
                Ok(pos) => {
                    parents.remove(pos);
                    if parents.is_empty() {
                        self.with_parents.remove(Sequence(child_slot as u32));
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

        if let Some(parent_slot) = self.slot(parent) {
            if let Some(children) = self.children.get_mut(parent_slot) {
                if let Ok(pos) = children.binary_search(&child) {
                    children.remove(pos);
                }
                if children.is_empty() {
                    self.with_children.remove(Sequence(parent_slot as u32));
                }
            }
        }
        true
    }
}
