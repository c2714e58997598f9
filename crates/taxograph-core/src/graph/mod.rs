/// Immutable queryable taxonomy graphs.
///
/// A graph is produced once by a builder finalize, shared freely across
/// threads for queries, and discarded when the underlying edge source
/// changes. Three variants trade memory against feature footprint behind the
/// uniform [`Taxonomy`] contract:
///
/// - [`CachedGraph`] — sequence-indexed dense arrays plus bitset membership
///   caches for O(1) count queries.
/// - [`CompactGraph`] — nid-keyed hash storage with two ancillary sets;
///   identical semantics, lower memory, no identity remapping required.
/// - [`AncestorGraph`] — a simplified short-lived variant holding only one
///   node's ancestor closure, for "path to root" rendering.
///
/// The sole mutation on a finished graph is [`TaxonomyEdit::remove_parent`],
/// reserved for the cycle resolver on an otherwise-quiescent graph.
pub mod ancestor;
pub mod cached;
pub mod compact;

pub use ancestor::AncestorGraph;
pub use cached::CachedGraph;
pub use compact::CompactGraph;

use std::collections::HashSet;

use crate::newtypes::NodeId;

/// The empty adjacency array returned for nodes with no recorded edges.
pub(crate) const NO_NODES: &[NodeId] = &[];

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// Uniform query contract over every graph variant.
///
/// Queries on nodes the graph has never seen return empty results, not
/// errors — upstream terminology data is not under this engine's control and
/// a usable partial answer beats a refusal.
pub trait Taxonomy {
    /// Children of `parent`, sorted ascending; empty if none recorded.
    fn children_of(&self, parent: NodeId) -> &[NodeId];

    /// Parents of `child`, sorted ascending; empty if none recorded.
    fn parents_of(&self, child: NodeId) -> &[NodeId];

    /// Number of nodes in the graph.
    fn node_count(&self) -> usize;

    /// Returns `true` if `node` participates in the graph.
    fn contains(&self, node: NodeId) -> bool;

    /// Every node in the graph, sorted ascending.
    fn nodes(&self) -> Vec<NodeId>;

    /// Nodes that have children but no parents, sorted ascending.
    ///
    /// A well-formed taxonomy has exactly one; malformed input can produce
    /// zero or several, which the builder reports as a root-count anomaly.
    fn roots(&self) -> Vec<NodeId>;

    /// Returns `true` if `parent` appears in `child`'s parent array.
    ///
    /// Binary search over the sorted array.
    fn is_child_of(&self, child: NodeId, parent: NodeId) -> bool {
        self.parents_of(child).binary_search(&parent).is_ok()
    }

    /// Returns `true` if `ancestor` is reachable from `child` by walking
    /// parent arrays upward.
    ///
    /// Memoized per call with a visited set so shared ancestors are walked
    /// once and the walk terminates even on cyclic input. Not cycle-correct
    /// by itself: on a graph with unresolved cycles the answer for members
    /// of the cycle is unreliable. The traversal engine uses its own bounded
    /// walk when cycles are still possible.
    fn is_descendent_of(&self, child: NodeId, ancestor: NodeId) -> bool {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![child];
        visited.insert(child);

        while let Some(node) = stack.pop() {
            for &parent in self.parents_of(node) {
                if parent == ancestor {
                    return true;
                }
                if visited.insert(parent) {
                    stack.push(parent);
                }
            }
        }
        false
    }

    /// The full descendant closure of `node`, excluding `node` itself.
    ///
    /// Visited-set guarded, so it terminates on unresolved cycles; the
    /// membership of cycle participants is then best-effort.
    fn descendants_of(&self, node: NodeId) -> HashSet<NodeId> {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            for &child in self.children_of(current) {
                if visited.insert(child) {
                    stack.push(child);
                }
            }
        }
        visited.remove(&node);
        visited
    }

    /// The full ancestor closure of `node`, excluding `node` itself.
    fn ancestors_of(&self, node: NodeId) -> HashSet<NodeId> {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![node];

        while let Some(current) = stack.pop() {
            for &parent in self.parents_of(current) {
                if visited.insert(parent) {
                    stack.push(parent);
                }
            }
        }
        visited.remove(&node);
        visited
    }

    /// Number of descendants of `node`.
    fn descendant_count(&self, node: NodeId) -> usize {
        self.descendants_of(node).len()
    }

    /// Number of ancestors of `node`.
    fn ancestor_count(&self, node: NodeId) -> usize {
        self.ancestors_of(node).len()
    }

    /// Builds the transient ancestor-subtree graph for `node`.
    ///
    /// The result contains `node` plus its full ancestor closure, with each
    /// parent edge re-shaped as a child edge of the ancestor, so a renderer
    /// can walk from the subtree's roots down to `node`.
    fn create_ancestor_subtree(&self, node: NodeId) -> AncestorGraph
    where
        Self: Sized,
    {
        AncestorGraph::build(self, node)
    }
}

// ---------------------------------------------------------------------------
// TaxonomyEdit
// ---------------------------------------------------------------------------

/// The single structural edit a finished graph supports.
///
/// Used exclusively by the cycle resolver; not safe to run concurrently with
/// traversal or other queries.
pub trait TaxonomyEdit: Taxonomy {
    /// Removes `parent` from `child`'s parent array (and the mirrored child
    /// entry). Returns `true` if the edge existed.
    fn remove_parent(&mut self, child: NodeId, parent: NodeId) -> bool;
}
