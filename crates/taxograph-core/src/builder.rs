/// Incremental, concurrency-friendly graph builder.
///
/// The build phase is shared-nothing: each worker owns a [`GraphBuilder`]
/// and calls [`GraphBuilder::add`] freely (adds are also safe from multiple
/// threads against one builder — the per-key accumulate-merge on the
/// adjacency store is the only contended resource). A reduction phase folds
/// worker builders together with [`GraphBuilder::combine`], and a single
/// finalize copies the accumulated state into an immutable graph.
///
/// `add` is idempotent and commutative, so the finalized graph is
/// independent of edge arrival order, worker assignment, and combine order.
use std::collections::{HashMap, HashSet};

use dashmap::DashSet;
use rayon::prelude::*;

use crate::adjacency::{NidAdjacencyMap, SequenceSet};
use crate::alerts::{Alert, AlertChannel, AlertKind};
use crate::context::ViewContext;
use crate::graph::{CachedGraph, CompactGraph, Taxonomy};
use crate::identity::IdentityMapping;
use crate::newtypes::{NodeId, Sequence};

// ---------------------------------------------------------------------------
// GraphBuilder
// ---------------------------------------------------------------------------

/// Accumulates parent/child edges into adjacency stores and membership sets.
///
/// The `builder_id` is assigned by the caller (shard index, worker number)
/// and appears in debug logs; the engine keeps no process-wide counters.
#[derive(Debug)]
pub struct GraphBuilder {
    builder_id: u32,
    /// parent → sorted children.
    children: NidAdjacencyMap,
    /// child → sorted parents.
    parents: NidAdjacencyMap,
    nodes: DashSet<NodeId>,
    with_parents: DashSet<NodeId>,
    with_children: DashSet<NodeId>,
}

impl GraphBuilder {
    /// Creates an empty builder tagged with a caller-chosen id.
    pub fn new(builder_id: u32) -> Self {
        Self {
            builder_id,
            children: NidAdjacencyMap::new(),
            parents: NidAdjacencyMap::new(),
            nodes: DashSet::new(),
            with_parents: DashSet::new(),
            with_children: DashSet::new(),
        }
    }

    /// The caller-assigned id of this builder.
    pub fn builder_id(&self) -> u32 {
        self.builder_id
    }

    /// Records one `parent → child` edge.
    ///
    /// Registers both nids, marks `child` as having a parent and `parent` as
    /// having a child, then accumulate-merges each endpoint into the other's
    /// adjacency array. Adding the same edge again has no further effect.
    pub fn add(&self, parent: NodeId, child: NodeId) {
        self.nodes.insert(parent);
        self.nodes.insert(child);
        self.with_children.insert(parent);
        self.with_parents.insert(child);
        self.parents.accumulate_and_get(child, &[parent]);
        self.children.accumulate_and_get(parent, &[child]);
    }

    /// Folds `other` into this builder.
    ///
    /// Unions the membership sets and merges both adjacency stores
    /// key-by-key with the same set-union merge `add` uses, so combining is
    /// commutative up to array ordering (which is canonical anyway).
    pub fn combine(&self, other: GraphBuilder) {
        tracing::debug!(
            builder = self.builder_id,
            absorbed = other.builder_id,
            absorbed_nodes = other.nodes.len(),
            "combining builders"
        );
        for nid in other.nodes {
            self.nodes.insert(nid);
        }
        for nid in other.with_parents {
            self.with_parents.insert(nid);
        }
        for nid in other.with_children {
            self.with_children.insert(nid);
        }
        for (key, values) in other.children.into_entries() {
            self.children.accumulate_and_get(key, &values);
        }
        for (key, values) in other.parents.into_entries() {
            self.parents.accumulate_and_get(key, &values);
        }
    }

    /// Number of distinct nodes seen so far.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Roots implied by the current state: has-children minus has-parents.
    pub fn roots(&self) -> Vec<NodeId> {
        let mut roots: Vec<NodeId> = self
            .with_children
            .iter()
            .map(|nid| *nid)
            .filter(|nid| !self.with_parents.contains(nid))
            .collect();
        roots.sort_unstable();
        roots
    }

    /// Finalizes into the sequence-indexed [`CachedGraph`].
    ///
    /// A structural copy: every adjacency array is already sorted and
    /// deduplicated by the merge function, so nothing is re-sorted here.
    /// Nids the identity mapping cannot place in `assemblage` are dropped
    /// with a warning rather than failing the build.
    ///
    /// Root-count verification is the caller's final step; see
    /// [`verify_root_count`].
    pub fn finalize(self, identity: &dyn IdentityMapping, assemblage: NodeId) -> CachedGraph {
        let capacity = identity.max_sequence(assemblage) as usize;
        let mut child_arrays: Vec<Vec<NodeId>> = vec![Vec::new(); capacity];
        let mut parent_arrays: Vec<Vec<NodeId>> = vec![Vec::new(); capacity];
        let mut sequence_to_nid: Vec<Option<NodeId>> = vec![None; capacity];
        let mut nid_to_sequence: HashMap<NodeId, Sequence> = HashMap::new();
        let mut node_set = SequenceSet::with_capacity(capacity);
        let mut with_parents = SequenceSet::with_capacity(capacity);
        let mut with_children = SequenceSet::with_capacity(capacity);

        let node_total = self.nodes.len();
        for nid in self.nodes {
            match identity.sequence_of(nid, assemblage) {
                Some(seq) if seq.index() < capacity => {
                    nid_to_sequence.insert(nid, seq);
                    sequence_to_nid[seq.index()] = Some(nid);
                    node_set.insert(seq);
                }
                Some(seq) => {
                    tracing::warn!(
                        %nid, %seq, capacity,
                        "sequence outside the reported space; node dropped"
                    );
                }
                None => {
                    tracing::warn!(
                        %nid, assemblage = %assemblage,
                        "nid has no sequence in assemblage; node dropped"
                    );
                }
            }
        }
        for nid in self.with_parents {
            if let Some(&seq) = nid_to_sequence.get(&nid) {
                with_parents.insert(seq);
            }
        }
        for nid in self.with_children {
            if let Some(&seq) = nid_to_sequence.get(&nid) {
                with_children.insert(seq);
            }
        }
        for (nid, values) in self.children.into_entries() {
            if let Some(&seq) = nid_to_sequence.get(&nid) {
                child_arrays[seq.index()] = values;
            }
        }
        for (nid, values) in self.parents.into_entries() {
            if let Some(&seq) = nid_to_sequence.get(&nid) {
                parent_arrays[seq.index()] = values;
            }
        }

        tracing::debug!(
            builder = self.builder_id,
            nodes = node_set.len(),
            dropped = node_total - node_set.len(),
            "finalized cached graph"
        );
        CachedGraph::from_parts(
            assemblage,
            nid_to_sequence,
            sequence_to_nid,
            child_arrays,
            parent_arrays,
            node_set,
            with_parents,
            with_children,
        )
    }

    /// Finalizes into the nid-keyed [`CompactGraph`] (no remapping).
    ///
    /// Like [`GraphBuilder::finalize`], a structural copy with no re-sort.
    pub fn finalize_compact(self, assemblage: NodeId) -> CompactGraph {
        let children: HashMap<NodeId, Vec<NodeId>> = self.children.into_entries().collect();
        let parents: HashMap<NodeId, Vec<NodeId>> = self.parents.into_entries().collect();
        let nodes: HashSet<NodeId> = self.nodes.into_iter().collect();
        let with_parents: HashSet<NodeId> = self.with_parents.into_iter().collect();
        let with_children: HashSet<NodeId> = self.with_children.into_iter().collect();

        tracing::debug!(
            builder = self.builder_id,
            nodes = nodes.len(),
            "finalized compact graph"
        );
        CompactGraph::from_parts(
            assemblage,
            children,
            parents,
            nodes,
            with_parents,
            with_children,
        )
    }
}

// ---------------------------------------------------------------------------
// build_parallel
// ---------------------------------------------------------------------------

/// Builds from an edge slice with shared-nothing parallel workers.
///
/// Splits `edges` into `shard_count` chunks, populates one builder per
/// chunk on the rayon pool, and folds the shard builders together with
/// [`GraphBuilder::combine`]. Equivalent to a sequential build of the same
/// edges.
pub fn build_parallel(edges: &[(NodeId, NodeId)], shard_count: usize) -> GraphBuilder {
    if edges.is_empty() || shard_count <= 1 {
        let builder = GraphBuilder::new(0);
        for &(parent, child) in edges {
            builder.add(parent, child);
        }
        return builder;
    }

    let chunk = edges.len().div_ceil(shard_count);
    edges
        .par_chunks(chunk)
        .enumerate()
        .map(|(shard, span)| {
            let builder = GraphBuilder::new(shard as u32 + 1);
            for &(parent, child) in span {
                builder.add(parent, child);
            }
            builder
        })
        .reduce(
            || GraphBuilder::new(0),
            |accumulator, shard| {
                accumulator.combine(shard);
                accumulator
            },
        )
}

// ---------------------------------------------------------------------------
// verify_root_count
// ---------------------------------------------------------------------------

/// Checks the single-root invariant and reports violations.
///
/// Returns the computed roots either way. When the count is not exactly 1,
/// logs a warning and publishes a [`AlertKind::RootCountAnomaly`] alert
/// whose message names the count and up to 4 example roots rendered through
/// the view context. Never fails: the caller is expected to fall back to a
/// designated top node (or the first discovered root) for traversal.
pub fn verify_root_count<T: Taxonomy>(
    graph: &T,
    view: &ViewContext<'_>,
    alerts: &dyn AlertChannel,
) -> Vec<NodeId> {
    let roots = graph.roots();
    if roots.len() == 1 {
        return roots;
    }

    let shown = roots.len().min(4);
    let examples = if shown == 0 {
        String::new()
    } else {
        let listed = view.describe_all(&roots[..shown]);
        let ellipsis = if roots.len() > shown { ", …" } else { "" };
        format!(": {listed}{ellipsis}")
    };
    let message = format!(
        "expected exactly 1 root in the {} view, found {}{}",
        view.premise(),
        roots.len(),
        examples
    );
    tracing::warn!(root_count = roots.len(), "root count anomaly");
    alerts.publish(&Alert::new(AlertKind::RootCountAnomaly, message));
    roots
}
