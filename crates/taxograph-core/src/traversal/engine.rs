/// Breadth-first and depth-first traversal over a taxonomy graph.
///
/// Both walks are iterative (explicit queue / work stack, no recursion) and
/// write their findings into a fresh [`VisitRecord`]. The breadth-first walk
/// is the verification pass: it assigns distances, predecessors, sibling
/// groups and leaf flags, and never re-expands a discovered node. The
/// depth-first walk is the analysis pass: it distinguishes legitimate
/// multi-parent convergence from cycles and is the only pass that detects
/// and records cycles.
use std::collections::{HashSet, VecDeque};

use crate::alerts::AlertChannel;
use crate::context::ViewContext;
use crate::cycles::{cycle_alert, extract_cycle};
use crate::graph::Taxonomy;
use crate::newtypes::NodeId;
use crate::traversal::visit::{MULTI_PARENT_SET, NodeStatus, VisitRecord};

/// Default ancestor-walk depth ceiling.
///
/// Clinical taxonomies run a few dozen levels deep at most; a walk that is
/// still descending past this many levels is treated as evidence of a cycle
/// rather than a legitimately deep hierarchy.
pub const DEFAULT_DEPTH_CEILING: u32 = 100;

/// Tunable traversal limits.
#[derive(Debug, Clone)]
pub struct TraversalConfig {
    /// Maximum depth the bounded ancestor walk descends before giving up.
    pub depth_ceiling: u32,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            depth_ceiling: DEFAULT_DEPTH_CEILING,
        }
    }
}

/// Outcome of the bounded ancestor walk.
///
/// Three-valued on purpose: exceeding the depth ceiling is neither a yes nor
/// a no, it is a signal that the parent chain may not terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncestorCheck {
    /// The ancestor is reachable upward from the node.
    Yes,
    /// The full parent closure was searched without finding the ancestor.
    No,
    /// The walk hit the depth ceiling before the closure was exhausted.
    DepthExceeded,
}

// ---------------------------------------------------------------------------
// TraversalEngine
// ---------------------------------------------------------------------------

/// Traversal façade over one graph, one view context and one alert channel.
pub struct TraversalEngine<'a, T: Taxonomy> {
    graph: &'a T,
    view: &'a ViewContext<'a>,
    alerts: &'a dyn AlertChannel,
    config: TraversalConfig,
}

impl<'a, T: Taxonomy> TraversalEngine<'a, T> {
    /// Creates an engine with the default configuration.
    pub fn new(graph: &'a T, view: &'a ViewContext<'a>, alerts: &'a dyn AlertChannel) -> Self {
        Self::with_config(graph, view, alerts, TraversalConfig::default())
    }

    /// Creates an engine with an explicit configuration.
    pub fn with_config(
        graph: &'a T,
        view: &'a ViewContext<'a>,
        alerts: &'a dyn AlertChannel,
        config: TraversalConfig,
    ) -> Self {
        Self {
            graph,
            view,
            alerts,
            config,
        }
    }

    /// Queue-based breadth-first walk from `start`.
    ///
    /// Each node is expanded exactly once: the first edge that reaches a
    /// node fixes its distance, predecessor and sibling group, and later
    /// edges into it are ignored. Cycles are therefore invisible to this
    /// pass, which is what makes it usable for verification on any graph.
    pub fn breadth_first(
        &self,
        start: NodeId,
        mut visit: impl FnMut(NodeId, &mut VisitRecord),
    ) -> VisitRecord {
        let mut record = VisitRecord::with_capacity(self.graph.node_count());
        let mut queue: VecDeque<NodeId> = VecDeque::new();

        record.mark_processing(start);
        record.set_distance(start, 0);
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            visit(current, &mut record);

            let children = self.graph.children_of(current);
            if children.is_empty() {
                record.mark_leaf(current);
            }
            let group = record.slot_of(current) as u32;
            let next_distance = record.distance(current).unwrap_or(0) + 1;
            for &child in children {
                if record.status(child) == NodeStatus::Undiscovered {
                    record.mark_processing(child);
                    record.set_distance(child, next_distance);
                    record.set_predecessor(child, current);
                    record.set_sibling_group(child, group);
                    queue.push_back(child);
                }
            }
            record.mark_finished(current);
        }

        tracing::debug!(
            %start,
            visited = record.visited().len(),
            "breadth-first pass complete"
        );
        record
    }

    /// Work-stack depth-first walk from `start`.
    ///
    /// Nodes move `Processing → Finished` with discovery and finish times
    /// from a shared clock; first discovery also fixes a node's distance
    /// (its depth below `start` along the discovering path) and
    /// predecessor. Re-encountering a `Processing` child is a back edge,
    /// so a cycle is extracted and recorded; re-encountering a `Finished`
    /// child is a convergence, which runs the multi-parent disambiguation
    /// step instead.
    pub fn depth_first(
        &self,
        start: NodeId,
        mut visit: impl FnMut(NodeId, &mut VisitRecord),
    ) -> VisitRecord {
        struct Frame {
            node: NodeId,
            next_child: usize,
        }

        let mut record = VisitRecord::with_capacity(self.graph.node_count());
        record.mark_processing(start);
        record.set_distance(start, 0);
        visit(start, &mut record);
        let mut stack = vec![Frame {
            node: start,
            next_child: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let current = frame.node;
            let children = self.graph.children_of(current);
            let Some(&child) = children.get(frame.next_child) else {
                record.mark_finished(current);
                stack.pop();
                continue;
            };
            frame.next_child += 1;

            match record.status(child) {
                NodeStatus::Undiscovered => {
                    let next_distance = record.distance(current).unwrap_or(0) + 1;
                    record.mark_processing(child);
                    record.set_distance(child, next_distance);
                    record.set_predecessor(child, current);
                    visit(child, &mut record);
                    stack.push(Frame {
                        node: child,
                        next_child: 0,
                    });
                }
                NodeStatus::Processing if child == current => {
                    tracing::warn!(%current, "node lists itself as its own child");
                    self.report_cycle(vec![current], &mut record);
                }
                NodeStatus::Processing => {
                    // The stack segment from the child up to the current
                    // frame is itself a cycle closed by this back edge.
                    let enclosing: Vec<NodeId> = stack
                        .iter()
                        .map(|f| f.node)
                        .skip_while(|&n| n != child)
                        .collect();
                    self.report_back_edge(start, current, child, enclosing, &mut record);
                }
                NodeStatus::Finished => {
                    self.converge(current, child, &mut record);
                }
            }
        }

        tracing::debug!(
            %start,
            visited = record.visited().len(),
            cycles = record.cycles().len(),
            "depth-first pass complete"
        );
        record
    }

    /// Walks parent arrays upward from `child` looking for `ancestor`,
    /// giving up past the configured depth ceiling.
    ///
    /// Used while cycles are still possible, where the unbounded walk on
    /// the graph trait could chase a malformed chain indefinitely far.
    pub fn bounded_is_descendent(&self, child: NodeId, ancestor: NodeId) -> AncestorCheck {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![(child, 0u32)];
        visited.insert(child);

        while let Some((node, depth)) = stack.pop() {
            if depth >= self.config.depth_ceiling {
                tracing::warn!(
                    %child,
                    %ancestor,
                    ceiling = self.config.depth_ceiling,
                    "ancestor walk exceeded the depth ceiling"
                );
                return AncestorCheck::DepthExceeded;
            }
            for &parent in self.graph.parents_of(node) {
                if parent == ancestor {
                    return AncestorCheck::Yes;
                }
                if visited.insert(parent) {
                    stack.push((parent, depth + 1));
                }
            }
        }
        AncestorCheck::No
    }

    /// Multi-parent convergence: `child` was reached again through
    /// `parent` after finishing under another parent.
    ///
    /// Maintains the child's multi-parent set: the new candidate is tested
    /// against each established parent in both directions. A parent that is
    /// an ancestor of another in the set is redundant and dropped;
    /// unrelated parents are all kept. A walk that exceeds the depth
    /// ceiling means the parent chain may be circular, so cycle extraction
    /// runs instead of a drop.
    fn converge(&self, parent: NodeId, child: NodeId, record: &mut VisitRecord) {
        if let Some(first) = record.predecessor(child) {
            record.add_to_node_set(MULTI_PARENT_SET, child, first);
        }

        let established: Vec<NodeId> = record
            .node_set(MULTI_PARENT_SET, child)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default();

        let mut keep_candidate = true;
        for other in established {
            if other == parent {
                continue;
            }
            match self.bounded_is_descendent(parent, other) {
                AncestorCheck::Yes => {
                    // `other` sits above the candidate; the candidate is the
                    // more specific parent.
                    record.remove_from_node_set(MULTI_PARENT_SET, child, other);
                }
                AncestorCheck::No => match self.bounded_is_descendent(other, parent) {
                    AncestorCheck::Yes => {
                        keep_candidate = false;
                    }
                    AncestorCheck::No => {}
                    AncestorCheck::DepthExceeded => {
                        self.extract_and_report(other, record);
                    }
                },
                AncestorCheck::DepthExceeded => {
                    self.extract_and_report(parent, record);
                }
            }
        }
        if keep_candidate {
            record.add_to_node_set(MULTI_PARENT_SET, child, parent);
        }
    }

    /// A `Processing` child was re-encountered: some cycle passes through
    /// it. Extraction runs from the traversal start (the reference walk);
    /// the enclosing stack segment covers back edges the start's
    /// lowest-parent walk cannot reach.
    fn report_back_edge(
        &self,
        start: NodeId,
        current: NodeId,
        child: NodeId,
        enclosing: Vec<NodeId>,
        record: &mut VisitRecord,
    ) {
        tracing::debug!(%current, %child, "back edge during depth-first pass");
        let limit = self.graph.node_count() + 1;
        if let Some(members) = extract_cycle(self.graph, start, limit) {
            self.report_cycle(members, record);
        }
        if !enclosing.is_empty() {
            self.report_cycle(enclosing, record);
        }
    }

    /// Bounded walk exceeded its ceiling around `node`; try to pin the
    /// cycle down by extraction.
    fn extract_and_report(&self, node: NodeId, record: &mut VisitRecord) {
        let limit = self.graph.node_count() + 1;
        if let Some(members) = extract_cycle(self.graph, node, limit) {
            self.report_cycle(members, record);
        }
    }

    /// Records `members` and publishes an alert if the cycle is new.
    fn report_cycle(&self, members: Vec<NodeId>, record: &mut VisitRecord) {
        if record.record_cycle(members.clone()) {
            let canonical = record.cycles().last().cloned().unwrap_or(members);
            self.alerts.publish(&cycle_alert(self.view, &canonical));
        }
    }
}
