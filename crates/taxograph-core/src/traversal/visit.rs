/// Per-traversal bookkeeping.
///
/// A [`VisitRecord`] is created fresh for each traversal and discarded with
/// it; graphs never retain one. Storage is slot-indexed: each nid the
/// traversal touches is lazily assigned a dense slot, so the same record
/// type serves every graph variant, and the sequence-indexed variant can
/// still pre-size the slot space from its capacity.
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::cycles::canonicalize;
use crate::newtypes::NodeId;

/// Tag of the per-node auxiliary set that accumulates a node's confirmed
/// distinct parents during depth-first convergence handling.
pub const MULTI_PARENT_SET: &str = "multi-parent";

// ---------------------------------------------------------------------------
// NodeStatus
// ---------------------------------------------------------------------------

/// Traversal lifecycle of a node. Transitions are monotonic:
/// `Undiscovered → Processing → Finished`, never backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Not yet reached.
    Undiscovered,
    /// Discovered; children not yet exhausted.
    Processing,
    /// All children expanded.
    Finished,
}

// ---------------------------------------------------------------------------
// VisitRecord
// ---------------------------------------------------------------------------

/// Bookkeeping written by one traversal and read by its caller.
///
/// Times come from a single logical clock that ticks on every discovery and
/// finish, so `discovery < finish` always holds for a finished node.
#[derive(Debug, Default)]
pub struct VisitRecord {
    slots: HashMap<NodeId, usize>,
    nids: Vec<NodeId>,
    status: Vec<NodeStatus>,
    discovery: Vec<Option<u32>>,
    finish: Vec<Option<u32>>,
    distance: Vec<Option<u32>>,
    predecessor: Vec<Option<NodeId>>,
    sibling_group: Vec<Option<u32>>,
    leaf: Vec<bool>,
    clock: u32,
    /// tag → node → members.
    user_node_sets: HashMap<String, HashMap<NodeId, BTreeSet<NodeId>>>,
    /// Discovered cycles in canonical rotation, in discovery order.
    cycles: Vec<Vec<NodeId>>,
    /// Sorted member sets of recorded cycles, for order-insensitive dedup.
    cycle_keys: HashSet<Vec<NodeId>>,
}

impl VisitRecord {
    /// Creates a record pre-sized for roughly `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(capacity),
            nids: Vec::with_capacity(capacity),
            status: Vec::with_capacity(capacity),
            discovery: Vec::with_capacity(capacity),
            finish: Vec::with_capacity(capacity),
            distance: Vec::with_capacity(capacity),
            predecessor: Vec::with_capacity(capacity),
            sibling_group: Vec::with_capacity(capacity),
            leaf: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    fn slot(&self, nid: NodeId) -> Option<usize> {
        self.slots.get(&nid).copied()
    }

    /// Slot of `nid`, assigning the next dense slot on first sight.
    pub fn slot_of(&mut self, nid: NodeId) -> usize {
        if let Some(slot) = self.slots.get(&nid) {
            return *slot;
        }
        let slot = self.nids.len();
        self.slots.insert(nid, slot);
        self.nids.push(nid);
        self.status.push(NodeStatus::Undiscovered);
        self.discovery.push(None);
        self.finish.push(None);
        self.distance.push(None);
        self.predecessor.push(None);
        self.sibling_group.push(None);
        self.leaf.push(false);
        slot
    }

    /// Current status of `nid`; unseen nids are `Undiscovered`.
    pub fn status(&self, nid: NodeId) -> NodeStatus {
        self.slot(nid)
            .map_or(NodeStatus::Undiscovered, |i| self.status[i])
    }

    /// Moves `nid` to `Processing` and stamps its discovery time.
    ///
    /// A no-op unless the node is still `Undiscovered`.
    pub fn mark_processing(&mut self, nid: NodeId) {
        let slot = self.slot_of(nid);
        if self.status[slot] == NodeStatus::Undiscovered {
            self.status[slot] = NodeStatus::Processing;
            self.discovery[slot] = Some(self.clock);
            self.clock += 1;
        }
    }

    /// Moves `nid` to `Finished` and stamps its finish time.
    ///
    /// A no-op unless the node is currently `Processing`.
    pub fn mark_finished(&mut self, nid: NodeId) {
        let slot = self.slot_of(nid);
        if self.status[slot] == NodeStatus::Processing {
            self.status[slot] = NodeStatus::Finished;
            self.finish[slot] = Some(self.clock);
            self.clock += 1;
        }
    }

    /// Discovery tick of `nid`, if discovered.
    pub fn discovery_time(&self, nid: NodeId) -> Option<u32> {
        self.slot(nid).and_then(|i| self.discovery[i])
    }

    /// Finish tick of `nid`, if finished.
    pub fn finish_time(&self, nid: NodeId) -> Option<u32> {
        self.slot(nid).and_then(|i| self.finish[i])
    }

    /// Edge distance from the traversal start, if assigned.
    pub fn distance(&self, nid: NodeId) -> Option<u32> {
        self.slot(nid).and_then(|i| self.distance[i])
    }

    pub fn set_distance(&mut self, nid: NodeId, distance: u32) {
        let slot = self.slot_of(nid);
        self.distance[slot] = Some(distance);
    }

    /// The node `nid` was first discovered from, if any.
    pub fn predecessor(&self, nid: NodeId) -> Option<NodeId> {
        self.slot(nid).and_then(|i| self.predecessor[i])
    }

    pub fn set_predecessor(&mut self, nid: NodeId, predecessor: NodeId) {
        let slot = self.slot_of(nid);
        self.predecessor[slot] = Some(predecessor);
    }

    /// Sibling-group id of `nid` (the slot of the parent it was expanded
    /// under), if assigned.
    pub fn sibling_group(&self, nid: NodeId) -> Option<u32> {
        self.slot(nid).and_then(|i| self.sibling_group[i])
    }

    pub fn set_sibling_group(&mut self, nid: NodeId, group: u32) {
        let slot = self.slot_of(nid);
        self.sibling_group[slot] = Some(group);
    }

    /// Returns `true` if `nid` was marked as having no children.
    pub fn is_leaf(&self, nid: NodeId) -> bool {
        self.slot(nid).is_some_and(|i| self.leaf[i])
    }

    pub fn mark_leaf(&mut self, nid: NodeId) {
        let slot = self.slot_of(nid);
        self.leaf[slot] = true;
    }

    /// Every nid this record has seen, sorted ascending.
    pub fn visited(&self) -> Vec<NodeId> {
        let mut all = self.nids.clone();
        all.sort_unstable();
        all
    }

    /// Number of nodes that reached `Finished`.
    pub fn finished_count(&self) -> usize {
        self.status
            .iter()
            .filter(|&&s| s == NodeStatus::Finished)
            .count()
    }

    // -----------------------------------------------------------------------
    // User node sets
    // -----------------------------------------------------------------------

    /// Adds `member` to the `tag` set of `node`. Returns `true` if it was
    /// not already present.
    pub fn add_to_node_set(&mut self, tag: &str, node: NodeId, member: NodeId) -> bool {
        self.user_node_sets
            .entry(tag.to_owned())
            .or_default()
            .entry(node)
            .or_default()
            .insert(member)
    }

    /// Removes `member` from the `tag` set of `node`. Returns `true` if it
    /// was present.
    pub fn remove_from_node_set(&mut self, tag: &str, node: NodeId, member: NodeId) -> bool {
        self.user_node_sets
            .get_mut(tag)
            .and_then(|per_node| per_node.get_mut(&node))
            .is_some_and(|members| members.remove(&member))
    }

    /// The `tag` set of `node`, if any member was ever added.
    pub fn node_set(&self, tag: &str, node: NodeId) -> Option<&BTreeSet<NodeId>> {
        self.user_node_sets
            .get(tag)
            .and_then(|per_node| per_node.get(&node))
    }

    // -----------------------------------------------------------------------
    // Cycles
    // -----------------------------------------------------------------------

    /// Records a discovered cycle.
    ///
    /// Members are canonicalized by rotating the minimum nid to the front;
    /// a cycle whose member set was already recorded (under any rotation or
    /// order) is dropped. Returns `true` if the cycle was new.
    pub fn record_cycle(&mut self, members: Vec<NodeId>) -> bool {
        if members.is_empty() {
            return false;
        }
        let canonical = canonicalize(members);
        let mut key = canonical.clone();
        key.sort_unstable();
        if !self.cycle_keys.insert(key) {
            return false;
        }
        self.cycles.push(canonical);
        true
    }

    /// Every distinct cycle recorded, in discovery order.
    pub fn cycles(&self) -> &[Vec<NodeId>] {
        &self.cycles
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    /// Status transitions are monotonic; regressions are ignored.
    #[test]
    fn test_status_is_monotonic() {
        let mut record = VisitRecord::default();
        assert_eq!(record.status(NodeId(1)), NodeStatus::Undiscovered);

        record.mark_finished(NodeId(1));
        assert_eq!(record.status(NodeId(1)), NodeStatus::Undiscovered);

        record.mark_processing(NodeId(1));
        assert_eq!(record.status(NodeId(1)), NodeStatus::Processing);
        record.mark_finished(NodeId(1));
        assert_eq!(record.status(NodeId(1)), NodeStatus::Finished);

        // Re-marking does not re-stamp the times.
        let finish = record.finish_time(NodeId(1));
        record.mark_processing(NodeId(1));
        record.mark_finished(NodeId(1));
        assert_eq!(record.finish_time(NodeId(1)), finish);
    }

    /// The clock orders discovery before finish, across nodes.
    #[test]
    fn test_clock_orders_events() {
        let mut record = VisitRecord::default();
        record.mark_processing(NodeId(1));
        record.mark_processing(NodeId(2));
        record.mark_finished(NodeId(2));
        record.mark_finished(NodeId(1));

        let d1 = record.discovery_time(NodeId(1)).expect("discovered");
        let d2 = record.discovery_time(NodeId(2)).expect("discovered");
        let f2 = record.finish_time(NodeId(2)).expect("finished");
        let f1 = record.finish_time(NodeId(1)).expect("finished");
        assert!(d1 < d2 && d2 < f2 && f2 < f1);
    }

    /// Slots are dense and stable across repeated lookups.
    #[test]
    fn test_slots_are_dense_and_stable() {
        let mut record = VisitRecord::with_capacity(4);
        assert_eq!(record.slot_of(NodeId(500)), 0);
        assert_eq!(record.slot_of(NodeId(-3)), 1);
        assert_eq!(record.slot_of(NodeId(500)), 0);
    }

    /// User node sets are keyed by tag and node independently.
    #[test]
    fn test_user_node_sets() {
        let mut record = VisitRecord::default();
        assert!(record.add_to_node_set(MULTI_PARENT_SET, NodeId(4), NodeId(2)));
        assert!(record.add_to_node_set(MULTI_PARENT_SET, NodeId(4), NodeId(3)));
        assert!(!record.add_to_node_set(MULTI_PARENT_SET, NodeId(4), NodeId(2)));

        let members = record
            .node_set(MULTI_PARENT_SET, NodeId(4))
            .expect("set exists");
        assert_eq!(members.len(), 2);

        assert!(record.remove_from_node_set(MULTI_PARENT_SET, NodeId(4), NodeId(3)));
        assert!(!record.remove_from_node_set(MULTI_PARENT_SET, NodeId(4), NodeId(3)));
        assert!(record.node_set("other", NodeId(4)).is_none());
    }

    /// Cycles dedup by member set regardless of rotation or order.
    #[test]
    fn test_cycle_dedup_by_member_set() {
        let mut record = VisitRecord::default();
        assert!(record.record_cycle(vec![NodeId(2), NodeId(3), NodeId(1)]));
        assert!(!record.record_cycle(vec![NodeId(3), NodeId(1), NodeId(2)]));
        assert!(!record.record_cycle(vec![NodeId(1), NodeId(2), NodeId(3)]));
        assert!(record.record_cycle(vec![NodeId(1), NodeId(2)]));

        assert_eq!(record.cycles().len(), 2);
        // Canonical rotation puts the minimum nid first, preserving order.
        assert_eq!(record.cycles()[0], vec![NodeId(1), NodeId(2), NodeId(3)]);
    }

    /// A degenerate one-member cycle records once.
    #[test]
    fn test_degenerate_cycle() {
        let mut record = VisitRecord::default();
        assert!(record.record_cycle(vec![NodeId(7)]));
        assert!(!record.record_cycle(vec![NodeId(7)]));
        assert!(!record.record_cycle(vec![]));
        assert_eq!(record.cycles(), &[vec![NodeId(7)]]);
    }
}
