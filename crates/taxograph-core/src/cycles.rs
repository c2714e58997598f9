/// Cycle extraction, reporting and single-edge resolution.
///
/// Cycles are a data defect in a taxonomy, not a crash: detection produces
/// an immutable [`CycleError`] report and an alert, and the resolver removes
/// exactly one edge per invocation, re-validates, and reports the outcome
/// through the same channel. The graph stays usable throughout.
use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use crate::alerts::{Alert, AlertChannel, AlertKind};
use crate::context::ViewContext;
use crate::graph::{Taxonomy, TaxonomyEdit};
use crate::newtypes::NodeId;
use crate::traversal::{TraversalConfig, TraversalEngine, VisitRecord};

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Rotates a cycle so its minimum nid comes first, preserving cyclic order.
///
/// The canonical rotation makes equal cycles compare equal regardless of
/// where the walk entered them.
pub fn canonicalize(mut members: Vec<NodeId>) -> Vec<NodeId> {
    let min = members
        .iter()
        .enumerate()
        .min_by_key(|&(_, nid)| nid)
        .map(|(pos, _)| pos);
    if let Some(pos) = min {
        members.rotate_left(pos);
    }
    members
}

/// Walks parent arrays upward from `start`, one parent per step (always the
/// lowest-numbered one, for determinism), until a node repeats or `limit`
/// steps pass.
///
/// On a repeat, the segment walked since the first encounter of that node
/// is a cycle; it is returned in edge order (parent before child) under the
/// canonical rotation. Returns `None` when the walk reaches a parentless
/// node or runs out of steps.
pub fn extract_cycle<T: Taxonomy>(graph: &T, start: NodeId, limit: usize) -> Option<Vec<NodeId>> {
    let mut order: Vec<NodeId> = Vec::new();
    let mut seen: HashMap<NodeId, usize> = HashMap::new();
    let mut current = start;

    for _ in 0..=limit {
        if let Some(&pos) = seen.get(&current) {
            // The walk ran child → parent, so reverse into edge order.
            let mut members: Vec<NodeId> = order[pos..].to_vec();
            members.reverse();
            return Some(canonicalize(members));
        }
        seen.insert(current, order.len());
        order.push(current);
        current = *graph.parents_of(current).first()?;
    }
    None
}

/// Formats the cycle alert published for a newly discovered cycle.
pub fn cycle_alert(view: &ViewContext<'_>, members: &[NodeId]) -> Alert {
    Alert::new(
        AlertKind::CycleDetected,
        format!(
            "cycle detected in the {} view among: {}",
            view.premise(),
            view.describe_all(members)
        ),
    )
}

// ---------------------------------------------------------------------------
// CycleError
// ---------------------------------------------------------------------------

/// Immutable report of one discovered cycle.
///
/// Produced once at detection time and never mutated; the resolver reads it
/// and retracts its alert on success.
#[derive(Debug, Clone)]
pub struct CycleError {
    /// Cycle members in canonical rotation, edge order.
    members: Vec<NodeId>,
    /// Assemblage the graph was scoped to.
    assemblage: NodeId,
    /// Node the discovering traversal started from.
    start: NodeId,
    /// The alert published when the cycle was discovered.
    alert: Alert,
}

impl CycleError {
    /// Builds the report, canonicalizing `members` and formatting the alert
    /// through the view context.
    pub fn new(
        members: Vec<NodeId>,
        assemblage: NodeId,
        start: NodeId,
        view: &ViewContext<'_>,
    ) -> Self {
        let members = canonicalize(members);
        let alert = cycle_alert(view, &members);
        Self {
            members,
            assemblage,
            start,
            alert,
        }
    }

    /// Cycle members in canonical rotation, edge order.
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

    pub fn assemblage(&self) -> NodeId {
        self.assemblage
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    /// The alert published at detection time.
    pub fn alert(&self) -> &Alert {
        &self.alert
    }

    /// The parent of `member` within the cycle: its predecessor in edge
    /// order, wrapping at the front. `None` if `member` is not in the
    /// cycle.
    pub fn parent_in_cycle(&self, member: NodeId) -> Option<NodeId> {
        let pos = self.members.iter().position(|&m| m == member)?;
        let parent_pos = if pos == 0 {
            self.members.len() - 1
        } else {
            pos - 1
        };
        Some(self.members[parent_pos])
    }

    /// The child of `member` within the cycle: its successor in edge order,
    /// wrapping at the end. `None` if `member` is not in the cycle.
    pub fn child_in_cycle(&self, member: NodeId) -> Option<NodeId> {
        let pos = self.members.iter().position(|&m| m == member)?;
        Some(self.members[(pos + 1) % self.members.len()])
    }
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cycle among {} members in assemblage {}: {}",
            self.members.len(),
            self.assemblage,
            self.alert.message
        )
    }
}

impl Error for CycleError {}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Outcome of one resolver invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The edge was removed and no cycles remain reachable from the root.
    Resolved {
        /// The removed edge as (child, parent).
        removed: (NodeId, NodeId),
    },
    /// The cycle could not be cleared in this invocation.
    Unresolved {
        /// The edge removed, if any.
        removed: Option<(NodeId, NodeId)>,
        /// Cycles still present after the removal.
        remaining: usize,
    },
}

/// Removes one edge of the reported cycle and re-validates the graph.
///
/// The victim is the member with the greatest recorded distance from the
/// traversal start (ties broken by nid). The edge removed is the one from
/// its in-cycle predecessor down to it: the deepest member is detached
/// from its cyclic parent. If nothing else points at the detached member
/// it surfaces as an extra root, which the post-repair breadth-first pass
/// makes visible through its reachable-node count.
///
/// Re-validation runs the depth-first pass from `root` for cycle presence
/// (alerting any still-present cycles as it goes) and the breadth-first pass
/// for reachability. On success the original alert is retracted and a
/// success notice published; otherwise a resolution-failure alert is
/// published. Exactly one edge is removed per invocation.
pub fn resolve_cycle<T: TaxonomyEdit>(
    graph: &mut T,
    error: &CycleError,
    record: &VisitRecord,
    root: NodeId,
    view: &ViewContext<'_>,
    alerts: &dyn AlertChannel,
    config: &TraversalConfig,
) -> Resolution {
    let Some(&deepest) = error
        .members()
        .iter()
        .max_by_key(|&&m| (record.distance(m).unwrap_or(0), m))
    else {
        alerts.publish(&Alert::new(
            AlertKind::ResolutionFailed,
            "cycle report has no members",
        ));
        return Resolution::Unresolved {
            removed: None,
            remaining: 0,
        };
    };
    // parent_in_cycle is total over members(), so this cannot miss.
    let Some(parent) = error.parent_in_cycle(deepest) else {
        alerts.publish(&Alert::new(
            AlertKind::ResolutionFailed,
            format!("no in-cycle parent found for {}", view.describe(deepest)),
        ));
        return Resolution::Unresolved {
            removed: None,
            remaining: 0,
        };
    };

    if !graph.remove_parent(deepest, parent) {
        alerts.publish(&Alert::new(
            AlertKind::ResolutionFailed,
            format!(
                "edge from {} down to {} was already absent",
                view.describe(parent),
                view.describe(deepest)
            ),
        ));
        return Resolution::Unresolved {
            removed: None,
            remaining: 0,
        };
    }
    tracing::info!(%parent, child = %deepest, "removed the deepest member's in-cycle parent edge");

    let engine = TraversalEngine::with_config(&*graph, view, alerts, config.clone());
    let check = engine.depth_first(root, |_, _| {});
    let reach = engine.breadth_first(root, |_, _| {});

    if check.cycles().is_empty() {
        alerts.retract(error.alert());
        alerts.publish(&Alert::new(
            AlertKind::ResolutionSucceeded,
            format!(
                "removed edge from {} to {}; no cycles remain; {} nodes reachable from {}",
                view.describe(parent),
                view.describe(deepest),
                reach.finished_count(),
                view.describe(root)
            ),
        ));
        Resolution::Resolved {
            removed: (deepest, parent),
        }
    } else {
        let remaining = check.cycles().len();
        alerts.publish(&Alert::new(
            AlertKind::ResolutionFailed,
            format!(
                "removed edge from {} to {}, but {} cycle(s) remain",
                view.describe(parent),
                view.describe(deepest),
                remaining
            ),
        ));
        Resolution::Unresolved {
            removed: Some((deepest, parent)),
            remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;
    use crate::alerts::CollectingChannel;
    use crate::builder::GraphBuilder;
    use crate::context::{NidDescriber, PremiseType};
    use crate::graph::CompactGraph;

    const ASSEMBLAGE: NodeId = NodeId(-10);

    fn view() -> ViewContext<'static> {
        ViewContext::new(PremiseType::Stated, &NidDescriber)
    }

    fn graph_of(edges: &[(i32, i32)]) -> CompactGraph {
        let builder = GraphBuilder::new(1);
        for &(parent, child) in edges {
            builder.add(NodeId(parent), NodeId(child));
        }
        builder.finalize_compact(ASSEMBLAGE)
    }

    /// Canonical rotation brings the minimum nid to the front without
    /// changing the cyclic order.
    #[test]
    fn test_canonicalize_rotates() {
        let rotated = canonicalize(vec![NodeId(5), NodeId(1), NodeId(9)]);
        assert_eq!(rotated, vec![NodeId(1), NodeId(9), NodeId(5)]);
        assert!(canonicalize(vec![]).is_empty());
    }

    /// Extraction from a node inside the cycle recovers the cycle in edge
    /// order.
    #[test]
    fn test_extract_cycle_in_edge_order() {
        let graph = graph_of(&[(1, 2), (2, 3), (3, 1)]);
        let members = extract_cycle(&graph, NodeId(2), 10).expect("cycle found");
        assert_eq!(members, vec![NodeId(1), NodeId(2), NodeId(3)]);
    }

    /// Extraction from below the cycle walks into it through the lowest
    /// parent and still recovers it.
    #[test]
    fn test_extract_cycle_from_below() {
        // 1 → 2 → 3 → 1 with a tail 1 → 4.
        let graph = graph_of(&[(1, 2), (2, 3), (3, 1), (1, 4)]);
        let members = extract_cycle(&graph, NodeId(4), 10).expect("cycle found");
        assert_eq!(members, vec![NodeId(1), NodeId(2), NodeId(3)]);
    }

    /// Extraction on an acyclic graph reaches a parentless node and yields
    /// nothing; a zero-step limit also yields nothing.
    #[test]
    fn test_extract_cycle_none_on_tree() {
        let graph = graph_of(&[(1, 2), (2, 3)]);
        assert!(extract_cycle(&graph, NodeId(3), 10).is_none());

        let cyclic = graph_of(&[(1, 2), (2, 1)]);
        assert!(extract_cycle(&cyclic, NodeId(1), 0).is_none());
    }

    /// The in-cycle parent of a member is its predecessor in edge order.
    #[test]
    fn test_parent_in_cycle() {
        let error = CycleError::new(
            vec![NodeId(1), NodeId(2), NodeId(3)],
            ASSEMBLAGE,
            NodeId(1),
            &view(),
        );
        assert_eq!(error.parent_in_cycle(NodeId(2)), Some(NodeId(1)));
        assert_eq!(error.parent_in_cycle(NodeId(3)), Some(NodeId(2)));
        assert_eq!(error.parent_in_cycle(NodeId(1)), Some(NodeId(3)));
        assert_eq!(error.parent_in_cycle(NodeId(9)), None);

        assert_eq!(error.child_in_cycle(NodeId(1)), Some(NodeId(2)));
        assert_eq!(error.child_in_cycle(NodeId(3)), Some(NodeId(1)));
        assert_eq!(error.child_in_cycle(NodeId(9)), None);
    }

    /// Resolving the reference cycle removes one edge, clears the cycle,
    /// retracts the detection alert and publishes a success notice.
    #[test]
    fn test_resolve_clears_cycle() {
        // Root 0 above the cycle 1 → 2 → 3 → 1.
        let mut graph = graph_of(&[(0, 1), (1, 2), (2, 3), (3, 1)]);
        let view = view();
        let alerts = CollectingChannel::new();
        let config = TraversalConfig::default();

        let engine = TraversalEngine::with_config(&graph, &view, &alerts, config.clone());
        let record = engine.depth_first(NodeId(0), |_, _| {});
        assert_eq!(record.cycles().len(), 1);

        let error = CycleError::new(record.cycles()[0].clone(), ASSEMBLAGE, NodeId(0), &view);
        let outcome = resolve_cycle(
            &mut graph,
            &error,
            &record,
            NodeId(0),
            &view,
            &alerts,
            &config,
        );

        // 3 is the deepest member; it is detached from its cyclic parent 2.
        assert_eq!(
            outcome,
            Resolution::Resolved {
                removed: (NodeId(3), NodeId(2))
            }
        );
        assert!(!graph.is_child_of(NodeId(3), NodeId(2)));
        assert_eq!(alerts.retracted(), vec![error.alert().clone()]);
        assert_eq!(alerts.published_of(AlertKind::ResolutionSucceeded).len(), 1);

        // A fresh detection pass finds nothing.
        let engine = TraversalEngine::with_config(&graph, &view, &alerts, config);
        let clean = engine.depth_first(NodeId(0), |_, _| {});
        assert!(clean.cycles().is_empty());
    }

    /// The deepest member is picked by recorded distance, not nid order;
    /// with nids running opposite to depth the resolver still detaches the
    /// member furthest from the root.
    #[test]
    fn test_resolve_picks_deepest_by_distance() {
        // 1 → 30 → 20 → 10 → 30: the deepest cycle member has the lowest nid.
        let mut graph = graph_of(&[(1, 30), (30, 20), (20, 10), (10, 30)]);
        let view = view();
        let alerts = CollectingChannel::new();
        let config = TraversalConfig::default();

        let engine = TraversalEngine::with_config(&graph, &view, &alerts, config.clone());
        let record = engine.depth_first(NodeId(1), |_, _| {});
        assert_eq!(record.cycles().len(), 1);

        let error = CycleError::new(record.cycles()[0].clone(), ASSEMBLAGE, NodeId(1), &view);
        let outcome = resolve_cycle(
            &mut graph,
            &error,
            &record,
            NodeId(1),
            &view,
            &alerts,
            &config,
        );

        // 10 sits at depth 3; its in-cycle parent is 20.
        assert_eq!(
            outcome,
            Resolution::Resolved {
                removed: (NodeId(10), NodeId(20))
            }
        );
        assert!(!graph.is_child_of(NodeId(10), NodeId(20)));
        assert!(graph.is_child_of(NodeId(30), NodeId(10)), "other cycle edges survive");
    }

    /// With two interlocking cycles one invocation removes exactly one edge
    /// and reports failure with the remaining count.
    #[test]
    fn test_resolve_reports_remaining_cycles() {
        // 0 → 1; cycles 1 → 2 → 1 and 1 → 3 → 1.
        let mut graph = graph_of(&[(0, 1), (1, 2), (2, 1), (1, 3), (3, 1)]);
        let view = view();
        let alerts = CollectingChannel::new();
        let config = TraversalConfig::default();

        let engine = TraversalEngine::with_config(&graph, &view, &alerts, config.clone());
        let record = engine.depth_first(NodeId(0), |_, _| {});
        assert_eq!(record.cycles().len(), 2);

        let error = CycleError::new(vec![NodeId(1), NodeId(2)], ASSEMBLAGE, NodeId(0), &view);
        let edges_before = graph.edge_count();
        let outcome = resolve_cycle(
            &mut graph,
            &error,
            &record,
            NodeId(0),
            &view,
            &alerts,
            &config,
        );

        assert_eq!(graph.edge_count(), edges_before - 1, "exactly one edge removed");
        match outcome {
            Resolution::Unresolved { removed, remaining } => {
                assert_eq!(removed, Some((NodeId(2), NodeId(1))));
                assert_eq!(remaining, 1);
            }
            Resolution::Resolved { .. } => {
                unreachable!("the second cycle must still be present")
            }
        }
        assert!(alerts.retracted().is_empty());
        assert_eq!(alerts.published_of(AlertKind::ResolutionFailed).len(), 1);
    }

    /// Resolving against an edge that is already gone fails without
    /// touching the graph.
    #[test]
    fn test_resolve_missing_edge_fails() {
        let mut graph = graph_of(&[(0, 1), (1, 2)]);
        let view = view();
        let alerts = CollectingChannel::new();
        let config = TraversalConfig::default();

        // A stale report about a cycle the graph no longer contains.
        let error = CycleError::new(vec![NodeId(5), NodeId(6)], ASSEMBLAGE, NodeId(0), &view);
        let record = VisitRecord::default();
        let outcome = resolve_cycle(
            &mut graph,
            &error,
            &record,
            NodeId(0),
            &view,
            &alerts,
            &config,
        );

        assert_eq!(
            outcome,
            Resolution::Unresolved {
                removed: None,
                remaining: 0
            }
        );
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(alerts.published_of(AlertKind::ResolutionFailed).len(), 1);
    }

    /// The error renders its member list through the display impl.
    #[test]
    fn test_cycle_error_display() {
        let error = CycleError::new(
            vec![NodeId(3), NodeId(1), NodeId(2)],
            ASSEMBLAGE,
            NodeId(1),
            &view(),
        );
        assert_eq!(error.members(), &[NodeId(1), NodeId(2), NodeId(3)]);
        let text = error.to_string();
        assert!(text.contains("3 members"));
        assert!(text.contains("-10"));
        assert!(text.contains("1, 2, 3"));
    }
}
