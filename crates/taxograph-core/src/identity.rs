/// Identity mapping between stable nids and dense per-assemblage sequences.
///
/// The engine never creates identifiers. The component store that feeds it
/// owns the nid↔sequence tables; this module defines the seam the engine
/// consumes them through ([`IdentityMapping`]) and a concurrent in-memory
/// implementation ([`DenseIdentityService`]) for tests and tooling that have
/// no store to lean on.
use dashmap::DashMap;

use crate::newtypes::{NodeId, Sequence};

// ---------------------------------------------------------------------------
// IdentityMapping
// ---------------------------------------------------------------------------

/// Translates nids to/from dense per-assemblage sequences.
///
/// Implemented by the surrounding component store and injected into the
/// engine wherever sequence-indexed storage is built. All methods are
/// read-only; a missing mapping is reported as `None`, never an error.
pub trait IdentityMapping: Send + Sync {
    /// Returns the dense sequence assigned to `nid` within `assemblage`.
    fn sequence_of(&self, nid: NodeId, assemblage: NodeId) -> Option<Sequence>;

    /// Returns the nid that `sequence` was assigned to within `assemblage`.
    fn nid_of_sequence(&self, sequence: Sequence, assemblage: NodeId) -> Option<NodeId>;

    /// Exclusive upper bound of the sequence space assigned for `assemblage`.
    ///
    /// Every assigned sequence is strictly below this value; an assemblage
    /// with no assignments reports 0.
    fn max_sequence(&self, assemblage: NodeId) -> u32;
}

// ---------------------------------------------------------------------------
// DenseIdentityService
// ---------------------------------------------------------------------------

/// Per-assemblage nid↔sequence table.
#[derive(Debug, Default)]
struct AssemblageTable {
    by_nid: std::collections::HashMap<NodeId, Sequence>,
    by_sequence: Vec<NodeId>,
}

/// In-memory [`IdentityMapping`] that assigns sequences densely in
/// registration order.
///
/// Registration is safe from multiple threads; each assemblage's table is
/// guarded by its `DashMap` shard lock. Re-registering a nid returns the
/// sequence it already holds.
#[derive(Debug, Default)]
pub struct DenseIdentityService {
    assemblages: DashMap<NodeId, AssemblageTable>,
}

impl DenseIdentityService {
    /// Creates a service with no assignments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sequence for `nid` in `assemblage`, assigning the next
    /// dense sequence if the nid is new.
    pub fn register(&self, nid: NodeId, assemblage: NodeId) -> Sequence {
        let mut table = self.assemblages.entry(assemblage).or_default();
        if let Some(&seq) = table.by_nid.get(&nid) {
            return seq;
        }
        let seq = Sequence(table.by_sequence.len() as u32);
        table.by_nid.insert(nid, seq);
        table.by_sequence.push(nid);
        seq
    }

    /// Registers every nid in `nids`, in order.
    pub fn register_all<I: IntoIterator<Item = NodeId>>(&self, nids: I, assemblage: NodeId) {
        for nid in nids {
            self.register(nid, assemblage);
        }
    }
}

impl IdentityMapping for DenseIdentityService {
    fn sequence_of(&self, nid: NodeId, assemblage: NodeId) -> Option<Sequence> {
        self.assemblages
            .get(&assemblage)
            .and_then(|table| table.by_nid.get(&nid).copied())
    }

    fn nid_of_sequence(&self, sequence: Sequence, assemblage: NodeId) -> Option<NodeId> {
        self.assemblages
            .get(&assemblage)
            .and_then(|table| table.by_sequence.get(sequence.index()).copied())
    }

    fn max_sequence(&self, assemblage: NodeId) -> u32 {
        self.assemblages
            .get(&assemblage)
            .map(|table| table.by_sequence.len() as u32)
            .unwrap_or(0)
    }
}
