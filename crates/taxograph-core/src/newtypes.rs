/// Integer newtype wrappers for the two identifier spaces the engine works in.
///
/// A [`NodeId`] (a "nid") is the stable, globally unique identifier a
/// terminology component keeps across rebuilds of the same underlying data.
/// A [`Sequence`] is a dense, 0-based index assigned per assemblage by an
/// identity service; it exists only so graph internals can use plain array
/// offsets and is never handed out of the core.
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Stable global identifier for a taxonomy member.
///
/// Opaque to the engine: the core never mints nids, it only stores and
/// translates them. Ordering is the ordering of the raw integer and carries
/// no semantic meaning beyond giving adjacency arrays a canonical sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub i32);

impl NodeId {
    /// Returns the raw nid value.
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for NodeId {
    fn from(raw: i32) -> Self {
        NodeId(raw)
    }
}

// ---------------------------------------------------------------------------
// Sequence
// ---------------------------------------------------------------------------

/// Dense 0-based per-assemblage array index derived from a [`NodeId`].
///
/// Valid only relative to the identity mapping (and assemblage) that produced
/// it. Used internally by the sequence-indexed graph variant; public query
/// results always speak [`NodeId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sequence(pub u32);

impl Sequence {
    /// Returns the sequence as a `usize` array offset.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Sequence {
    fn from(raw: u32) -> Self {
        Sequence(raw)
    }
}
