/// Compact integer-keyed adjacency storage.
///
/// An [`AdjacencyMap`] maps an integer key (a [`NodeId`] or a [`Sequence`])
/// to a sorted, deduplicated array of [`NodeId`] values. It is the only
/// mutable structure touched during the parallel build phase, so every write
/// goes through an atomic per-key accumulate-and-merge: read the current
/// array (empty if absent), union it with the incoming values, store the
/// result. `DashMap`'s entry API holds the key's shard lock across the whole
/// read-merge-write step, so concurrent accumulations against the same key
/// cannot lose updates and accumulations against different keys proceed in
/// parallel.
///
/// # Invariant
///
/// Stored arrays are always sorted ascending with no duplicates. Membership
/// tests on query paths are therefore binary searches, and the finalize step
/// can copy arrays structurally without re-sorting.
use std::hash::Hash;

use dashmap::DashMap;

use crate::newtypes::{NodeId, Sequence};

// ---------------------------------------------------------------------------
// merge_sorted
// ---------------------------------------------------------------------------

/// Set-union of two sorted, deduplicated nid arrays.
///
/// This is the single merge function behind every accumulate and combine
/// path; its output upholds the sorted-no-duplicates invariant whenever its
/// inputs do.
pub fn merge_sorted(current: &[NodeId], incoming: &[NodeId]) -> Vec<NodeId> {
    let mut out = Vec::with_capacity(current.len() + incoming.len());
    let (mut i, mut j) = (0, 0);

    while i < current.len() && j < incoming.len() {
        match current[i].cmp(&incoming[j]) {
            std::cmp::Ordering::Less => {
                out.push(current[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(incoming[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(current[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&current[i..]);
    out.extend_from_slice(&incoming[j..]);
    out
}

// ---------------------------------------------------------------------------
// AdjacencyMap
// ---------------------------------------------------------------------------

/// Concurrent map from integer key to a sorted, deduplicated nid array.
///
/// Two aliases cover the two keying schemes the engine uses:
/// [`NidAdjacencyMap`] is keyed directly by [`NodeId`] and needs no identity
/// remapping; [`SequenceAdjacencyMap`] is keyed by the dense per-assemblage
/// [`Sequence`] space.
#[derive(Debug, Default)]
pub struct AdjacencyMap<K: Eq + Hash> {
    inner: DashMap<K, Vec<NodeId>>,
}

/// Adjacency store keyed directly by node identifier (no remapping).
pub type NidAdjacencyMap = AdjacencyMap<NodeId>;

/// Adjacency store keyed by dense per-assemblage sequence.
pub type SequenceAdjacencyMap = AdjacencyMap<Sequence>;

impl<K: Eq + Hash + Copy> AdjacencyMap<K> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Returns a copy of the array stored under `key`, or `None` if absent.
    pub fn get(&self, key: K) -> Option<Vec<NodeId>> {
        self.inner.get(&key).map(|entry| entry.clone())
    }

    /// Stores `values` under `key`, replacing any previous array.
    ///
    /// `values` must already be sorted ascending without duplicates.
    pub fn put(&self, key: K, values: Vec<NodeId>) {
        debug_assert!(values.windows(2).all(|w| w[0] < w[1]));
        self.inner.insert(key, values);
    }

    /// Atomically merges `values` into the array stored under `key` and
    /// returns the merged result.
    ///
    /// The read-union-store step runs under the key's shard lock, so
    /// concurrent calls against the same key serialize and none is lost.
    /// `values` must be sorted ascending without duplicates.
    pub fn accumulate_and_get(&self, key: K, values: &[NodeId]) -> Vec<NodeId> {
        debug_assert!(values.windows(2).all(|w| w[0] < w[1]));
        let mut entry = self.inner.entry(key).or_default();
        let merged = merge_sorted(&entry, values);
        entry.clone_from(&merged);
        merged
    }

    /// Number of keys with a stored array.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no key has a stored array.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Consumes the map, yielding every `(key, array)` pair.
    ///
    /// Used by the combine step to fold one builder's store into another.
    pub fn into_entries(self) -> impl Iterator<Item = (K, Vec<NodeId>)> {
        self.inner.into_iter()
    }
}

// ---------------------------------------------------------------------------
// SequenceSet
// ---------------------------------------------------------------------------

/// Compact membership bitset over the dense sequence space.
///
/// Backs the cached graph variant's O(1) node/parent/child count queries.
/// Grows on demand; `contains` beyond the allocated range is simply `false`.
#[derive(Debug, Clone, Default)]
pub struct SequenceSet {
    words: Vec<u64>,
    len: usize,
}

impl SequenceSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set pre-sized for sequences below `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(64)],
            len: 0,
        }
    }

    /// Inserts `seq`; returns `true` if it was not already present.
    pub fn insert(&mut self, seq: Sequence) -> bool {
        let (word, bit) = (seq.index() / 64, seq.index() % 64);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let mask = 1u64 << bit;
        if self.words[word] & mask == 0 {
            self.words[word] |= mask;
            self.len += 1;
            true
        } else {
            false
        }
    }

    /// Removes `seq`; returns `true` if it was present.
    pub fn remove(&mut self, seq: Sequence) -> bool {
        let (word, bit) = (seq.index() / 64, seq.index() % 64);
        if word >= self.words.len() {
            return false;
        }
        let mask = 1u64 << bit;
        if self.words[word] & mask != 0 {
            self.words[word] &= !mask;
            self.len -= 1;
            true
        } else {
            false
        }
    }

    /// Returns `true` if `seq` is in the set.
    pub fn contains(&self, seq: Sequence) -> bool {
        let (word, bit) = (seq.index() / 64, seq.index() % 64);
        word < self.words.len() && self.words[word] & (1u64 << bit) != 0
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates members in ascending sequence order.
    pub fn iter(&self) -> impl Iterator<Item = Sequence> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &bits)| {
            (0..64)
                .filter(move |bit| bits & (1u64 << bit) != 0)
                .map(move |bit| Sequence((w * 64 + bit) as u32))
        })
    }
}
