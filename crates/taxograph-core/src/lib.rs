#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod adjacency;
pub mod alerts;
pub mod builder;
pub mod context;
pub mod cycles;
pub mod graph;
pub mod identity;
pub mod newtypes;
pub mod traversal;

pub use adjacency::{AdjacencyMap, NidAdjacencyMap, SequenceAdjacencyMap, SequenceSet, merge_sorted};
pub use alerts::{Alert, AlertChannel, AlertKind, CollectingChannel, TracingAlertChannel};
pub use builder::{GraphBuilder, build_parallel, verify_root_count};
pub use context::{NidDescriber, NodeDescriber, PremiseType, ViewContext};
pub use cycles::{CycleError, Resolution, canonicalize, cycle_alert, extract_cycle, resolve_cycle};
pub use graph::{AncestorGraph, CachedGraph, CompactGraph, Taxonomy, TaxonomyEdit};
pub use identity::{DenseIdentityService, IdentityMapping};
pub use newtypes::{NodeId, Sequence};
pub use traversal::{
    AncestorCheck, DEFAULT_DEPTH_CEILING, MULTI_PARENT_SET, NodeStatus, TraversalConfig,
    TraversalEngine, VisitRecord,
};

/// Returns the current version of the taxograph-core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
