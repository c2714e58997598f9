/// Traversal passes and their bookkeeping.
pub mod engine;
pub mod visit;

pub use engine::{
    AncestorCheck, DEFAULT_DEPTH_CEILING, TraversalConfig, TraversalEngine,
};
pub use visit::{MULTI_PARENT_SET, NodeStatus, VisitRecord};
