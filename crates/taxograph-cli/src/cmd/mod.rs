/// Command module for the `taxograph` CLI.
///
/// Each submodule implements one subcommand. The `run` function in each
/// module takes the parsed arguments and returns `Ok(())` on success or a
/// [`crate::error::CliError`] on failure.
pub mod ancestors;
pub mod check;
pub mod repair;

use taxograph_core::{CompactGraph, NodeId, build_parallel};

/// Edge-list files carry no assemblage of their own; a fixed placeholder
/// scopes every CLI build.
pub const ASSEMBLAGE: NodeId = NodeId(-1);

/// Shard count for the parallel build phase.
const BUILD_SHARDS: usize = 4;

/// Builds the nid-keyed graph from a parsed edge list.
pub fn build_graph(edges: &[(NodeId, NodeId)]) -> CompactGraph {
    build_parallel(edges, BUILD_SHARDS).finalize_compact(ASSEMBLAGE)
}
