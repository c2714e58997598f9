//! Implementation of `taxograph ancestors <file> <nid>`.
//!
//! Builds the graph, extracts the ancestor subtree of the given node, and
//! writes its ancestor closure to stdout.
//!
//! Output (human mode): one ancestor nid per line, sorted for determinism.
//! Output (JSON mode): `{"node": N, "ancestors": [...], "count": N}`.
//!
//! Exit codes: 0 = success, 1 = node not in the graph, 2 = read/parse
//! failure.
use std::io::Write;
use std::path::Path;

use taxograph_core::{NodeId, Taxonomy};

use crate::OutputFormat;
use crate::error::CliError;
use crate::io::load_edges;

/// Runs the `ancestors` command.
pub fn run(path: &Path, nid: i32, format: &OutputFormat) -> Result<(), CliError> {
    let edges = load_edges(path)?;
    let graph = super::build_graph(&edges);

    let focus = NodeId(nid);
    if !graph.contains(focus) {
        return Err(CliError::NodeNotFound { nid });
    }

    let subtree = graph.create_ancestor_subtree(focus);
    let ancestors: Vec<NodeId> = subtree
        .nodes()
        .into_iter()
        .filter(|&node| node != focus)
        .collect();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = match format {
        OutputFormat::Human => ancestors
            .iter()
            .try_for_each(|ancestor| writeln!(out, "{ancestor}")),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "node": focus,
                "ancestors": ancestors,
                "count": ancestors.len(),
            });
            writeln!(out, "{value}")
        }
    };
    report.map_err(|e| CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    })
}
