//! Implementation of `taxograph check <file>`.
//!
//! Builds the graph from the edge list, verifies the single-root invariant,
//! runs the depth-first detection pass from the first root, and reports
//! counts, roots, cycles, and any alerts raised along the way.
//!
//! Output (human mode): `key: value` summary lines to stdout; alerts go to
//! stderr as `warning:` lines.
//! Output (JSON mode): one object with `nodes`, `edges`, `roots`, `cycles`,
//! and `alerts`.
//!
//! Exit codes: 0 = clean, 1 = cycles present, 2 = read/parse failure.
use std::io::Write;
use std::path::Path;

use taxograph_core::{
    CollectingChannel, NidDescriber, NodeId, PremiseType, Taxonomy, TraversalEngine, ViewContext,
    verify_root_count,
};

use crate::OutputFormat;
use crate::error::CliError;
use crate::io::load_edges;

/// Runs the `check` command.
pub fn run(path: &Path, format: &OutputFormat) -> Result<(), CliError> {
    let edges = load_edges(path)?;
    let graph = super::build_graph(&edges);
    let view = ViewContext::new(PremiseType::Stated, &NidDescriber);
    let alerts = CollectingChannel::new();

    let roots = verify_root_count(&graph, &view, &alerts);
    let start = roots
        .first()
        .copied()
        .or_else(|| graph.nodes().first().copied());
    let cycles: Vec<Vec<NodeId>> = match start {
        Some(start) => {
            let engine = TraversalEngine::new(&graph, &view, &alerts);
            engine.depth_first(start, |_, _| {}).cycles().to_vec()
        }
        None => Vec::new(),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = match format {
        OutputFormat::Human => {
            for alert in alerts.published() {
                eprintln!("warning: {}", alert.message);
            }
            writeln!(
                out,
                "nodes: {}\nedges: {}\nroots: {}\ncycles: {}",
                graph.node_count(),
                graph.edge_count(),
                view.describe_all(&roots),
                cycles.len()
            )
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "nodes": graph.node_count(),
                "edges": graph.edge_count(),
                "roots": roots,
                "cycles": cycles,
                "alerts": alerts.published(),
            });
            writeln!(out, "{value}")
        }
    };
    report.map_err(|e| CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    })?;

    if cycles.is_empty() {
        Ok(())
    } else {
        Err(CliError::CyclesRemain {
            count: cycles.len(),
        })
    }
}
