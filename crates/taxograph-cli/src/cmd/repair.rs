//! Implementation of `taxograph repair <file>`.
//!
//! Builds the graph and iteratively resolves detected cycles, one edge per
//! pass, until the detection pass comes back clean or `--max-passes` is
//! exhausted.
//!
//! Output (human mode): one `removed edge P -> C` line per removal, then a
//! `remaining: N` summary.
//! Output (JSON mode): `{"removed": [{"parent": P, "child": C}], "remaining": N}`.
//!
//! Exit codes: 0 = clean after repair, 1 = cycles remain (or no root to
//! traverse from), 2 = read/parse failure.
use std::io::Write;
use std::path::Path;

use taxograph_core::{
    CollectingChannel, CycleError, NidDescriber, NodeId, PremiseType, Resolution, Taxonomy,
    TraversalConfig, TraversalEngine, ViewContext, resolve_cycle, verify_root_count,
};

use crate::OutputFormat;
use crate::error::CliError;
use crate::io::load_edges;

/// Runs the `repair` command.
pub fn run(path: &Path, max_passes: usize, format: &OutputFormat) -> Result<(), CliError> {
    let edges = load_edges(path)?;
    let mut graph = super::build_graph(&edges);
    let view = ViewContext::new(PremiseType::Stated, &NidDescriber);
    let alerts = CollectingChannel::new();
    let config = TraversalConfig::default();

    let roots = verify_root_count(&graph, &view, &alerts);
    let root = roots
        .first()
        .copied()
        .or_else(|| graph.nodes().first().copied())
        .ok_or(CliError::NoRoot)?;

    // (child, parent) pairs, as removed by the resolver.
    let mut removed: Vec<(NodeId, NodeId)> = Vec::new();
    for _pass in 0..max_passes {
        let engine = TraversalEngine::with_config(&graph, &view, &alerts, config.clone());
        let record = engine.depth_first(root, |_, _| {});
        let Some(members) = record.cycles().first().cloned() else {
            break;
        };

        let error = CycleError::new(members, super::ASSEMBLAGE, root, &view);
        match resolve_cycle(&mut graph, &error, &record, root, &view, &alerts, &config) {
            Resolution::Resolved { removed: edge } => removed.push(edge),
            Resolution::Unresolved {
                removed: Some(edge),
                ..
            } => removed.push(edge),
            Resolution::Unresolved { removed: None, .. } => break,
        }
    }

    let engine = TraversalEngine::with_config(&graph, &view, &alerts, config);
    let remaining = engine.depth_first(root, |_, _| {}).cycles().len();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = match format {
        OutputFormat::Human => removed
            .iter()
            .try_for_each(|&(child, parent)| writeln!(out, "removed edge {parent} -> {child}"))
            .and_then(|()| writeln!(out, "remaining: {remaining}")),
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = removed
                .iter()
                .map(|&(child, parent)| serde_json::json!({"parent": parent, "child": child}))
                .collect();
            let value = serde_json::json!({
                "removed": entries,
                "remaining": remaining,
            });
            writeln!(out, "{value}")
        }
    };
    report.map_err(|e| CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    })?;

    if remaining == 0 {
        Ok(())
    } else {
        Err(CliError::CyclesRemain { count: remaining })
    }
}
