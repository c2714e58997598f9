/// Edge-list file loading.
///
/// The input format is one `parent child` nid pair per line, whitespace
/// separated. Blank lines and lines starting with `#` are ignored; `#` also
/// starts a trailing comment.
use std::path::Path;

use taxograph_core::NodeId;

use crate::error::CliError;

/// Reads and parses an edge-list file.
pub fn load_edges(path: &Path) -> Result<Vec<(NodeId, NodeId)>, CliError> {
    if !path.exists() {
        return Err(CliError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| CliError::IoError {
        source: path.display().to_string(),
        detail: e.to_string(),
    })?;
    let edges = parse_edges(&content)?;
    tracing::debug!(path = %path.display(), edges = edges.len(), "edge list loaded");
    Ok(edges)
}

/// Parses edge-list text into `(parent, child)` pairs.
pub fn parse_edges(content: &str) -> Result<Vec<(NodeId, NodeId)>, CliError> {
    let mut edges = Vec::new();
    for (index, raw_line) in content.lines().enumerate() {
        let line = raw_line
            .split('#')
            .next()
            .unwrap_or_default()
            .trim();
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(CliError::ParseError {
                line: index + 1,
                detail: format!("expected two integers, found {} fields", fields.len()),
            });
        }
        let parent = parse_nid(fields[0], index + 1)?;
        let child = parse_nid(fields[1], index + 1)?;
        edges.push((parent, child));
    }
    Ok(edges)
}

fn parse_nid(field: &str, line: usize) -> Result<NodeId, CliError> {
    field
        .parse::<i32>()
        .map(NodeId)
        .map_err(|_| CliError::ParseError {
            line,
            detail: format!("'{field}' is not a valid nid"),
        })
}
