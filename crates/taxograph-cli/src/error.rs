/// CLI error types with associated exit codes.
///
/// [`CliError`] is the top-level error type for the `taxograph` binary.
/// Every variant maps to a stable exit code (1 or 2) via
/// [`CliError::exit_code`]:
///
/// - Exit code **2** — input failure: the tool could not read or parse the
///   edge-list file at all. These errors terminate early before any graph
///   logic runs.
/// - Exit code **1** — logical failure: the tool ran to completion but the
///   result is a well-defined failure (cycles present, unknown node, etc.).
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CliError
// ---------------------------------------------------------------------------

/// All error conditions the `taxograph` CLI can produce.
#[derive(Debug)]
pub enum CliError {
    // --- Exit code 2: input failures ---
    /// A file argument could not be found on the filesystem.
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// A generic I/O error while reading the input.
    IoError {
        /// A human-readable label for the source.
        source: String,
        /// The underlying I/O error message.
        detail: String,
    },

    /// The edge-list file does not follow the `parent child` line format.
    ParseError {
        /// 1-based line number of the offending line.
        line: usize,
        /// What was wrong with it.
        detail: String,
    },

    // --- Exit code 1: logical failures ---
    /// The requested node does not exist in the built graph.
    NodeNotFound {
        /// The raw nid that was requested.
        nid: i32,
    },

    /// A check or repair run finished with cycles still present.
    CyclesRemain {
        /// Number of distinct cycles still present.
        count: usize,
    },

    /// The graph has no root to start a traversal from.
    NoRoot,
}

impl CliError {
    /// Returns the process exit code for this error.
    ///
    /// - `2` — input failure (file not found, parse error, etc.).
    /// - `1` — logical failure (cycles remain, node not found, etc.).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } | Self::IoError { .. } | Self::ParseError { .. } => 2,
            Self::NodeNotFound { .. } | Self::CyclesRemain { .. } | Self::NoRoot => 1,
        }
    }

    /// Returns a human-readable error message suitable for stderr.
    pub fn message(&self) -> String {
        match self {
            Self::FileNotFound { path } => {
                format!("error: file not found: {}", path.display())
            }
            Self::IoError { source, detail } => {
                format!("error: I/O error reading {source}: {detail}")
            }
            Self::ParseError { line, detail } => {
                format!("error: malformed edge list at line {line}: {detail}")
            }
            Self::NodeNotFound { nid } => {
                format!("error: node {nid} is not present in the graph")
            }
            Self::CyclesRemain { count } => {
                format!("error: {count} cycle(s) remain in the taxonomy")
            }
            Self::NoRoot => "error: the graph has no root to traverse from".to_owned(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for CliError {}
