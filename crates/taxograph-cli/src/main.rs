use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod cmd;
mod error;
mod io;

/// Output format for CLI commands.
#[derive(Clone, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default).
    Human,
    /// Structured JSON output.
    Json,
}

#[derive(Parser)]
#[command(name = "taxograph", about = "Taxonomy graph diagnostics over edge-list files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the graph and report roots, cycles, and counts
    Check {
        /// Path to an edge-list file (one `parent child` pair per line)
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// List the ancestors of a node (its path-to-root closure)
    Ancestors {
        /// Path to an edge-list file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// The nid to look up
        #[arg(value_name = "NID", allow_hyphen_values = true)]
        nid: i32,
        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Iteratively remove cycle edges until the taxonomy is clean
    Repair {
        /// Path to an edge-list file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Maximum number of single-edge resolution passes
        #[arg(long, default_value_t = 10)]
        max_passes: usize,
        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Print the taxograph-core library version
    Version,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Check { file, format } => cmd::check::run(&file, &format),
        Command::Ancestors { file, nid, format } => cmd::ancestors::run(&file, nid, &format),
        Command::Repair {
            file,
            max_passes,
            format,
        } => cmd::repair::run(&file, max_passes, &format),
        Command::Version => {
            println!("{}", taxograph_core::version());
            Ok(())
        }
    };

    if let Err(error) = result {
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
