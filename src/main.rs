//! Trace Timeline CLI
//!
//! Imports trace-event-formatted files into a timeline model and reports
//! what was found: processes, threads, slice tracks, counters, and any
//! import diagnostics.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

mod commands;

use commands::{execute_inspect, InspectArgs};
use trace_timeline::importer::TraceData;
use trace_timeline::utils::config::SCHEMA_VERSION;

/// Trace Timeline - import trace-event streams into a timeline model
#[derive(Parser, Debug)]
#[command(name = "trace-timeline")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a trace file and summarize the resulting model
    Inspect {
        /// Path to the trace file
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for a JSON summary (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Shift all timestamps so the trace starts at zero
        #[arg(long)]
        shift_to_zero: bool,

        /// Print the per-thread breakdown to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Check whether a file looks importable, without importing it
    Check {
        /// Path to the trace file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Inspect {
            input,
            output,
            shift_to_zero,
            summary,
        } => {
            // Always print something when no file output was asked for
            let print_summary = summary || output.is_none();
            let args = InspectArgs {
                input,
                output_json: output,
                shift_to_zero,
                print_summary,
            };

            execute_inspect(args)?;
        }

        Commands::Check { file } => {
            check_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Run the importability sniff on a file and report the verdict
///
/// **Private** - internal command implementation
fn check_file(path: PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(&path)?;

    if TraceData::Text(text).can_import() {
        println!("✓ {} looks like trace-event data", path.display());
        Ok(())
    } else {
        anyhow::bail!("{} does not look like trace-event data", path.display())
    }
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("Trace Timeline v{}", env!("CARGO_PKG_VERSION"));
    println!("Summary Schema: v{}", SCHEMA_VERSION);
}
