//! Inspect command implementation.
//!
//! The inspect command:
//! 1. Loads trace text from a file
//! 2. Imports it into a fresh timeline model
//! 3. Updates bounds (optionally shifting the world to zero)
//! 4. Prints a text summary and/or writes a JSON summary file

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use std::path::PathBuf;
use trace_timeline::color::ColorAssigner;
use trace_timeline::importer::{import_trace, TraceData};
use trace_timeline::model::TimelineModel;
use trace_timeline::output::{write_summary, ModelSummary};

/// Arguments for the inspect command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct InspectArgs {
    /// Path to the trace file
    pub input: PathBuf,

    /// Output path for the JSON summary (optional)
    pub output_json: Option<PathBuf>,

    /// Shift all timestamps so the trace starts at zero
    pub shift_to_zero: bool,

    /// Print the per-thread breakdown to stdout
    pub print_summary: bool,
}

/// Execute the inspect command
///
/// **Public** - main entry point called from main.rs
pub fn execute_inspect(args: InspectArgs) -> Result<()> {
    info!("Inspecting trace: {}", args.input.display());

    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let data = TraceData::Text(text);

    if !data.can_import() {
        bail!(
            "{} does not look like trace-event data",
            args.input.display()
        );
    }

    let mut model = TimelineModel::new();
    let mut colors = ColorAssigner::new();
    import_trace(&mut model, &mut colors, data).context("Failed to import trace")?;

    if args.shift_to_zero {
        debug!("Shifting world to zero");
        model.shift_world_to_zero();
    } else {
        model.update_bounds();
    }

    info!(
        "Imported {} slices across {} processes",
        model.num_slices(),
        model.processes.len()
    );

    let summary = ModelSummary::from_model(&model);
    if summary.num_errors() > 0 {
        warn!("Import finished with {} error(s)", summary.num_errors());
    }

    if args.print_summary {
        print_summary(&summary);
    }

    if let Some(path) = &args.output_json {
        write_summary(&summary, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Summary written to {}", path.display());
    }

    Ok(())
}

/// Print a human-readable breakdown to stdout
///
/// **Private** - internal command implementation
fn print_summary(summary: &ModelSummary) {
    match (summary.min_timestamp, summary.max_timestamp) {
        (Some(min), Some(max)) => {
            println!("Bounds: {:.3} ms .. {:.3} ms", min, max);
        }
        _ => println!("Bounds: (empty model)"),
    }

    for process in &summary.processes {
        println!("Process {}", process.pid);
        for thread in &process.threads {
            let name = thread.name.as_deref().unwrap_or("<unnamed>");
            let nested: usize = thread.slices_per_subrow.iter().sum();
            println!(
                "  Thread {} ({}): {} nested slices in {} subrows, {} non-nested, {} unfinished",
                thread.tid,
                name,
                nested,
                thread.slices_per_subrow.len(),
                thread.non_nested_slices,
                thread.unfinished_slices,
            );
        }
        for counter in &process.counters {
            println!(
                "  Counter {}.{}: {} series, {} samples",
                counter.category,
                counter.name,
                counter.series.len(),
                counter.num_samples,
            );
        }
    }

    if summary.diagnostics.is_empty() {
        println!("No import diagnostics");
    } else {
        println!("Import diagnostics:");
        for diagnostic in &summary.diagnostics {
            println!("  {}: {}", diagnostic.severity, diagnostic.message);
        }
    }
}
