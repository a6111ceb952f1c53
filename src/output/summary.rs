//! Output JSON schema for model summaries.
//!
//! This defines the structure of summary files the CLI writes to disk.
//! Schema is versioned to allow future evolution.

use crate::model::{Severity, TimelineModel};
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Top-level summary structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Schema version for compatibility checking
    pub version: String,

    /// Global bounds in milliseconds, absent for an empty model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_timestamp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_timestamp: Option<f64>,

    /// Per-process breakdown
    pub processes: Vec<ProcessSummary>,

    /// Rendered import diagnostics, in import order
    pub diagnostics: Vec<DiagnosticSummary>,

    /// Timestamp when the summary was generated
    pub generated_at: String,
}

/// One process entry in the summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessSummary {
    pub pid: u64,
    pub threads: Vec<ThreadSummary>,
    pub counters: Vec<CounterSummary>,
}

/// One thread entry in the summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub tid: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Slices per subrow, index = nesting depth
    pub slices_per_subrow: Vec<usize>,

    pub non_nested_slices: usize,

    /// Slices that were force-closed at end of stream
    pub unfinished_slices: usize,
}

/// One counter entry in the summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterSummary {
    pub category: String,
    pub name: String,
    pub series: Vec<String>,
    pub num_samples: usize,
}

/// One diagnostic entry in the summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticSummary {
    pub severity: String,
    pub message: String,
}

impl ModelSummary {
    /// Build a summary from an imported model
    ///
    /// **Public** - used by commands to create final output
    pub fn from_model(model: &TimelineModel) -> Self {
        use chrono::Utc;

        let processes = model
            .processes
            .values()
            .map(|process| ProcessSummary {
                pid: process.pid,
                threads: process
                    .threads
                    .values()
                    .map(|thread| ThreadSummary {
                        tid: thread.tid,
                        name: thread.name.clone(),
                        slices_per_subrow: thread.subrows.iter().map(Vec::len).collect(),
                        non_nested_slices: thread.non_nested_slices.len(),
                        unfinished_slices: thread
                            .iter_slices()
                            .filter(|s| s.did_not_finish)
                            .count(),
                    })
                    .collect(),
                counters: process
                    .counters
                    .values()
                    .map(|counter| CounterSummary {
                        category: counter.category.clone(),
                        name: counter.name.clone(),
                        series: counter.series_names.clone(),
                        num_samples: counter.num_samples(),
                    })
                    .collect(),
            })
            .collect();

        let diagnostics = model
            .diagnostics()
            .iter()
            .map(|d| DiagnosticSummary {
                severity: d.severity.to_string(),
                message: d.message.clone(),
            })
            .collect();

        Self {
            version: SCHEMA_VERSION.to_string(),
            min_timestamp: model.min_timestamp,
            max_timestamp: model.max_timestamp,
            processes,
            diagnostics,
            generated_at: Utc::now().to_rfc3339(),
        }
    }

    /// Count of error-severity diagnostics, for exit-status decisions
    pub fn num_errors(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error.to_string())
            .count()
    }
}
