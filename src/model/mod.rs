//! The timeline data store populated by importers.
//!
//! A [`TimelineModel`] is a registry of processes (each owning threads and
//! counters), global min/max timestamp bounds, and the diagnostics
//! accumulated while importing. The importer is the sole writer for the
//! duration of one import call; afterwards the model is plain data owned
//! by the caller.

pub mod counter;
pub mod diagnostics;
pub mod process;
pub mod slice;
pub mod thread;

pub use counter::Counter;
pub use diagnostics::{Diagnostic, Severity};
pub use process::Process;
pub use slice::Slice;
pub use thread::Thread;

use std::collections::BTreeMap;

/// Registry of processes with global bounds and import diagnostics.
#[derive(Debug, Default)]
pub struct TimelineModel {
    /// Processes by pid
    pub processes: BTreeMap<u64, Process>,

    /// Smallest timestamp seen, in milliseconds
    pub min_timestamp: Option<f64>,

    /// Largest timestamp seen, in milliseconds
    pub max_timestamp: Option<f64>,

    import_diagnostics: Vec<Diagnostic>,
}

impl TimelineModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or lazily create a process entry
    pub fn process_mut(&mut self, pid: u64) -> &mut Process {
        self.processes
            .entry(pid)
            .or_insert_with(|| Process::new(pid))
    }

    /// Record a non-fatal import condition
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.import_diagnostics.push(diagnostic);
    }

    /// All diagnostics collected so far, in import order
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.import_diagnostics
    }

    /// Diagnostics rendered to text, for display at the boundary
    pub fn diagnostic_messages(&self) -> Vec<String> {
        self.import_diagnostics
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Recompute global bounds from everything currently in the model.
    ///
    /// Covers nested and non-nested slices (start and, when closed, end)
    /// and counter sample timestamps. Slices still held open by an
    /// importer are not in the model yet and so do not contribute.
    pub fn update_bounds(&mut self) {
        let mut min = None;
        let mut max = None;

        {
            let mut add = |value: f64| {
                min = Some(min.map_or(value, |m: f64| m.min(value)));
                max = Some(max.map_or(value, |m: f64| m.max(value)));
            };

            for process in self.processes.values() {
                for thread in process.threads.values() {
                    for slice in thread.iter_slices() {
                        add(slice.start);
                        if let Some(end) = slice.end() {
                            add(end);
                        }
                    }
                }
                for counter in process.counters.values() {
                    for &ts in &counter.timestamps {
                        add(ts);
                    }
                }
            }
        }

        self.min_timestamp = min;
        self.max_timestamp = max;
    }

    /// Translate all timestamps so the model minimum becomes zero.
    ///
    /// Durations are unaffected. Bounds are recomputed afterwards.
    pub fn shift_world_to_zero(&mut self) {
        self.update_bounds();
        let Some(shift) = self.min_timestamp else {
            return;
        };

        for process in self.processes.values_mut() {
            for thread in process.threads.values_mut() {
                for subrow in &mut thread.subrows {
                    for slice in subrow.iter_mut() {
                        shift_slice(slice, shift);
                    }
                }
                for slice in &mut thread.non_nested_slices {
                    shift_slice(slice, shift);
                }
            }
            for counter in process.counters.values_mut() {
                for ts in &mut counter.timestamps {
                    *ts -= shift;
                }
            }
        }

        self.update_bounds();
    }

    /// Total slice count across all processes and threads
    pub fn num_slices(&self) -> usize {
        self.processes
            .values()
            .flat_map(|p| p.threads.values())
            .map(Thread::num_slices)
            .sum()
    }

    /// All slices with the given name, across every track.
    ///
    /// Only top-level track entries are searched; children are reachable
    /// through their parent's `sub_slices`.
    pub fn find_slices_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Slice> {
        self.processes
            .values()
            .flat_map(|p| p.threads.values())
            .flat_map(Thread::iter_slices)
            .filter(move |s| s.name == name)
    }
}

fn shift_slice(slice: &mut Slice, shift: f64) {
    slice.start -= shift;
    for child in &mut slice.sub_slices {
        shift_slice(child, shift);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn closed_slice(name: &str, start: f64, duration: f64) -> Slice {
        let mut slice = Slice::new(name.to_string(), 0, start, Map::new());
        slice.duration = Some(duration);
        slice
    }

    #[test]
    fn test_update_bounds_covers_slices_and_counters() {
        let mut model = TimelineModel::new();
        model
            .process_mut(1)
            .thread_mut(1)
            .subrow_mut(0)
            .push(closed_slice("a", 2.0, 3.0));
        let counter = model.process_mut(1).counter_mut("cat", "ctr");
        counter.series_names.push("value".to_string());
        counter.series_colors.push(0);
        counter.timestamps.push(10.0);
        counter.samples.push(1.0);

        model.update_bounds();

        assert_eq!(model.min_timestamp, Some(2.0));
        assert_eq!(model.max_timestamp, Some(10.0));
    }

    #[test]
    fn test_shift_world_to_zero() {
        let mut model = TimelineModel::new();
        let mut parent = closed_slice("parent", 5.0, 4.0);
        parent.sub_slices.push(closed_slice("child", 6.0, 1.0));
        model.process_mut(1).thread_mut(1).subrow_mut(0).push(parent);

        model.shift_world_to_zero();

        assert_eq!(model.min_timestamp, Some(0.0));
        assert_eq!(model.max_timestamp, Some(4.0));
        let slice = &model.processes[&1].threads[&1].subrows[0][0];
        assert_eq!(slice.start, 0.0);
        assert_eq!(slice.duration, Some(4.0));
        assert_eq!(slice.sub_slices[0].start, 1.0);
    }

    #[test]
    fn test_shift_empty_model_is_noop() {
        let mut model = TimelineModel::new();
        model.shift_world_to_zero();
        assert_eq!(model.min_timestamp, None);
        assert_eq!(model.max_timestamp, None);
    }
}
