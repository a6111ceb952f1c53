//! Per-thread timeline tracks.

use super::slice::Slice;

/// One thread's slices, grouped into subrows by nesting depth.
///
/// Subrow N holds slices that closed at nesting depth N; root slices land
/// in subrow 0. Non-nested slices live on their own track and never
/// participate in the depth accounting.
#[derive(Debug, Default)]
pub struct Thread {
    /// Thread id from the trace
    pub tid: u64,

    /// Display name, set by `thread_name` metadata events
    pub name: Option<String>,

    /// One lane per nesting depth
    pub subrows: Vec<Vec<Slice>>,

    /// Slices explicitly marked as non-nesting
    pub non_nested_slices: Vec<Slice>,
}

impl Thread {
    pub fn new(tid: u64) -> Self {
        Self {
            tid,
            ..Self::default()
        }
    }

    /// Get the subrow for a nesting depth, growing the lane list as needed
    pub fn subrow_mut(&mut self, depth: usize) -> &mut Vec<Slice> {
        if self.subrows.len() <= depth {
            self.subrows.resize_with(depth + 1, Vec::new);
        }
        &mut self.subrows[depth]
    }

    /// Add a closed slice to the non-nested track
    pub fn add_non_nested_slice(&mut self, slice: Slice) {
        self.non_nested_slices.push(slice);
    }

    /// Iterate every slice on this thread, nested and non-nested
    pub fn iter_slices(&self) -> impl Iterator<Item = &Slice> {
        self.subrows
            .iter()
            .flatten()
            .chain(self.non_nested_slices.iter())
    }

    /// Total number of slices across all tracks
    pub fn num_slices(&self) -> usize {
        self.iter_slices().count()
    }
}
