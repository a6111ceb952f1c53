//! Multi-series numeric time series attached to a process.

use crate::color::ColorId;

/// A named counter with one or more value series.
///
/// The series set is established by the first sample and fixed from then
/// on. Samples are stored flattened: `samples` holds `num_series()` values
/// per timestamp, in series order.
#[derive(Debug, Default)]
pub struct Counter {
    /// Category the counter was reported under
    pub category: String,

    /// Counter name, including the `[id]` suffix when the event carried one
    pub name: String,

    /// Series names, in the argument order of the first sample
    pub series_names: Vec<String>,

    /// Palette slots, parallel to `series_names`
    pub series_colors: Vec<ColorId>,

    /// Sample timestamps in milliseconds
    pub timestamps: Vec<f64>,

    /// Flattened sample values, `num_series()` per timestamp
    pub samples: Vec<f64>,
}

impl Counter {
    pub fn new(category: String, name: String) -> Self {
        Self {
            category,
            name,
            ..Self::default()
        }
    }

    pub fn num_series(&self) -> usize {
        self.series_names.len()
    }

    pub fn num_samples(&self) -> usize {
        self.timestamps.len()
    }

    /// Value of one series at one sample index
    pub fn sample(&self, sample_index: usize, series_index: usize) -> f64 {
        self.samples[sample_index * self.num_series() + series_index]
    }
}
