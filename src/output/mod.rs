//! Summary output formats.

pub mod json;
pub mod summary;

pub use json::{read_summary, write_summary};
pub use summary::ModelSummary;
