//! Timed spans on a thread's timeline track.

use crate::color::ColorId;
use serde_json::{Map, Value};

/// A named timed span representing one unit of work.
///
/// A slice is open while its `duration` is `None`. Closed child slices
/// collect in `sub_slices` as their parent closes around them, so a root
/// slice carries its whole subtree once the import finishes.
#[derive(Debug, Clone)]
pub struct Slice {
    /// Display name of the slice
    pub name: String,

    /// Palette slot derived from the name
    pub color_id: ColorId,

    /// Start timestamp in milliseconds
    pub start: f64,

    /// Duration in milliseconds; `None` while the slice is still open
    pub duration: Option<f64>,

    /// Start in user time (ms), when the event carried a `uts` field
    pub start_in_user_time: Option<f64>,

    /// Duration in user time (ms)
    pub duration_in_user_time: Option<f64>,

    /// Arguments carried by the begin event, insertion order preserved
    pub args: Map<String, Value>,

    /// Closed child slices, in close order
    pub sub_slices: Vec<Slice>,

    /// Set only when the slice was forcibly closed at end of stream
    pub did_not_finish: bool,
}

impl Slice {
    pub fn new(name: String, color_id: ColorId, start: f64, args: Map<String, Value>) -> Self {
        Self {
            name,
            color_id,
            start,
            duration: None,
            start_in_user_time: None,
            duration_in_user_time: None,
            args,
            sub_slices: Vec::new(),
            did_not_finish: false,
        }
    }

    /// End timestamp in milliseconds, once the slice has closed
    pub fn end(&self) -> Option<f64> {
        self.duration.map(|d| self.start + d)
    }
}
