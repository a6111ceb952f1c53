//! Trace Timeline
//!
//! Trace-event import and timeline model construction.
//!
//! Consumes trace-event-formatted data (the JSON wire format used by
//! trace-viewer style tools, with phase codes `B`, `E`, `I`, `C`, `M`)
//! and builds an in-memory [`model::TimelineModel`]: per-process,
//! per-thread slice hierarchies, non-nested slice tracks, and counters,
//! with unterminated spans resolved at end-of-stream.
//!
//! ```no_run
//! use trace_timeline::color::ColorAssigner;
//! use trace_timeline::importer::{import_trace, TraceData};
//! use trace_timeline::model::TimelineModel;
//!
//! let text = std::fs::read_to_string("trace.json").unwrap();
//! let mut model = TimelineModel::new();
//! let mut colors = ColorAssigner::new();
//! import_trace(&mut model, &mut colors, TraceData::Text(text)).unwrap();
//! model.update_bounds();
//! ```

pub mod color;
pub mod importer;
pub mod model;
pub mod output;
pub mod utils;
