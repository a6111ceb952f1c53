//! Event import: raw records in, timeline model out.
//!
//! This module handles:
//! - Deserializing trace-event wire records
//! - Normalizing the accepted input shapes (text, array, wrapped object)
//! - The single-pass dispatch loop over the event stream
//! - End-of-stream auto-close of unterminated spans

pub mod event;
pub mod trace_event;

// Re-export main types
pub use event::{Phase, Ptid, TraceEvent};
pub use trace_event::{import_trace, TraceData};
