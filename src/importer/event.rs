//! Raw trace-event records as they appear on the wire.
//!
//! Field names and phase codes are fixed by the trace-event JSON format
//! and must round-trip bit-for-bit with existing producers.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

/// One entry of the trace-event array.
///
/// Every field except `ph` is defaulted so that sparsely-populated
/// records from lenient producers still deserialize; semantic checks
/// happen during dispatch, not during parsing.
#[derive(Debug, Clone, Deserialize)]
pub struct TraceEvent {
    /// Phase code, e.g. "B", "E", "I", "C", "M"
    #[serde(default)]
    pub ph: String,

    /// Process id
    #[serde(default)]
    pub pid: u64,

    /// Thread id
    #[serde(default)]
    pub tid: u64,

    /// Event name
    #[serde(default)]
    pub name: String,

    /// Category, used to group counters
    #[serde(default)]
    pub cat: Option<String>,

    /// Timestamp in microseconds
    #[serde(default)]
    pub ts: f64,

    /// Optional user-time timestamp in microseconds
    #[serde(default)]
    pub uts: Option<f64>,

    /// Open-ended argument bag, insertion order preserved
    #[serde(default)]
    pub args: Map<String, Value>,

    /// Optional counter id, disambiguates counters sharing a name
    #[serde(default)]
    pub id: Option<Value>,
}

/// Composite process/thread key identifying one timeline track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ptid {
    pub pid: u64,
    pub tid: u64,
}

impl TraceEvent {
    pub fn ptid(&self) -> Ptid {
        Ptid {
            pid: self.pid,
            tid: self.tid,
        }
    }
}

impl fmt::Display for Ptid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pid, self.tid)
    }
}

/// Recognized event phases.
///
/// Unknown codes are not an enum variant: dispatch reports them as a
/// diagnostic and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Begin,
    End,
    Instant,
    Counter,
    Metadata,
}

impl Phase {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "B" => Some(Phase::Begin),
            "E" => Some(Phase::End),
            "I" => Some(Phase::Instant),
            "C" => Some(Phase::Counter),
            "M" => Some(Phase::Metadata),
            _ => None,
        }
    }
}

/// Render an argument value the way it contributes to a composite slice
/// id: bare strings stay bare, everything else serializes as JSON.
pub fn arg_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
