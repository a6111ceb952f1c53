//! Configuration and constants shared across the crate.

/// Current summary output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// Wire-format field names (trace-event JSON format).
// These are fixed by the format and must not change.
/// Object form wraps the event array under this field
pub const TRACE_EVENTS_FIELD: &str = "traceEvents";
/// Argument key that marks a slice as non-nesting when set to "0"
pub const NON_NESTING_ARG: &str = "ui-nest";
/// Metadata event name that carries a thread display name
pub const THREAD_NAME_METADATA: &str = "thread_name";

/// Event timestamps arrive in microseconds; the model stores milliseconds
pub const MICROS_PER_MILLI: f64 = 1000.0;

/// Size of the fixed color palette that event names hash into
pub const PALETTE_SIZE: u32 = 30;
