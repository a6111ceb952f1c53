//! Trace-event importer.
//!
//! Consumes trace-event-formatted data (raw JSON text or an already
//! parsed value) in a single pass and populates a [`TimelineModel`]:
//! nested slice stacks per process/thread, non-nested slice tracks,
//! counters, and end-of-stream auto-close of unterminated spans.

use crate::color::ColorAssigner;
use crate::importer::event::{arg_value_to_string, Phase, Ptid, TraceEvent};
use crate::model::{Diagnostic, Slice, TimelineModel};
use crate::utils::config::{
    MICROS_PER_MILLI, NON_NESTING_ARG, THREAD_NAME_METADATA, TRACE_EVENTS_FIELD,
};
use crate::utils::error::ImportError;
use log::debug;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;

/// Event data handed to the importer.
///
/// Callers either load raw text from a file or receive a parsed value
/// over a messaging channel; both are accepted.
#[derive(Debug, Clone)]
pub enum TraceData {
    Text(String),
    Value(Value),
}

impl TraceData {
    /// Cheap feasibility check: does this look like trace-event data?
    ///
    /// Text is sniffed by its leading character only; no parse is
    /// attempted. Parsed values are accepted when they are an array whose
    /// first element carries a phase field, or an object wrapping such an
    /// array under `traceEvents`.
    pub fn can_import(&self) -> bool {
        match self {
            TraceData::Text(text) => text.starts_with('{') || text.starts_with('['),
            TraceData::Value(Value::Array(events)) => first_has_phase(events),
            TraceData::Value(Value::Object(obj)) => match obj.get(TRACE_EVENTS_FIELD) {
                Some(Value::Array(events)) => first_has_phase(events),
                _ => false,
            },
            TraceData::Value(_) => false,
        }
    }
}

fn first_has_phase(events: &[Value]) -> bool {
    events
        .first()
        .and_then(Value::as_object)
        .is_some_and(|e| e.contains_key("ph"))
}

/// Import trace events into the model.
///
/// **Public** - main entry point for importing
///
/// The model and color assigner are borrowed for the duration of the
/// call; all produced slices and counters belong to the model afterwards.
///
/// # Errors
/// * `ImportError::JsonError` - unparsable input text
/// * `ImportError::InvalidFormat` - parsed value is not an event array
///
/// Fatal errors abort before any model mutation. Non-fatal conditions
/// are recorded on the model as diagnostics and never stop the pass.
pub fn import_trace(
    model: &mut TimelineModel,
    colors: &mut ColorAssigner,
    data: TraceData,
) -> Result<(), ImportError> {
    let events = normalize_events(data)?;
    debug!("Importing {} trace events", events.len());

    let mut importer = TraceEventImporter {
        model,
        colors,
        thread_states: HashMap::new(),
    };
    importer.import_events(&events);
    Ok(())
}

/// Per-PTID transient state, alive for one import call only.
#[derive(Debug, Default)]
struct ThreadState {
    /// Currently-open nested slices, innermost last
    open_slices: Vec<Slice>,

    /// Currently-open non-nested slices by composite id
    open_non_nested: HashMap<String, Slice>,
}

struct TraceEventImporter<'a> {
    model: &'a mut TimelineModel,
    colors: &'a mut ColorAssigner,
    thread_states: HashMap<Ptid, ThreadState>,
}

impl TraceEventImporter<'_> {
    /// Walk the event array in order and write the discovered structures
    /// into the model.
    fn import_events(&mut self, events: &[TraceEvent]) {
        for event in events {
            let ptid = event.ptid();
            match Phase::from_code(&event.ph) {
                Some(Phase::Begin) => self.process_begin(ptid, event),
                Some(Phase::End) => self.process_end(ptid, event),
                Some(Phase::Instant) => {
                    // An instant is a zero-duration slice: a begin
                    // immediately closed by the same record.
                    self.process_begin(ptid, event);
                    self.process_end(ptid, event);
                }
                Some(Phase::Counter) => self.process_counter(event),
                Some(Phase::Metadata) => self.process_metadata(event),
                None => {
                    self.model.add_diagnostic(Diagnostic::warning(format!(
                        "Unrecognized event phase: {}({})",
                        event.ph, event.name
                    )));
                }
            }
        }

        let has_open_slices = self
            .thread_states
            .values()
            .any(|state| !state.open_slices.is_empty());
        if has_open_slices {
            self.auto_close_open_slices();
        }
    }

    /// Open a slice, either on the nested stack or in the non-nested map.
    fn process_begin(&mut self, ptid: Ptid, event: &TraceEvent) {
        let color_id = self.colors.color_for(&event.name);
        let mut slice = Slice::new(
            event.name.clone(),
            color_id,
            event.ts / MICROS_PER_MILLI,
            event.args.clone(),
        );
        if let Some(uts) = event.uts {
            slice.start_in_user_time = Some(uts / MICROS_PER_MILLI);
        }

        let state = self.thread_states.entry(ptid).or_default();
        if is_non_nesting(&event.args) {
            let slice_id = composite_slice_id(event);
            if state.open_non_nested.contains_key(&slice_id) {
                self.model.add_diagnostic(Diagnostic::error(format!(
                    "Event {} already open.",
                    slice_id
                )));
            }
            // Last begin wins; a previously-open duplicate is orphaned.
            state.open_non_nested.insert(slice_id, slice);
        } else {
            state.open_slices.push(slice);
        }
    }

    /// Close a slice and move it into the model.
    ///
    /// Nested closes are strictly LIFO on the PTID stack; the event name
    /// is never consulted. An end with nothing open is ignored, not an
    /// error: producers routinely emit orphan ends.
    fn process_end(&mut self, ptid: Ptid, event: &TraceEvent) {
        let end = event.ts / MICROS_PER_MILLI;
        let state = self.thread_states.entry(ptid).or_default();

        if is_non_nesting(&event.args) {
            let slice_id = composite_slice_id(event);
            let Some(mut slice) = state.open_non_nested.remove(&slice_id) else {
                return;
            };
            slice.duration = Some(end - slice.start);
            if let (Some(uts), Some(user_start)) = (event.uts, slice.start_in_user_time) {
                slice.duration_in_user_time = Some(uts / MICROS_PER_MILLI - user_start);
            }
            self.model
                .process_mut(ptid.pid)
                .thread_mut(ptid.tid)
                .add_non_nested_slice(slice);
        } else {
            let Some(mut slice) = state.open_slices.pop() else {
                return;
            };
            slice.duration = Some(end - slice.start);
            if let (Some(uts), Some(user_start)) = (event.uts, slice.start_in_user_time) {
                slice.duration_in_user_time = Some(uts / MICROS_PER_MILLI - user_start);
            }

            // Subrow placement equals the nesting depth at close time.
            let depth = state.open_slices.len();
            if let Some(parent) = state.open_slices.last_mut() {
                parent.sub_slices.push(slice.clone());
            }
            self.model
                .process_mut(ptid.pid)
                .thread_mut(ptid.tid)
                .subrow_mut(depth)
                .push(slice);
        }
    }

    /// Accumulate a counter sample.
    fn process_counter(&mut self, event: &TraceEvent) {
        let counter_name = match &event.id {
            Some(id) => format!("{}[{}]", event.name, arg_value_to_string(id)),
            None => event.name.clone(),
        };
        let category = event.cat.clone().unwrap_or_default();

        // A first sample with no arguments gives the counter no series to
        // track; report it and drop the counter from its process.
        {
            let counter = self
                .model
                .process_mut(event.pid)
                .counter_mut(&category, &counter_name);
            if counter.series_names.is_empty() && event.args.is_empty() {
                self.model
                    .process_mut(event.pid)
                    .remove_counter(&category, &counter_name);
                self.model.add_diagnostic(Diagnostic::error(format!(
                    "Expected counter {} to have at least one argument to use as a value.",
                    event.name
                )));
                return;
            }
        }

        let series_keys: Vec<String> = event.args.keys().cloned().collect();
        let counter = self
            .model
            .process_mut(event.pid)
            .counter_mut(&category, &counter_name);

        // The first sample fixes the series set, in argument order.
        if counter.series_names.is_empty() {
            for series_name in series_keys {
                let color_id = self
                    .colors
                    .color_for(&format!("{}.{}", counter_name, series_name));
                counter.series_names.push(series_name);
                counter.series_colors.push(color_id);
            }
        }

        counter.timestamps.push(event.ts / MICROS_PER_MILLI);
        for series_name in &counter.series_names {
            // Missing series values are zero-filled, never omitted.
            let value = event
                .args
                .get(series_name)
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            counter.samples.push(value);
        }
    }

    /// Handle an `M` event. Only `thread_name` is understood.
    fn process_metadata(&mut self, event: &TraceEvent) {
        if event.name == THREAD_NAME_METADATA {
            if let Some(name) = event.args.get("name").and_then(Value::as_str) {
                self.model
                    .process_mut(event.pid)
                    .thread_mut(event.tid)
                    .name = Some(name.to_string());
            }
        } else {
            self.model.add_diagnostic(Diagnostic::warning(format!(
                "Unrecognized metadata name: {}",
                event.name
            )));
        }
    }

    /// Forcibly close any slices still open at end of stream.
    ///
    /// A trace may end with open spans (process killed, deadlock,
    /// truncated capture). They are closed at the greatest timestamp seen
    /// anywhere in the model so the final tree stays bounded, and flagged
    /// `did_not_finish`. Open non-nested slices are abandoned instead.
    fn auto_close_open_slices(&mut self) {
        // The model only knows about closed data; open-slice timestamps
        // have to be folded in to find the true global maximum.
        self.model.update_bounds();

        let mut open_max: Option<f64> = None;
        for state in self.thread_states.values() {
            for slice in &state.open_slices {
                collect_timestamps(slice, &mut open_max);
            }
        }
        let Some(open_max) = open_max else {
            return;
        };
        let close_at = match self.model.max_timestamp {
            Some(bound) => bound.max(open_max),
            None => open_max,
        };

        // Unwind innermost-first so that subrow and parent placement
        // follow the same rules as a normal close. The thread states are
        // dead after this, so drain them.
        for (ptid, mut state) in std::mem::take(&mut self.thread_states) {
            while let Some(mut slice) = state.open_slices.pop() {
                slice.duration = Some(close_at - slice.start);
                slice.did_not_finish = true;

                let depth = state.open_slices.len();
                if let Some(parent) = state.open_slices.last_mut() {
                    parent.sub_slices.push(slice.clone());
                }
                self.model
                    .process_mut(ptid.pid)
                    .thread_mut(ptid.tid)
                    .subrow_mut(depth)
                    .push(slice);
            }
        }
    }
}

/// Fold a slice's start, its end when closed, and the same for all of
/// its descendants into the running maximum.
fn collect_timestamps(slice: &Slice, max: &mut Option<f64>) {
    note_max(max, slice.start);
    if let Some(end) = slice.end() {
        note_max(max, end);
    }
    for child in &slice.sub_slices {
        collect_timestamps(child, max);
    }
}

fn note_max(max: &mut Option<f64>, value: f64) {
    *max = Some(max.map_or(value, |m| m.max(value)));
}

/// Non-nesting is opted into per event via `args["ui-nest"] == "0"`.
fn is_non_nesting(args: &Map<String, Value>) -> bool {
    args.get(NON_NESTING_ARG).and_then(Value::as_str) == Some("0")
}

/// Composite id for a non-nested slice: the event name joined with every
/// argument value, in insertion order. At most one slice per id may be
/// open on a PTID at a time.
fn composite_slice_id(event: &TraceEvent) -> String {
    let mut id = event.name.clone();
    for value in event.args.values() {
        id.push(';');
        id.push_str(&arg_value_to_string(value));
    }
    id
}

/// Turn raw input into a flat event array, repairing truncated text
/// along the way.
fn normalize_events(data: TraceData) -> Result<Vec<TraceEvent>, ImportError> {
    let value = match data {
        TraceData::Text(text) => serde_json::from_str(&repair_truncated_array(&text))?,
        TraceData::Value(value) => value,
    };

    let events_value = match value {
        Value::Array(_) => value,
        // Some producers wrap the event array in a container object.
        Value::Object(mut obj) => obj.remove(TRACE_EVENTS_FIELD).ok_or_else(|| {
            ImportError::InvalidFormat(format!(
                "Object input carries no {} array",
                TRACE_EVENTS_FIELD
            ))
        })?,
        _ => {
            return Err(ImportError::InvalidFormat(
                "Trace must be a JSON array or an object wrapping one".to_string(),
            ))
        }
    };

    if !events_value.is_array() {
        return Err(ImportError::InvalidFormat(format!(
            "{} field is not an array",
            TRACE_EVENTS_FIELD
        )));
    }
    serde_json::from_value(events_value).map_err(ImportError::from)
}

/// Append the closing bracket some producers cannot guarantee.
///
/// Tracing implementations that stream events to disk may be killed
/// before writing the final `]`. If the text is obviously an array and
/// obviously unterminated (ignoring trailing whitespace), fix it up
/// before handing it to the JSON parser.
fn repair_truncated_array(text: &str) -> Cow<'_, str> {
    if text.starts_with('[') && !text.trim_end().ends_with(']') {
        let mut repaired = String::with_capacity(text.len() + 1);
        repaired.push_str(text);
        repaired.push(']');
        Cow::Owned(repaired)
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_can_import_text() {
        assert!(TraceData::Text("[{}]".to_string()).can_import());
        assert!(TraceData::Text("{\"traceEvents\":[]}".to_string()).can_import());
        assert!(!TraceData::Text("# tracer: nop".to_string()).can_import());
        assert!(!TraceData::Text(String::new()).can_import());
    }

    #[test]
    fn test_can_import_values() {
        assert!(TraceData::Value(json!([{"ph": "B"}])).can_import());
        assert!(TraceData::Value(json!({"traceEvents": [{"ph": "I"}]})).can_import());
        assert!(!TraceData::Value(json!([{"name": "no phase"}])).can_import());
        assert!(!TraceData::Value(json!([])).can_import());
        assert!(!TraceData::Value(json!({"traceEvents": {}})).can_import());
        assert!(!TraceData::Value(json!(42)).can_import());
    }

    #[test]
    fn test_repair_truncated_array() {
        assert_eq!(repair_truncated_array("[{\"ph\":\"B\"}"), "[{\"ph\":\"B\"}]");
        assert_eq!(repair_truncated_array("[{\"ph\":\"B\"}\n"), "[{\"ph\":\"B\"}\n]");
        assert_eq!(repair_truncated_array("[{\"ph\":\"B\"}\r\n"), "[{\"ph\":\"B\"}\r\n]");
        // Already terminated, with and without trailing newline
        assert_eq!(repair_truncated_array("[]"), "[]");
        assert_eq!(repair_truncated_array("[]\n"), "[]\n");
        // Not an array: left alone
        assert_eq!(repair_truncated_array("{\"a\":1"), "{\"a\":1");
    }

    #[test]
    fn test_normalize_unwraps_container() {
        let events = normalize_events(TraceData::Value(json!({
            "traceEvents": [{"ph": "B", "pid": 1, "tid": 1, "name": "f", "ts": 0}]
        })))
        .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "f");
    }

    #[test]
    fn test_normalize_rejects_scalars() {
        assert!(normalize_events(TraceData::Value(json!(3))).is_err());
        assert!(normalize_events(TraceData::Value(json!({"other": []}))).is_err());
    }

    #[test]
    fn test_composite_slice_id_uses_arg_order() {
        let event: TraceEvent = serde_json::from_value(json!({
            "ph": "B", "pid": 1, "tid": 1, "name": "paint", "ts": 0,
            "args": {"ui-nest": "0", "layer": 4}
        }))
        .unwrap();
        assert_eq!(composite_slice_id(&event), "paint;0;4");
    }

    #[test]
    fn test_is_non_nesting_requires_string_zero() {
        let nested: TraceEvent = serde_json::from_value(json!({
            "ph": "B", "pid": 1, "tid": 1, "name": "f", "ts": 0,
            "args": {"ui-nest": 0}
        }))
        .unwrap();
        assert!(!is_non_nesting(&nested.args));

        let non_nested: TraceEvent = serde_json::from_value(json!({
            "ph": "B", "pid": 1, "tid": 1, "name": "f", "ts": 0,
            "args": {"ui-nest": "0"}
        }))
        .unwrap();
        assert!(is_non_nesting(&non_nested.args));
    }
}
