//! Per-process registry of threads and counters.

use super::counter::Counter;
use super::thread::Thread;
use std::collections::BTreeMap;

/// One traced process: its threads keyed by tid and counters keyed by
/// their full name.
#[derive(Debug, Default)]
pub struct Process {
    /// Process id from the trace
    pub pid: u64,

    /// Threads by tid
    pub threads: BTreeMap<u64, Thread>,

    /// Counters by full name (`category.name`)
    pub counters: BTreeMap<String, Counter>,
}

impl Process {
    pub fn new(pid: u64) -> Self {
        Self {
            pid,
            ..Self::default()
        }
    }

    /// Get or lazily create a thread track
    pub fn thread_mut(&mut self, tid: u64) -> &mut Thread {
        self.threads.entry(tid).or_insert_with(|| Thread::new(tid))
    }

    /// Get or lazily create a counter under `category.name`
    pub fn counter_mut(&mut self, category: &str, name: &str) -> &mut Counter {
        let key = Self::counter_key(category, name);
        self.counters
            .entry(key)
            .or_insert_with(|| Counter::new(category.to_string(), name.to_string()))
    }

    /// Remove a counter, used when its first sample turns out to be unusable
    pub fn remove_counter(&mut self, category: &str, name: &str) -> Option<Counter> {
        self.counters.remove(&Self::counter_key(category, name))
    }

    fn counter_key(category: &str, name: &str) -> String {
        format!("{}.{}", category, name)
    }
}
