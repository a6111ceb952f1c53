//! CLI command implementations.

pub mod inspect;

pub use inspect::{execute_inspect, InspectArgs};
