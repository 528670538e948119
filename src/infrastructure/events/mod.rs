//! Event Sink Implementations
//!
//! - JsonEventSink: NDJSON output for CI/automation
//!
//! The coloured console sink lives with the rest of the terminal UI in the
//! binary.

mod json;

pub use json::{event_to_json, JsonEventSink};
