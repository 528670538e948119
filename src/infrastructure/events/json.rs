//! JSON Event Sink
//!
//! Outputs deploy events as NDJSON for CI/automation consumption.

use crate::domain::ports::{DeployEvent, DeployEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

/// JSON form of one event.
pub fn event_to_json(event: &DeployEvent) -> serde_json::Value {
    match event {
        DeployEvent::HostStarted { address } => serde_json::json!({
            "event": "host_start",
            "address": address,
        }),

        DeployEvent::HostResolved { address, name } => serde_json::json!({
            "event": "host_resolved",
            "address": address,
            "name": name,
        }),

        DeployEvent::WorkComputed {
            host,
            programs,
            files,
            scripts,
            shell_change,
        } => serde_json::json!({
            "event": "work_computed",
            "host": host,
            "programs": programs,
            "files": files,
            "scripts": scripts,
            "shell_change": shell_change,
        }),

        DeployEvent::HostUpToDate { host } => serde_json::json!({
            "event": "host_up_to_date",
            "host": host,
        }),

        DeployEvent::StageStarted { host, stage, items } => serde_json::json!({
            "event": "stage_start",
            "host": host,
            "stage": stage,
            "items": items,
        }),

        DeployEvent::StageSucceeded {
            host,
            stage,
            output,
        } => serde_json::json!({
            "event": "stage_success",
            "host": host,
            "stage": stage,
            "output": output,
        }),

        DeployEvent::StageFailed {
            host,
            stage,
            exit_code,
            output,
        } => serde_json::json!({
            "event": "stage_failure",
            "host": host,
            "stage": stage,
            "exit_code": exit_code,
            "output": output,
        }),

        DeployEvent::ScriptSkipped {
            host,
            script,
            reason,
        } => serde_json::json!({
            "event": "script_skipped",
            "host": host,
            "script": script,
            "reason": reason,
        }),

        DeployEvent::HostCompleted { host } => serde_json::json!({
            "event": "host_complete",
            "host": host,
            "status": "success",
        }),

        DeployEvent::HostFailed {
            host,
            stage,
            message,
        } => serde_json::json!({
            "event": "host_complete",
            "host": host,
            "status": "failed",
            "stage": stage,
            "error": message,
        }),
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        self.write_event(event_to_json(&event));
    }
}
