//! Deploy Event Port
//!
//! Provides an observable interface for deploy operations.
//! The core never prints; it emits these events and a sink renders them.

use crate::domain::value_objects::Stage;

/// Event emitted during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployEvent {
    /// Processing of a configured host started
    HostStarted { address: String },

    /// The canonical hostname of an address was learned
    HostResolved { address: String, name: String },

    /// Reconciliation finished
    WorkComputed {
        host: String,
        programs: usize,
        files: usize,
        scripts: usize,
        shell_change: bool,
    },

    /// Nothing outstanding; deployment skipped
    HostUpToDate { host: String },

    /// A stage is about to run. `items` names what it works on.
    StageStarted {
        host: String,
        stage: Stage,
        items: Vec<String>,
    },

    /// A batch finished with exit status 0
    StageSucceeded {
        host: String,
        stage: Stage,
        output: Vec<String>,
    },

    /// A batch returned a non-zero status
    StageFailed {
        host: String,
        stage: Stage,
        exit_code: i32,
        output: Vec<String>,
    },

    /// A script was not run or did not succeed; other scripts continue
    ScriptSkipped {
        host: String,
        script: String,
        reason: String,
    },

    /// All outstanding work was applied
    HostCompleted { host: String },

    /// The host could not be fully deployed
    HostFailed {
        host: String,
        stage: Option<Stage>,
        message: String,
    },
}

/// Trait for receiving deploy events
///
/// Implementations:
/// - `ConsoleEventSink`: coloured terminal output
/// - `JsonEventSink`: NDJSON event stream
/// - `NoopEventSink`: silent operation
pub trait DeployEventSink {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}
}
