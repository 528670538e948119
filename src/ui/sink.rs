//! Console event sink.

use std::io::Write;

use scd::domain::ports::{DeployEvent, DeployEventSink};

use crate::ui::terminal::TerminalCapabilities;
use crate::ui::views::deploy::render_event;

/// Prints deploy events as they happen.
pub struct ConsoleEventSink {
    caps: TerminalCapabilities,
    verbose: u8,
}

impl ConsoleEventSink {
    pub fn new(caps: TerminalCapabilities, verbose: u8) -> Self {
        Self { caps, verbose }
    }
}

impl DeployEventSink for ConsoleEventSink {
    fn on_event(&self, event: DeployEvent) {
        let mut out = std::io::stdout().lock();
        for line in render_event(&event, &self.caps, self.verbose) {
            let _ = writeln!(out, "{}", line);
        }
        let _ = out.flush();
    }
}
