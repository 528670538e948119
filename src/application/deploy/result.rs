//! Deploy Result
//!
//! What a host deployment applied.

use crate::domain::value_objects::Stage;

/// Result of deploying one host's outstanding work
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployReport {
    /// Stages that ran, in order
    pub stages: Vec<Stage>,
    pub programs_installed: Vec<String>,
    pub shell_changed: Option<String>,
    pub files_deployed: usize,
    pub scripts_executed: Vec<String>,
    /// Scripts that were missing locally or failed remotely, with the reason
    pub scripts_skipped: Vec<(String, String)>,
}

impl DeployReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_changes(&self) -> bool {
        !self.stages.is_empty()
    }
}
