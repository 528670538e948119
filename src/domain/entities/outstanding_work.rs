//! Outstanding work entity - the per-host result of reconciliation

use chrono::{DateTime, Utc};

use crate::domain::value_objects::{FileTransfer, ScriptSpec};

/// Everything that still has to be applied to one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutstandingWork {
    /// Programs to install (sorted)
    pub programs: Vec<String>,
    /// Concrete files to ship (sorted by source)
    pub files: Vec<FileTransfer>,
    /// Scripts to run, in configured order
    pub scripts: Vec<ScriptSpec>,
    /// New login shell, if it differs from the recorded one
    pub shell: Option<String>,
    /// Top-level mapping sources to record once the files stage succeeds
    pub deployed_sources: Vec<String>,
    /// Time the reconciliation started; becomes `last_deployment` on success
    pub snapshot: DateTime<Utc>,
}

impl OutstandingWork {
    pub fn empty(snapshot: DateTime<Utc>) -> Self {
        Self {
            programs: Vec::new(),
            files: Vec::new(),
            scripts: Vec::new(),
            shell: None,
            deployed_sources: Vec::new(),
            snapshot,
        }
    }

    /// True when no stage has anything to do.
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
            && self.files.is_empty()
            && self.scripts.is_empty()
            && self.shell.is_none()
    }
}
