//! Setup script value object.

use serde::{Deserialize, Serialize};

/// A local script to run once on each host.
///
/// `path` is kept exactly as configured (e.g. `~/init.sh`) because it doubles
/// as the identifier recorded in the host status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptSpec {
    #[serde(rename = "script")]
    pub path: String,
    #[serde(rename = "sudo", default)]
    pub elevate: bool,
}

impl ScriptSpec {
    pub fn new(path: impl Into<String>, elevate: bool) -> Self {
        Self {
            path: path.into(),
            elevate,
        }
    }

    /// Identifier stored in `executed_scripts`.
    pub fn id(&self) -> &str {
        &self.path
    }
}
