//! Deployment stage value object.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four deployment stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    InstallPrograms,
    ChangeShell,
    DeployFiles,
    RunScripts,
}

impl Stage {
    /// All stages in the order the deployer runs them.
    pub const ORDER: [Stage; 4] = [
        Stage::InstallPrograms,
        Stage::ChangeShell,
        Stage::DeployFiles,
        Stage::RunScripts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::InstallPrograms => "install programs",
            Stage::ChangeShell => "change shell",
            Stage::DeployFiles => "deploy files",
            Stage::RunScripts => "run scripts",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
