//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::value_objects::{FileMapping, IgnorePatterns, Password, ScriptSpec};

/// Default SSH port
pub const DEFAULT_PORT: u16 = 22;

/// Default connect timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// The config file as written by the user.
///
/// Everything is optional here; required settings are checked once CLI and
/// environment overrides have been applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,

    /// Single-host shorthand for `hosts`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Connect timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,

    #[serde(default)]
    pub ignored_files: Vec<String>,

    #[serde(default)]
    pub files: Vec<FileEntry>,

    #[serde(default)]
    pub programs: Vec<String>,

    #[serde(default)]
    pub scripts: Vec<ScriptEntry>,
}

impl ConfigFile {
    /// Configured hosts, `hosts` first, then `host`.
    pub fn configured_hosts(&self) -> Vec<String> {
        let mut hosts = self.hosts.clone().unwrap_or_default();
        if let Some(host) = &self.host {
            if !hosts.contains(host) {
                hosts.push(host.clone());
            }
        }
        hosts
    }
}

/// A `files` entry: `"~/.zshrc"` or `["~/motd", "/etc/motd"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileEntry {
    Same(String),
    Mapped(String, String),
}

impl From<&FileEntry> for FileMapping {
    fn from(entry: &FileEntry) -> Self {
        match entry {
            FileEntry::Same(path) => FileMapping::same(path.as_str()),
            FileEntry::Mapped(from, to) => FileMapping::new(from.as_str(), to.as_str()),
        }
    }
}

/// A `scripts` entry: `"~/init.sh"` or `{"script": "~/init.sh", "sudo": true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptEntry {
    Path(String),
    Spec(ScriptSpec),
}

impl From<&ScriptEntry> for ScriptSpec {
    fn from(entry: &ScriptEntry) -> Self {
        match entry {
            ScriptEntry::Path(path) => ScriptSpec::new(path.as_str(), false),
            ScriptEntry::Spec(spec) => spec.clone(),
        }
    }
}

/// How to reach and authenticate against hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub user: String,
    pub port: u16,
    /// Bounds connecting and the handshake only
    pub timeout: Duration,
    pub private_key: Option<PathBuf>,
    pub password: Option<Password>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            user: String::new(),
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            private_key: None,
            password: None,
        }
    }
}

/// Effective configuration for a run.
#[derive(Debug, Clone, Default)]
pub struct DesiredConfiguration {
    pub hosts: Vec<String>,
    pub files: Vec<FileMapping>,
    pub programs: BTreeSet<String>,
    pub shell: Option<String>,
    pub scripts: Vec<ScriptSpec>,
    pub ignored_files: IgnorePatterns,
    pub connection: ConnectionSettings,
}

impl DesiredConfiguration {
    /// JSON view for `--print-config`. The password is never included.
    pub fn to_json(&self) -> serde_json::Value {
        let files: Vec<serde_json::Value> = self
            .files
            .iter()
            .map(|m| serde_json::json!([m.from, m.to]))
            .collect();

        serde_json::json!({
            "hosts": self.hosts,
            "user": self.connection.user,
            "port": self.connection.port,
            "timeout": self.connection.timeout.as_secs(),
            "private_key": self.connection.private_key.as_ref().map(|p| p.display().to_string()),
            "password": self.connection.password.as_ref().map(|_| "<redacted>"),
            "shell": self.shell,
            "programs": self.programs,
            "files": files,
            "scripts": self.scripts,
            "ignored_files": self.ignored_files.as_strings(),
        })
    }
}
