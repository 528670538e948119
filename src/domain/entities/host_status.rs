//! Host status entities - what has already been applied to each host
//!
//! Pure data. Loading and saving is handled by `HostStatusRepository`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

/// Format used for `last_deployment` in the status file.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Last known deployment state of one host.
///
/// A host that is absent from the store is equivalent to `HostStatusRecord::default()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStatusRecord {
    #[serde(with = "timestamp", default = "epoch")]
    pub last_deployment: DateTime<Utc>,
    #[serde(default)]
    pub installed_programs: BTreeSet<String>,
    #[serde(default)]
    pub deployed_files: BTreeSet<String>,
    #[serde(default)]
    pub executed_scripts: Vec<String>,
    #[serde(default)]
    pub shell: Option<String>,
}

impl Default for HostStatusRecord {
    fn default() -> Self {
        Self {
            last_deployment: epoch(),
            installed_programs: BTreeSet::new(),
            deployed_files: BTreeSet::new(),
            executed_scripts: Vec::new(),
            shell: None,
        }
    }
}

impl HostStatusRecord {
    pub fn has_installed(&self, program: &str) -> bool {
        self.installed_programs.contains(program)
    }

    pub fn has_deployed(&self, source: &str) -> bool {
        self.deployed_files.contains(source)
    }

    pub fn has_executed(&self, script: &str) -> bool {
        self.executed_scripts.iter().any(|s| s == script)
    }
}

fn epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

/// The contribution of one successful stage to a host's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    ProgramsInstalled(Vec<String>),
    ShellChanged(String),
    FilesDeployed {
        sources: Vec<String>,
        at: DateTime<Utc>,
    },
    ScriptExecuted(String),
}

/// All persisted state: address to hostname cache plus per-host records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStatusStore {
    #[serde(default)]
    host_mappings: BTreeMap<String, String>,
    #[serde(default)]
    status: BTreeMap<String, HostStatusRecord>,
}

impl HostStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for `name`, or the never-deployed record.
    pub fn record(&self, name: &str) -> HostStatusRecord {
        self.status.get(name).cloned().unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<&HostStatusRecord> {
        self.status.get(name)
    }

    pub fn status(&self) -> &BTreeMap<String, HostStatusRecord> {
        &self.status
    }

    pub fn host_mappings(&self) -> &BTreeMap<String, String> {
        &self.host_mappings
    }

    /// Cached canonical name for an address.
    pub fn resolved_name(&self, address: &str) -> Option<&str> {
        self.host_mappings.get(address).map(String::as_str)
    }

    pub fn map_host(&mut self, address: impl Into<String>, name: impl Into<String>) {
        self.host_mappings.insert(address.into(), name.into());
    }

    /// Canonical name for either an address or a name.
    pub fn canonical_name<'a>(&'a self, host: &'a str) -> &'a str {
        self.resolved_name(host).unwrap_or(host)
    }

    /// Apply one stage's contribution to the record of `name`.
    pub fn apply(&mut self, name: &str, update: StatusUpdate) {
        let record = self.status.entry(name.to_string()).or_default();
        match update {
            StatusUpdate::ProgramsInstalled(programs) => {
                record.installed_programs.extend(programs);
            }
            StatusUpdate::ShellChanged(shell) => {
                record.installed_programs.insert(shell.clone());
                record.shell = Some(shell);
            }
            StatusUpdate::FilesDeployed { sources, at } => {
                record.deployed_files.extend(sources);
                if at > record.last_deployment {
                    record.last_deployment = at;
                }
            }
            StatusUpdate::ScriptExecuted(script) => {
                if !record.has_executed(&script) {
                    record.executed_scripts.push(script);
                }
            }
        }
    }

    /// Remove the record of a host given by address or name.
    ///
    /// Returns false if no record existed.
    pub fn clear(&mut self, host: &str) -> bool {
        let name = self.canonical_name(host).to_string();
        self.status.remove(&name).is_some()
    }
}

/// `last_deployment` (de)serialization.
///
/// Accepts the current format, the second-resolution form, and the bare epoch
/// seconds older status files stored.
mod timestamp {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Seconds(f64),
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => parse(&text).map_err(serde::de::Error::custom),
            Raw::Seconds(secs) => {
                let whole = secs.trunc() as i64;
                let nanos = (secs.fract() * 1e9) as u32;
                DateTime::from_timestamp(whole, nanos)
                    .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {secs}")))
            }
        }
    }

    pub(super) fn parse(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f").map(|naive| naive.and_utc())
    }
}
