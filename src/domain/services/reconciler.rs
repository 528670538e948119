//! Reconciliation service
//!
//! Compares the desired configuration with what a host's status record says
//! was already applied and produces the outstanding work for that host.
//! Nothing here talks to a host; the only I/O is reading local metadata
//! during the file walk.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::config::DesiredConfiguration;
use crate::domain::entities::{HostStatusRecord, OutstandingWork};
use crate::domain::services::file_walk::{collect_files, Inclusion};
use crate::domain::value_objects::{FileTransfer, ScriptSpec};
use crate::error::DeployError;

/// Outstanding work for one host, computed once at construction.
#[derive(Debug, Clone)]
pub struct HostConfiguration {
    work: OutstandingWork,
}

impl HostConfiguration {
    /// Reconcile `config` against `record`, snapshotting the current time.
    pub fn new(config: &DesiredConfiguration, record: &HostStatusRecord) -> Result<Self, DeployError> {
        Self::new_at(config, record, Utc::now())
    }

    /// Reconcile with an explicit snapshot time.
    ///
    /// `snapshot` is taken before the walk and becomes the host's
    /// `last_deployment` once its files stage succeeds.
    pub fn new_at(
        config: &DesiredConfiguration,
        record: &HostStatusRecord,
        snapshot: DateTime<Utc>,
    ) -> Result<Self, DeployError> {
        let (files, deployed_sources) = files_to_deploy(config, record)?;
        let work = OutstandingWork {
            programs: programs_to_install(config, record),
            files,
            scripts: scripts_to_run(config, record),
            shell: shell_to_change(config, record),
            deployed_sources,
            snapshot,
        };

        tracing::debug!(
            programs = work.programs.len(),
            files = work.files.len(),
            scripts = work.scripts.len(),
            shell_change = work.shell.is_some(),
            "reconciled host configuration"
        );

        Ok(Self { work })
    }

    pub fn work(&self) -> &OutstandingWork {
        &self.work
    }

    pub fn into_work(self) -> OutstandingWork {
        self.work
    }

    pub fn is_empty(&self) -> bool {
        self.work.is_empty()
    }
}

/// Desired programs plus the desired shell, minus what is installed.
fn programs_to_install(config: &DesiredConfiguration, record: &HostStatusRecord) -> Vec<String> {
    config
        .programs
        .iter()
        .chain(config.shell.iter())
        .filter(|program| !record.has_installed(program))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Expand every mapping into transfers.
///
/// A mapping never deployed before contributes every file below it; a known
/// mapping only contributes files modified after `last_deployment`.
fn files_to_deploy(
    config: &DesiredConfiguration,
    record: &HostStatusRecord,
) -> Result<(Vec<FileTransfer>, Vec<String>), DeployError> {
    let user = config.connection.user.as_str();
    let mut transfers = BTreeSet::new();
    let mut sources = BTreeSet::new();

    for mapping in &config.files {
        let source = mapping.local_source();
        if !source.exists() {
            return Err(DeployError::MissingSource { path: source });
        }

        let key = source.to_string_lossy().into_owned();
        let inclusion = if record.has_deployed(&key) {
            tracing::debug!(source = %key, "checking modification times");
            Inclusion::ModifiedAfter(record.last_deployment)
        } else {
            tracing::debug!(source = %key, "adding new item");
            Inclusion::All
        };

        let destination = mapping.remote_destination(user);
        let found = collect_files(
            &source,
            &source,
            &destination,
            &config.ignored_files,
            inclusion,
        )?;
        transfers.extend(found);
        sources.insert(key);
    }

    Ok((transfers.into_iter().collect(), sources.into_iter().collect()))
}

/// Scripts not yet executed, in configured order.
fn scripts_to_run(config: &DesiredConfiguration, record: &HostStatusRecord) -> Vec<ScriptSpec> {
    let mut seen = BTreeSet::new();
    config
        .scripts
        .iter()
        .filter(|script| !record.has_executed(script.id()))
        .filter(|script| seen.insert(script.id().to_string()))
        .cloned()
        .collect()
}

fn shell_to_change(config: &DesiredConfiguration, record: &HostStatusRecord) -> Option<String> {
    match &config.shell {
        Some(shell) if record.shell.as_ref() != Some(shell) => Some(shell.clone()),
        _ => None,
    }
}
