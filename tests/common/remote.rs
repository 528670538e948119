//! In-memory remote hosts.
//!
//! Every executed line is echoed like `set -x` would. Uploaded archives are
//! opened and their entry names recorded so tests can see what was shipped.

use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::Path;
use std::rc::Rc;

use flate2::read::GzDecoder;

use scd::domain::ports::{
    CommandBatch, CommandOutput, DeployEvent, DeployEventSink, RemoteConnector, RemoteShell,
};
use scd::error::RemoteError;

/// Everything the fake hosts saw.
#[derive(Debug, Default)]
pub struct RemoteLog {
    pub connects: Vec<String>,
    pub batches: Vec<(String, CommandBatch)>,
    /// (address, remote path, archive entry names)
    pub uploads: Vec<(String, String, Vec<String>)>,
}

impl RemoteLog {
    /// Executed lines for `address`, hostname probes excluded.
    pub fn lines_for(&self, address: &str) -> Vec<String> {
        self.batches
            .iter()
            .filter(|(a, batch)| a == address && batch.lines != ["hostname"])
            .flat_map(|(_, batch)| batch.lines.clone())
            .collect()
    }

    pub fn ran(&self, address: &str, needle: &str) -> bool {
        self.lines_for(address).iter().any(|l| l.contains(needle))
    }

    /// Entry names of every archive uploaded to `address`.
    pub fn shipped_to(&self, address: &str) -> Vec<String> {
        self.uploads
            .iter()
            .filter(|(a, _, _)| a == address)
            .flat_map(|(_, _, entries)| entries.clone())
            .collect()
    }
}

#[derive(Default)]
struct Behaviour {
    hostnames: BTreeMap<String, String>,
    unreachable: BTreeSet<String>,
    failures: Vec<(String, i32)>,
}

/// Hands out sessions that share one log and one set of behaviours.
#[derive(Clone)]
pub struct FakeConnector {
    user: String,
    behaviour: Rc<RefCell<Behaviour>>,
    log: Rc<RefCell<RemoteLog>>,
}

impl FakeConnector {
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
            behaviour: Rc::default(),
            log: Rc::default(),
        }
    }

    pub fn hostname(self, address: &str, name: &str) -> Self {
        self.behaviour
            .borrow_mut()
            .hostnames
            .insert(address.to_string(), name.to_string());
        self
    }

    pub fn unreachable(self, address: &str) -> Self {
        self.behaviour
            .borrow_mut()
            .unreachable
            .insert(address.to_string());
        self
    }

    /// Any line containing `needle` exits with `code`.
    pub fn fail_on(self, needle: &str, code: i32) -> Self {
        self.behaviour
            .borrow_mut()
            .failures
            .push((needle.to_string(), code));
        self
    }

    /// Forget configured failures and outages.
    pub fn heal(&self) {
        let mut behaviour = self.behaviour.borrow_mut();
        behaviour.failures.clear();
        behaviour.unreachable.clear();
    }

    pub fn log(&self) -> Ref<'_, RemoteLog> {
        self.log.borrow()
    }

    pub fn reset_log(&self) {
        *self.log.borrow_mut() = RemoteLog::default();
    }
}

impl RemoteConnector for FakeConnector {
    type Session = FakeSession;

    fn connect(&self, address: &str) -> Result<FakeSession, RemoteError> {
        self.log.borrow_mut().connects.push(address.to_string());
        if self.behaviour.borrow().unreachable.contains(address) {
            return Err(RemoteError::Timeout {
                host: address.to_string(),
                seconds: 10,
            });
        }
        Ok(FakeSession {
            address: address.to_string(),
            remote: self.clone(),
        })
    }
}

pub struct FakeSession {
    address: String,
    remote: FakeConnector,
}

impl FakeSession {
    fn failure_for(&self, line: &str) -> Option<i32> {
        self.remote
            .behaviour
            .borrow()
            .failures
            .iter()
            .find(|(needle, _)| line.contains(needle.as_str()))
            .map(|(_, code)| *code)
    }
}

impl RemoteShell for FakeSession {
    fn user(&self) -> &str {
        &self.remote.user
    }

    fn execute(&mut self, batch: &CommandBatch) -> Result<CommandOutput, RemoteError> {
        self.remote
            .log
            .borrow_mut()
            .batches
            .push((self.address.clone(), batch.clone()));

        if batch.lines == ["hostname"] {
            let name = self
                .remote
                .behaviour
                .borrow()
                .hostnames
                .get(&self.address)
                .cloned()
                .unwrap_or_else(|| self.address.clone());
            return Ok(CommandOutput::new(0, vec![name]));
        }

        let mut output = Vec::new();
        for line in &batch.lines {
            output.push(format!("+ {}", line));
            if let Some(code) = self.failure_for(line) {
                output.push(format!("sh: command failed with {}", code));
                if batch.exit_on_error {
                    return Ok(CommandOutput::new(code, output));
                }
            }
        }
        Ok(CommandOutput::new(0, output))
    }

    fn send_file(&mut self, local_path: &Path, remote_path: &str) -> Result<(), RemoteError> {
        let file = File::open(local_path).map_err(|e| RemoteError::Transfer {
            host: self.address.clone(),
            local: local_path.to_path_buf(),
            remote: remote_path.to_string(),
            message: e.to_string(),
        })?;

        let mut archive = tar::Archive::new(GzDecoder::new(file));
        let mut entries: Vec<String> = archive
            .entries()
            .expect("archive is not a tar stream")
            .map(|entry| {
                let entry = entry.expect("corrupt archive entry");
                entry.path().expect("bad entry path").display().to_string()
            })
            .collect();
        entries.sort();

        self.remote.log.borrow_mut().uploads.push((
            self.address.clone(),
            remote_path.to_string(),
            entries,
        ));
        Ok(())
    }
}

/// Sink that keeps every event.
#[derive(Default)]
pub struct RecordingSink {
    pub events: RefCell<Vec<DeployEvent>>,
}

impl RecordingSink {
    pub fn skipped_scripts(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                DeployEvent::ScriptSkipped { script, .. } => Some(script.clone()),
                _ => None,
            })
            .collect()
    }
}

impl DeployEventSink for RecordingSink {
    fn on_event(&self, event: DeployEvent) {
        self.events.borrow_mut().push(event);
    }
}
