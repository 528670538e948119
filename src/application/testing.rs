//! In-memory remote used by the application tests.

use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::domain::ports::{CommandBatch, CommandOutput, RemoteConnector, RemoteShell};
use crate::error::RemoteError;

/// Everything the fake saw.
#[derive(Debug, Default)]
pub struct RemoteLog {
    pub connects: Vec<String>,
    pub batches: Vec<(String, CommandBatch)>,
    pub uploads: Vec<(String, PathBuf, String)>,
}

impl RemoteLog {
    /// All executed lines for `address`, hostname probes excluded.
    pub fn lines_for(&self, address: &str) -> Vec<String> {
        self.batches
            .iter()
            .filter(|(a, batch)| a == address && batch.lines != ["hostname"])
            .flat_map(|(_, batch)| batch.lines.clone())
            .collect()
    }

    pub fn side_effects(&self) -> usize {
        self.batches
            .iter()
            .filter(|(_, batch)| batch.lines != ["hostname"])
            .count()
            + self.uploads.len()
    }
}

/// A fake session: echoes every line like `set -x` and exits 0 unless a
/// configured failure matches.
#[derive(Clone)]
pub struct FakeRemote {
    address: String,
    user: String,
    hostname: String,
    failures: Rc<Vec<(String, i32)>>,
    log: Rc<RefCell<RemoteLog>>,
}

impl FakeRemote {
    fn failure_for(&self, line: &str) -> Option<i32> {
        self.failures
            .iter()
            .find(|(needle, _)| line.contains(needle.as_str()))
            .map(|(_, code)| *code)
    }
}

impl RemoteShell for FakeRemote {
    fn user(&self) -> &str {
        &self.user
    }

    fn execute(&mut self, batch: &CommandBatch) -> Result<CommandOutput, RemoteError> {
        self.log
            .borrow_mut()
            .batches
            .push((self.address.clone(), batch.clone()));

        if batch.lines == ["hostname"] {
            let output = match self.failure_for("hostname") {
                Some(code) => CommandOutput::new(code, Vec::new()),
                None => CommandOutput::new(0, vec![self.hostname.clone()]),
            };
            return Ok(output);
        }

        let mut output = Vec::new();
        for line in &batch.lines {
            output.push(format!("+ {}", line));
            if let Some(code) = self.failure_for(line) {
                output.push("error: command failed".to_string());
                return Ok(CommandOutput::new(code, output));
            }
        }
        Ok(CommandOutput::new(0, output))
    }

    fn send_file(&mut self, local_path: &Path, remote_path: &str) -> Result<(), RemoteError> {
        if !local_path.exists() {
            return Err(RemoteError::Transfer {
                host: self.address.clone(),
                local: local_path.to_path_buf(),
                remote: remote_path.to_string(),
                message: "no such file".to_string(),
            });
        }
        self.log.borrow_mut().uploads.push((
            self.address.clone(),
            local_path.to_path_buf(),
            remote_path.to_string(),
        ));
        Ok(())
    }
}

/// Hands out [`FakeRemote`] sessions that share one log.
pub struct FakeConnector {
    user: String,
    hostnames: BTreeMap<String, String>,
    unreachable: BTreeSet<String>,
    failures: Rc<Vec<(String, i32)>>,
    log: Rc<RefCell<RemoteLog>>,
}

impl FakeConnector {
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
            hostnames: BTreeMap::new(),
            unreachable: BTreeSet::new(),
            failures: Rc::new(Vec::new()),
            log: Rc::default(),
        }
    }

    pub fn hostname(mut self, address: &str, name: &str) -> Self {
        self.hostnames.insert(address.to_string(), name.to_string());
        self
    }

    pub fn unreachable(mut self, address: &str) -> Self {
        self.unreachable.insert(address.to_string());
        self
    }

    /// Any line containing `needle` exits with `code`.
    pub fn fail_on(mut self, needle: &str, code: i32) -> Self {
        let mut failures = (*self.failures).clone();
        failures.push((needle.to_string(), code));
        self.failures = Rc::new(failures);
        self
    }

    pub fn log(&self) -> Ref<'_, RemoteLog> {
        self.log.borrow()
    }

    /// A session without going through `connect`.
    pub fn session(&self, address: &str) -> FakeRemote {
        FakeRemote {
            address: address.to_string(),
            user: self.user.clone(),
            hostname: self
                .hostnames
                .get(address)
                .cloned()
                .unwrap_or_else(|| address.to_string()),
            failures: self.failures.clone(),
            log: self.log.clone(),
        }
    }
}

impl RemoteConnector for FakeConnector {
    type Session = FakeRemote;

    fn connect(&self, address: &str) -> Result<FakeRemote, RemoteError> {
        self.log.borrow_mut().connects.push(address.to_string());
        if self.unreachable.contains(address) {
            return Err(RemoteError::Timeout {
                host: address.to_string(),
                seconds: 10,
            });
        }
        Ok(self.session(address))
    }
}
