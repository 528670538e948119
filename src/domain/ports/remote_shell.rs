//! RemoteShell port - abstraction over one authenticated session to a host
//!
//! The deployer only needs to run command batches and upload files. The SSH
//! implementation lives in `infrastructure::ssh`; tests use an in-memory fake.

use std::path::Path;

use crate::error::RemoteError;

/// A group of shell lines executed as a single remote script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBatch {
    pub lines: Vec<String>,
    /// Arm the elevation protocol for `sudo` lines
    pub elevate: bool,
    /// Prefix the script with `set -e`
    pub exit_on_error: bool,
    /// Prefix the script with `set -x`
    pub echo_commands: bool,
    /// Remote paths deleted when the script exits, whatever its status
    pub remove_on_exit: Vec<String>,
}

impl CommandBatch {
    /// A batch that stops on the first error and echoes its commands.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            elevate: false,
            exit_on_error: true,
            echo_commands: true,
            remove_on_exit: Vec::new(),
        }
    }

    pub fn elevated(mut self, elevate: bool) -> Self {
        self.elevate = elevate;
        self
    }

    /// Do not echo commands (`set -x`) in the output.
    pub fn quiet(mut self) -> Self {
        self.echo_commands = false;
        self
    }

    pub fn keep_going(mut self) -> Self {
        self.exit_on_error = false;
        self
    }

    /// Delete `path` on the remote host once the script exits.
    pub fn removing(mut self, path: impl Into<String>) -> Self {
        self.remove_on_exit.push(path.into());
        self
    }
}

/// Exit status plus normalized output of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    /// Trimmed, non-empty output lines in order
    pub lines: Vec<String>,
}

impl CommandOutput {
    pub fn new(exit_code: i32, lines: Vec<String>) -> Self {
        Self { exit_code, lines }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// One authenticated session to a host.
///
/// Every call blocks until the remote side has finished.
pub trait RemoteShell {
    /// User the session is authenticated as
    fn user(&self) -> &str;

    /// Run `batch` as one remote script and capture its output
    fn execute(&mut self, batch: &CommandBatch) -> Result<CommandOutput, RemoteError>;

    /// Upload a local file to `remote_path`
    fn send_file(&mut self, local_path: &Path, remote_path: &str) -> Result<(), RemoteError>;
}

impl<T: RemoteShell + ?Sized> RemoteShell for Box<T> {
    fn user(&self) -> &str {
        (**self).user()
    }

    fn execute(&mut self, batch: &CommandBatch) -> Result<CommandOutput, RemoteError> {
        (**self).execute(batch)
    }

    fn send_file(&mut self, local_path: &Path, remote_path: &str) -> Result<(), RemoteError> {
        (**self).send_file(local_path, remote_path)
    }
}

/// Opens sessions. The orchestrator connects lazily through this.
pub trait RemoteConnector {
    type Session: RemoteShell;

    fn connect(&self, address: &str) -> Result<Self::Session, RemoteError>;
}
