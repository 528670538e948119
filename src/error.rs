//! Error types for scd
//!
//! Two outcomes are kept apart: a [`ConfigError`] stops the whole
//! run before any host is contacted, while a [`HostFailure`] only ends the
//! deployment of a single host.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::value_objects::Stage;

/// Result type alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Process-fatal configuration problems.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file did not exist; a template was written in its place
    #[error("missing configuration file {path}; a default configuration was created, please edit it")]
    MissingConfigFile { path: PathBuf },

    /// The config file is not valid JSON for the expected schema
    #[error("failed to parse configuration file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A required setting is absent from both the config file and the command line
    #[error("no {setting} specified. {hint}")]
    MissingSetting {
        setting: &'static str,
        hint: String,
    },

    /// A configured local source is neither a file nor a directory
    #[error("no such file or directory {path}")]
    MissingSource { path: PathBuf },

    /// A password file given on the command line does not exist
    #[error("the given password file {path} does not exist")]
    MissingPasswordFile { path: PathBuf },

    /// An ignore pattern is not a valid glob
    #[error("invalid ignore pattern '{pattern}': {message}")]
    InvalidIgnorePattern { pattern: String, message: String },

    /// Reading a password interactively failed
    #[error("could not read password: {0}")]
    PasswordPrompt(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why an authentication attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Neither a key nor a password was supplied and the agent had nothing usable
    NoCredential,
    /// A supplied credential was refused by the host
    Rejected,
}

/// Errors raised by a remote session. All of them are terminal for the host.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("{}", auth_message(.host, .reason))]
    Authentication { host: String, reason: AuthFailure },

    #[error("could not connect to {host}, timed out after {seconds} seconds")]
    Timeout { host: String, seconds: u64 },

    #[error("could not connect to {host}: {message}")]
    Connection { host: String, message: String },

    #[error("remote command on {host} failed to run: {message}")]
    Channel { host: String, message: String },

    #[error("could not transfer {local} to {host}:{remote}: {message}")]
    Transfer {
        host: String,
        local: PathBuf,
        remote: String,
        message: String,
    },
}

fn auth_message(host: &str, reason: &AuthFailure) -> String {
    match reason {
        AuthFailure::NoCredential => format!(
            "could not authenticate against {host}. No password or private key was provided. \
             Provide a password using the -p, -f or -r flags, or a key using -i"
        ),
        AuthFailure::Rejected => format!(
            "permission denied by {host}. Check the private key given with -i, \
             the password given with -p, -f or -r, and the configured user"
        ),
    }
}

/// Errors from loading or saving the persisted host status file.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("could not write host status file {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("could not serialize host status: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Host-scoped deployment failures.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A batch returned a non-zero exit status
    #[error("{stage} failed with exit code {exit_code}")]
    Stage {
        stage: Stage,
        exit_code: i32,
        output: Vec<String>,
    },

    /// Some scripts were missing or failed
    #[error("{succeeded} of {attempted} scripts ran successfully")]
    Scripts { attempted: usize, succeeded: usize },

    #[error("could not build deployment archive: {0}")]
    Archive(std::io::Error),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("could not get hostname of {address} (exit code {exit_code})")]
    Hostname { address: String, exit_code: i32 },

    #[error("no such file or directory {path}")]
    MissingSource { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A deployment failure bound to the host it happened on.
#[derive(Error, Debug)]
#[error("{address}: {error}")]
pub struct HostFailure {
    pub address: String,
    pub stage: Option<Stage>,
    #[source]
    pub error: DeployError,
}

impl HostFailure {
    pub fn new(address: impl Into<String>, stage: Option<Stage>, error: DeployError) -> Self {
        Self {
            address: address.into(),
            stage,
            error,
        }
    }

    /// Captured remote output, if the failure came from a batch.
    pub fn output(&self) -> &[String] {
        match &self.error {
            DeployError::Stage { output, .. } => output,
            _ => &[],
        }
    }
}
