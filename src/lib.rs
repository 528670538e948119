//! scd - shell configuration deployer
//!
//! Keeps dotfiles, packages, the login shell and setup scripts in sync on
//! remote hosts over SSH. Each host's deployment state is persisted so
//! repeated runs only apply what is new or modified.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use application::{HostOutcome, Orchestrator, PersistentHostState, RunSummary};
pub use config::{ConnectionSettings, DesiredConfiguration};
pub use error::{ConfigError, DeployError, HostFailure, RemoteError, StateError};
