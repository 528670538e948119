//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod deploy_events;
pub mod host_status_repository;
pub mod remote_shell;

pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink};
pub use host_status_repository::HostStatusRepository;
pub use remote_shell::{CommandBatch, CommandOutput, RemoteConnector, RemoteShell};

#[cfg(test)]
pub(crate) use deploy_events::testing;
