//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `ssh/` - SSH sessions (`RemoteShell` over ssh2)
//! - `repositories/` - Host status file
//! - `events/` - Event sinks
//! - `archive` - Deployment archive writer
//! - `interrupt` - Cleanup on Ctrl+C

pub mod archive;
pub mod events;
pub mod interrupt;
pub mod repositories;
pub mod ssh;

pub use events::JsonEventSink;
pub use interrupt::CleanupRegistry;
pub use repositories::JsonHostStatusRepository;
pub use ssh::{SshConnector, SshSession};
