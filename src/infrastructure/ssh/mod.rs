//! SSH transport
//!
//! - `session` - `RemoteShell` over `ssh2`
//! - `script` - batch composition and output normalization

pub mod script;
mod session;

pub use session::{SshConnector, SshSession};
