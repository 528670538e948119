//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod file_mapping;
mod host;
mod ignore_patterns;
mod password;
mod script;
mod stage;

pub use file_mapping::{expand_local_home, remote_home, FileMapping, FileTransfer};
pub use host::HostIdentity;
pub use ignore_patterns::IgnorePatterns;
pub use password::Password;
pub use script::ScriptSpec;
pub use stage::Stage;
