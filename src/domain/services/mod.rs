//! Domain Services
//!
//! - `reconciler` - desired configuration vs. host status record
//! - `file_walk` - expanding file mappings into concrete transfers
//! - `commands` - the shell lines each stage sends

pub mod commands;
pub mod file_walk;
mod reconciler;

pub use file_walk::{collect_files, Inclusion};
pub use reconciler::HostConfiguration;
