//! Application Layer
//!
//! Use cases that drive the domain through its ports.
//!
//! ## Use Cases
//!
//! - `Orchestrator` - Runs every configured host (resolve, reconcile, deploy)
//! - `ConfigDeployer` - Applies one host's outstanding work stage by stage
//! - `PersistentHostState` - Records and saves each stage's contribution

pub mod deploy;
pub mod orchestrator;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use deploy::{ConfigDeployer, DeployReport};
pub use orchestrator::{HostOutcome, Orchestrator, RunSummary};
pub use state::PersistentHostState;
