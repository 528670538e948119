//! Deploy Use Case
//!
//! Applies reconciled work to one host.

mod deployer;
mod result;


pub use deployer::ConfigDeployer;
pub use result::DeployReport;
