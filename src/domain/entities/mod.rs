//! Domain Entities
//!
//! - `HostStatusStore` / `HostStatusRecord` - persisted per-host deployment state
//! - `OutstandingWork` - what reconciliation says is left to do

mod host_status;
mod outstanding_work;

pub use host_status::{HostStatusRecord, HostStatusStore, StatusUpdate, TIME_FORMAT};
pub use outstanding_work::OutstandingWork;
