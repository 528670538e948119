//! Repository Implementations
//!
//! Concrete implementations of domain repository ports.

mod host_status;

pub use host_status::JsonHostStatusRepository;
