//! Domain Layer
//!
//! The core of scd: host status, reconciliation and the ports the
//! application layer drives.
//!
//! ## Structure
//!
//! - `entities/` - Host status records and outstanding work
//! - `value_objects/` - Immutable value types (Stage, FileMapping, Password)
//! - `services/` - Reconciliation and the file walk
//! - `ports/` - Interface definitions for infrastructure

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
