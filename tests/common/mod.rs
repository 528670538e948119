//! Common test utilities for scd integration and scenario tests.
//!
//! This module provides:
//! - `TestEnv`: isolated HOME and SCD_HOME plus helpers to run the binary
//! - `FakeConnector`: in-memory remote hosts for driving the library
//! - `Workspace`: local dotfiles to deploy, with controlled modification times

#![allow(dead_code)]

pub mod env;
pub mod remote;
pub mod workspace;

pub use env::*;
pub use remote::*;
pub use workspace::*;
