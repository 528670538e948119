//! Terminal output for the `scd` binary.
//!
//! The library never prints. Everything the user sees is rendered here from
//! `DeployEvent`s and the final `RunSummary`.

pub mod json;
pub mod output;
pub mod primitives;
pub mod sink;
pub mod terminal;
pub mod theme;
pub mod views;
