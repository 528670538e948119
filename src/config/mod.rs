//! Configuration module for scd
//!
//! The config file is JSON at `~/.scd/config` (or `$SCD_HOME/config`).
//! See `loader` for the override hierarchy.

mod loader;
mod types;

pub use loader::{
    config_path, load_config_file, parse_config, read_password_file, resolve, scd_home,
    status_path, validate_sources, with_env_overrides, CliOverrides, ConfigWarning,
    DEFAULT_CONFIG,
};
pub use types::{
    ConfigFile, ConnectionSettings, DesiredConfiguration, FileEntry, ScriptEntry, DEFAULT_PORT,
    DEFAULT_TIMEOUT_SECS,
};
