//! Configuration loading
//!
//! Precedence, highest first:
//! 1. CLI flags
//! 2. Environment variables (`SCD_USER`, `SCD_PORT`, `SCD_PRIVATE_KEY`)
//! 3. The config file (`$SCD_HOME/config`, default `~/.scd/config`)
//! 4. Built-in defaults

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::value_objects::{FileMapping, IgnorePatterns, Password, ScriptSpec};
use crate::error::{ConfigError, ConfigResult};

use super::types::{
    ConfigFile, ConnectionSettings, DesiredConfiguration, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS,
};

/// Written when no config file exists yet.
pub const DEFAULT_CONFIG: &str = r#"{
    "hosts": [],
    "user": "",
    "shell": "zsh",
    "ignored_files": [
        ".gitignore",
        ".git",
        ".DS_Store"
    ],
    "files": [
        "~/.oh-my-zsh",
        "~/.zshrc"
    ],
    "programs": [
        "git",
        "zsh"
    ],
    "scripts": []
}
"#;

const CONFIG_FILE_NAME: &str = "config";
const STATUS_FILE_NAME: &str = "host_status";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub hosts: Vec<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub private_key: Option<PathBuf>,
    pub password: Option<Password>,
}

/// Directory holding the config and status files.
pub fn scd_home() -> PathBuf {
    if let Some(dir) = std::env::var_os("SCD_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".scd")
}

pub fn config_path() -> PathBuf {
    scd_home().join(CONFIG_FILE_NAME)
}

pub fn status_path() -> PathBuf {
    scd_home().join(STATUS_FILE_NAME)
}

/// Read and parse the config file, collecting unknown-key warnings.
///
/// A missing file is replaced by [`DEFAULT_CONFIG`] and reported as an error
/// so the user edits it before anything is deployed.
pub fn load_config_file(path: &Path) -> ConfigResult<(ConfigFile, Vec<ConfigWarning>)> {
    if !path.is_file() {
        write_default_config(path)?;
        return Err(ConfigError::MissingConfigFile {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    parse_config(&content, path)
}

/// Parse config file content. `path` is only used for messages.
pub fn parse_config(content: &str, path: &Path) -> ConfigResult<(ConfigFile, Vec<ConfigWarning>)> {
    let mut unknown_paths: Vec<String> = Vec::new();
    let mut deserializer = serde_json::Deserializer::from_str(content);

    let config: ConfigFile = serde_ignored::deserialize(&mut deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    deserializer.end().map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(content, &key),
                suggestion: suggest_key(&key),
                file: path.to_path_buf(),
                key,
            }
        })
        .collect();

    Ok((config, warnings))
}

fn write_default_config(path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, DEFAULT_CONFIG)?;
    tracing::info!(path = %path.display(), "wrote default configuration");
    Ok(())
}

/// Apply environment variable overrides (SCD_* prefix)
pub fn with_env_overrides(config: ConfigFile) -> ConfigFile {
    with_overrides_from(config, |key| std::env::var(key).ok())
}

fn with_overrides_from(mut config: ConfigFile, var: impl Fn(&str) -> Option<String>) -> ConfigFile {
    if let Some(user) = var("SCD_USER").filter(|v| !v.is_empty()) {
        config.user = Some(user);
    }

    if let Some(port) = var("SCD_PORT") {
        match port.trim().parse::<u16>() {
            Ok(port) => config.port = Some(port),
            Err(_) => tracing::warn!(value = %port, "ignoring invalid SCD_PORT"),
        }
    }

    if let Some(key) = var("SCD_PRIVATE_KEY").filter(|v| !v.is_empty()) {
        config.private_key = Some(key);
    }

    config
}

/// Merge the file with CLI overrides and validate the result.
pub fn resolve(
    file: ConfigFile,
    overrides: CliOverrides,
    path: &Path,
) -> ConfigResult<DesiredConfiguration> {
    let hosts = if overrides.hosts.is_empty() {
        file.configured_hosts()
    } else {
        overrides.hosts
    };
    if hosts.is_empty() {
        return Err(ConfigError::MissingSetting {
            setting: "host",
            hint: format!(
                "Specify hosts either in {} under the attribute \"hosts\" or as command line arguments.",
                path.display()
            ),
        });
    }

    let user = overrides
        .user
        .or(file.user.clone())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ConfigError::MissingSetting {
            setting: "user",
            hint: format!(
                "Specify user either in {} under the attribute \"user\" or using the --user (-u) flag.",
                path.display()
            ),
        })?;

    if file.files.is_empty() && file.programs.is_empty() {
        return Err(ConfigError::MissingSetting {
            setting: "files or programs",
            hint: format!(
                "Specify what to deploy in {} under the attributes \"files\" and \"programs\".",
                path.display()
            ),
        });
    }

    let private_key = overrides.private_key.or_else(|| {
        file.private_key
            .as_deref()
            .map(crate::domain::value_objects::expand_local_home)
    });

    let connection = ConnectionSettings {
        user,
        port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
        timeout: Duration::from_secs(file.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        private_key,
        password: overrides.password,
    };

    Ok(DesiredConfiguration {
        hosts,
        files: file.files.iter().map(FileMapping::from).collect(),
        programs: file.programs.iter().cloned().collect(),
        shell: file.shell.filter(|s| !s.is_empty()),
        scripts: file.scripts.iter().map(ScriptSpec::from).collect(),
        ignored_files: IgnorePatterns::new(&file.ignored_files)?,
        connection,
    })
}

/// Check that every configured local source exists before any host is contacted.
pub fn validate_sources(config: &DesiredConfiguration) -> ConfigResult<()> {
    for mapping in &config.files {
        let source = mapping.local_source();
        if !source.exists() {
            return Err(ConfigError::MissingSource { path: source });
        }
    }
    Ok(())
}

/// Read a password from a file given with `-f`, trimming surrounding whitespace.
pub fn read_password_file(path: &Path) -> ConfigResult<Password> {
    if !path.is_file() {
        return Err(ConfigError::MissingPasswordFile {
            path: path.to_path_buf(),
        });
    }
    let content = zeroize::Zeroizing::new(fs::read_to_string(path)?);
    Ok(Password::new(content.trim()))
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    let quoted = format!("\"{}\"", needle);
    content
        .lines()
        .position(|line| line.contains(&quoted))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "hosts",
        "host",
        "user",
        "port",
        "timeout",
        "shell",
        "private_key",
        "ignored_files",
        "files",
        "programs",
        "scripts",
        "script",
        "sudo",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}

#[cfg(test)]
pub(super) fn overrides_from_map(
    config: ConfigFile,
    vars: &std::collections::HashMap<&str, &str>,
) -> ConfigFile {
    with_overrides_from(config, |key| vars.get(key).map(|v| v.to_string()))
}
