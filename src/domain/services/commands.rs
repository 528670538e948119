//! Remote command builders
//!
//! Each stage's shell lines are built here so their exact text can be
//! checked without a host.

use std::path::Path;

use crate::domain::value_objects::{remote_home, FileTransfer};

/// Remote path the deployment archive is uploaded to.
pub const ARCHIVE_PATH: &str = "/tmp/scd_conf.tar.gz";

/// Command printing the canonical host name.
pub const HOSTNAME_COMMAND: &str = "hostname";

/// Quote a string for safe use in POSIX shell commands
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Probe for the package manager, then install `programs` in one call.
pub fn install_programs(programs: &[String]) -> Vec<String> {
    let names = programs
        .iter()
        .map(|p| shell_quote(p))
        .collect::<Vec<_>>()
        .join(" ");

    vec![
        "if [ -f /etc/redhat-release ]; then".to_string(),
        "    PACKAGE_MANAGER=\"yum\"; ANSWER_YES=\"-y\"".to_string(),
        "elif [ -f /etc/arch-release ]; then".to_string(),
        "    PACKAGE_MANAGER=\"pacman\"; ANSWER_YES=\"--noconfirm\"".to_string(),
        "elif [ -f /etc/gentoo-release ]; then".to_string(),
        "    PACKAGE_MANAGER=\"emerge\"; ANSWER_YES=\"\"".to_string(),
        "elif [ -f /etc/SuSE-release ]; then".to_string(),
        "    PACKAGE_MANAGER=\"zypper\"; ANSWER_YES=\"-n\"".to_string(),
        "elif [ -f /etc/debian_version ]; then".to_string(),
        "    PACKAGE_MANAGER=\"apt-get\"; ANSWER_YES=\"-y\"".to_string(),
        "elif [ \"$(uname)\" = \"Darwin\" ]; then".to_string(),
        "    PACKAGE_MANAGER=\"brew\"; ANSWER_YES=\"\"".to_string(),
        "else".to_string(),
        "    echo \"Unsupported distribution.\"".to_string(),
        "    exit 1".to_string(),
        "fi".to_string(),
        // brew refuses to run as root
        format!(
            "if [ \"$PACKAGE_MANAGER\" = \"brew\" ]; then brew install {names}; \
             else sudo $PACKAGE_MANAGER $ANSWER_YES install {names}; fi"
        ),
    ]
}

/// Set the login shell of `user` to the resolved path of `shell`.
///
/// The path is resolved first so an unknown shell fails the batch instead of
/// reaching `usermod` as an empty string.
pub fn change_shell(shell: &str, user: &str) -> Vec<String> {
    let shell = shell_quote(shell);
    vec![
        format!("LOGIN_SHELL=\"$(command -v {shell})\" || true"),
        format!(
            "if [ -z \"$LOGIN_SHELL\" ]; then echo \"shell {shell} not found\"; exit 1; fi"
        ),
        format!("sudo usermod -s \"$LOGIN_SHELL\" {}", shell_quote(user)),
    ]
}

/// Extract the uploaded archive at `/`.
///
/// Entries below the user's home are extracted as the user; anything else
/// needs `sudo`. Ownership recorded in the archive is never restored.
/// Returns the lines and whether elevation is required. The caller removes
/// the archive when the batch exits.
pub fn extract_archive(files: &[FileTransfer], user: &str) -> (Vec<String>, bool) {
    let home = remote_home(user);
    let home_path = Path::new(&home);
    let home_entry = home.trim_start_matches('/').to_string();

    let in_home = files.iter().any(|f| f.destination.starts_with(home_path));
    let outside_home = files.iter().any(|f| !f.destination.starts_with(home_path));

    let mut lines = Vec::new();
    if in_home {
        lines.push(format!(
            "tar -xzf {} -C / --no-same-owner {}",
            ARCHIVE_PATH,
            shell_quote(&home_entry)
        ));
    }
    if outside_home {
        lines.push(format!(
            "sudo tar -xzf {} -C / --exclude={} --no-same-owner",
            ARCHIVE_PATH,
            shell_quote(&home_entry)
        ));
    }

    (lines, outside_home)
}

/// Non-empty lines of a local script.
pub fn script_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(String::from)
        .collect()
}
