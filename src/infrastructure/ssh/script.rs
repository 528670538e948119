//! Remote script composition
//!
//! Turns a `CommandBatch` into the single script string sent over the
//! channel, rewriting `sudo` so it never waits on an interactive prompt and
//! never sees the password on its command line.

use crate::domain::ports::CommandBatch;
use crate::domain::services::commands::shell_quote;

/// Remote path the elevation secret is uploaded to.
pub const SECRET_PATH: &str = "/tmp/.scd_elevation";

const ELEVATION_COMMAND: &str = "sudo";

/// How `sudo` lines are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation<'a> {
    /// Lines are sent unchanged
    Off,
    /// No password is available: `sudo -n`, failing fast instead of prompting
    NonInteractive,
    /// `sudo` reads the password from the uploaded secret file
    SecretFile(&'a str),
}

/// Build the script body for `batch`.
pub fn compose_script(batch: &CommandBatch, elevation: Elevation<'_>) -> String {
    let mut script = Vec::with_capacity(batch.lines.len() + 3);

    // One trap covers every path; a second `trap ... EXIT` would replace it
    let mut removed: Vec<&str> = Vec::new();
    if let Elevation::SecretFile(path) = elevation {
        removed.push(path);
    }
    removed.extend(batch.remove_on_exit.iter().map(String::as_str));
    if !removed.is_empty() {
        script.push(format!("trap 'rm -f {}' EXIT", removed.join(" ")));
    }
    match (batch.exit_on_error, batch.echo_commands) {
        (true, true) => script.push("set -ex".to_string()),
        (true, false) => script.push("set -e".to_string()),
        (false, true) => script.push("set -x".to_string()),
        (false, false) => {}
    }

    let replacement = match elevation {
        Elevation::Off => None,
        Elevation::NonInteractive => Some(format!("{} -n", ELEVATION_COMMAND)),
        Elevation::SecretFile(path) => Some(format!("{} -S -p '' <{}", ELEVATION_COMMAND, path)),
    };

    script.extend(batch.lines.iter().map(|line| match &replacement {
        Some(replacement) => rewrite_elevation(line, replacement),
        None => line.clone(),
    }));

    script.join("\n")
}

/// The command handed to the channel: the script run by `sh`.
///
/// The user's login shell may not be POSIX, so the script is always
/// interpreted by `sh`.
pub fn wrap_for_exec(script: &str) -> String {
    format!("sh -c {}", shell_quote(script))
}

/// Replace every `sudo` word in command position.
fn rewrite_elevation(line: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(line.len() + replacement.len());
    let mut rest = line;
    let mut previous: Option<char> = None;

    while let Some(index) = rest.find(ELEVATION_COMMAND) {
        let before = rest[..index].chars().next_back().or(previous);
        let after = rest[index + ELEVATION_COMMAND.len()..].chars().next();

        let starts_word = before.is_none_or(|c| c.is_whitespace() || ";&|(`{!".contains(c));
        let ends_word = after.is_none_or(char::is_whitespace);

        out.push_str(&rest[..index]);
        if starts_word && ends_word {
            out.push_str(replacement);
        } else {
            out.push_str(ELEVATION_COMMAND);
        }
        previous = Some('o');
        rest = &rest[index + ELEVATION_COMMAND.len()..];
    }
    out.push_str(rest);
    out
}

/// Normalize raw channel output into trimmed, non-empty lines.
///
/// A pseudo-terminal turns `\n` into `\r\n` and may double carriage returns.
pub fn normalize_output(raw: &str) -> Vec<String> {
    raw.replace("\r\r", "\n")
        .replace("\r\n", "\n")
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
