//! File mapping value objects.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A configured `{source, destination}` pair, kept as the user wrote it.
///
/// Both sides may start with `~`. The source `~` means the local home, the
/// destination `~` means the home of the remote user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileMapping {
    pub from: String,
    pub to: String,
}

impl FileMapping {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// A mapping whose destination is the same path as its source.
    pub fn same(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            from: path.clone(),
            to: path,
        }
    }

    /// Absolute local source path.
    pub fn local_source(&self) -> PathBuf {
        absolutize(&expand_local_home(&self.from))
    }

    /// Absolute remote destination for `user`.
    pub fn remote_destination(&self, user: &str) -> PathBuf {
        match self.to.strip_prefix('~') {
            Some(rest) => PathBuf::from(format!("{}{}", remote_home(user), rest)),
            None => PathBuf::from(&self.to),
        }
    }
}

/// One concrete file to ship: absolute local source, absolute remote destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileTransfer {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl FileTransfer {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Name of the entry inside the deployment archive (destination relative to `/`).
    pub fn archive_name(&self) -> PathBuf {
        self.destination
            .strip_prefix("/")
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| self.destination.clone())
    }
}

/// Home directory of `user` on the remote host.
pub fn remote_home(user: &str) -> String {
    if user == "root" {
        "/root".to_string()
    } else {
        format!("/home/{}", user)
    }
}

/// Expand a leading `~` to the local home directory.
pub fn expand_local_home(path: &str) -> PathBuf {
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from(path));
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
