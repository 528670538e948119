//! JSON Host Status Repository
//!
//! Implements the HostStatusRepository port on top of a single JSON file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::domain::entities::HostStatusStore;
use crate::domain::ports::HostStatusRepository;
use crate::error::StateError;

/// Stores the host status as pretty-printed JSON (`~/.scd/host_status`).
pub struct JsonHostStatusRepository {
    path: PathBuf,
}

impl JsonHostStatusRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(&self, e: impl ToString) -> StateError {
        StateError::Write {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}

impl HostStatusRepository for JsonHostStatusRepository {
    fn load(&self) -> HostStatusStore {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HostStatusStore::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read host status, starting empty");
                return HostStatusStore::new();
            }
        };

        if content.trim().is_empty() {
            return HostStatusStore::new();
        }

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "corrupt host status file, starting empty");
            HostStatusStore::new()
        })
    }

    fn save(&self, store: &HostStatusStore) -> Result<(), StateError> {
        let mut content = serde_json::to_string_pretty(store)?;
        content.push('\n');

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(|e| self.write_error(e))?;

        // Same directory so the final rename stays on one filesystem
        let mut temp = NamedTempFile::new_in(&dir).map_err(|e| self.write_error(e))?;
        temp.write_all(content.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| self.write_error(e))?;
        temp.persist(&self.path).map_err(|e| self.write_error(e.error))?;

        tracing::trace!(path = %self.path.display(), "saved host status");
        Ok(())
    }
}
