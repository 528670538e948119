//! Interrupt cleanup
//!
//! Anything that must not outlive an interrupted run registers here: local
//! temporary files (archive, password file) and remote secret cleanups.
//! The Ctrl+C handler calls [`CleanupRegistry::run`] before exiting.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

type RemoteCleanup = Box<dyn FnOnce() + Send>;

/// Handle returned on registration, used to release the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CleanupId(u64);

#[derive(Default)]
struct Pending {
    next_id: u64,
    local_files: BTreeMap<CleanupId, PathBuf>,
    remote: BTreeMap<CleanupId, RemoteCleanup>,
}

impl Pending {
    fn next(&mut self) -> CleanupId {
        self.next_id += 1;
        CleanupId(self.next_id)
    }
}

/// Process-wide registry of pending cleanups. Clones share the same state.
#[derive(Clone, Default)]
pub struct CleanupRegistry {
    pending: Arc<Mutex<Pending>>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Delete `path` if the run is interrupted.
    pub fn register_file(&self, path: impl Into<PathBuf>) -> CleanupId {
        let mut pending = self.lock();
        let id = pending.next();
        pending.local_files.insert(id, path.into());
        id
    }

    /// Run `cleanup` if the run is interrupted.
    pub fn register_remote(&self, cleanup: impl FnOnce() + Send + 'static) -> CleanupId {
        let mut pending = self.lock();
        let id = pending.next();
        pending.remote.insert(id, Box::new(cleanup));
        id
    }

    /// Forget an entry whose resource was cleaned up normally.
    pub fn release(&self, id: CleanupId) {
        let mut pending = self.lock();
        pending.local_files.remove(&id);
        pending.remote.remove(&id);
    }

    pub fn pending(&self) -> usize {
        let pending = self.lock();
        pending.local_files.len() + pending.remote.len()
    }

    /// Remove local files, then run remote cleanups. Each entry runs once.
    pub fn run(&self) {
        let (files, remote) = {
            let mut pending = self.lock();
            (
                std::mem::take(&mut pending.local_files),
                std::mem::take(&mut pending.remote),
            )
        };

        for path in files.into_values() {
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed temporary file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not remove temporary file"),
            }
        }

        for cleanup in remote.into_values() {
            cleanup();
        }
    }
}
