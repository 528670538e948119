//! Recursive expansion of file mappings into concrete transfers
//!
//! Pure with respect to its inputs: every call returns a freshly built list,
//! the caller concatenates them.

use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::Path;

use crate::domain::value_objects::{FileTransfer, IgnorePatterns};

/// What to include while walking.
#[derive(Debug, Clone, Copy)]
pub enum Inclusion {
    /// The mapping was never deployed: include every file
    All,
    /// Include files modified strictly after this instant
    ModifiedAfter(DateTime<Utc>),
}

/// Expand `path` (a file or a directory below `source_root`) into transfers.
///
/// Destinations keep the structure relative to `source_root`, re-rooted at
/// `destination_root`. Ignored paths are pruned at every depth, so an ignored
/// directory is never descended into.
pub fn collect_files(
    path: &Path,
    source_root: &Path,
    destination_root: &Path,
    ignored: &IgnorePatterns,
    inclusion: Inclusion,
) -> io::Result<Vec<FileTransfer>> {
    if ignored.is_ignored(path) {
        tracing::trace!(path = %path.display(), "ignored");
        return Ok(Vec::new());
    }

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        // dangling symlink inside a tracked directory
        Err(e) if e.kind() == io::ErrorKind::NotFound && path != source_root => {
            tracing::warn!(path = %path.display(), "skipping unreadable entry");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };

    if metadata.is_dir() {
        let mut children = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<io::Result<Vec<_>>>()?;
        children.sort();

        let nested = children
            .iter()
            .map(|child| collect_files(child, source_root, destination_root, ignored, inclusion))
            .collect::<io::Result<Vec<_>>>()?;
        return Ok(nested.into_iter().flatten().collect());
    }

    let include = match inclusion {
        Inclusion::All => true,
        Inclusion::ModifiedAfter(since) => DateTime::<Utc>::from(metadata.modified()?) > since,
    };
    if !include {
        return Ok(Vec::new());
    }

    let destination = match path.strip_prefix(source_root) {
        Ok(relative) if !relative.as_os_str().is_empty() => destination_root.join(relative),
        _ => destination_root.to_path_buf(),
    };
    Ok(vec![FileTransfer::new(path, destination)])
}
