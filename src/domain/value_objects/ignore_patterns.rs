//! Ignore patterns value object
//!
//! Shell-style globs (`*/.git/*`, `*.swp`, `.DS_Store`) that prune paths from
//! the file walk. A `*` may cross `/`, as with `fnmatch`.

use glob::{MatchOptions, Pattern};
use std::fmt;
use std::path::Path;

use crate::error::ConfigError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Compiled ignore globs.
#[derive(Clone, Default)]
pub struct IgnorePatterns {
    patterns: Vec<Pattern>,
}

impl IgnorePatterns {
    /// Create an empty pattern set (matches nothing).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile the configured patterns.
    pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|e| ConfigError::InvalidIgnorePattern {
                    pattern: p.to_string(),
                    message: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Whether `path` (or its final component) matches any pattern.
    pub fn is_ignored(&self, path: &Path) -> bool {
        let file_name = path.file_name().map(Path::new);
        self.patterns.iter().any(|pattern| {
            pattern.matches_path_with(path, MATCH_OPTIONS)
                || file_name.is_some_and(|name| pattern.matches_path_with(name, MATCH_OPTIONS))
        })
    }

    pub fn as_strings(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.as_str().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl fmt::Debug for IgnorePatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_strings()).finish()
    }
}
