//! Exclusion rules for the watched tree.
//!
//! Patterns are globs over `/`-separated paths relative to the watched
//! root. `*` stays within one path component, `**` spans directories:
//!
//! ```text
//! "15.23*"        top-level files starting with 15.23
//! "Inbox/**"      everything under Inbox
//! "**/*.part"     partial downloads anywhere
//! ```

use glob::{MatchOptions, Pattern, PatternError};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExcludeError {
    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled exclude patterns rooted at the watched directory.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    root: PathBuf,
    patterns: Vec<Pattern>,
}

impl ExclusionSet {
    /// Compile `patterns` for paths under `root`.
    ///
    /// Fails on the first invalid pattern; running unfiltered is never an option.
    pub fn compile<I, S>(patterns: I, root: impl Into<PathBuf>) -> Result<Self, ExcludeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|source| ExcludeError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root: root.into(),
            patterns,
        })
    }

    /// An exclusion set that excludes nothing.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            patterns: Vec::new(),
        }
    }

    /// Whether `path` matches any exclude pattern.
    ///
    /// Paths outside the root are matched in their raw form.
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return false;
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let normalized = normalize_separators(relative);

        self.patterns
            .iter()
            .any(|p| p.matches_with(&normalized, MATCH_OPTIONS))
    }

    /// Source text of the compiled patterns, in order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Pattern::as_str)
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True when nothing is excluded.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn normalize_separators(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
