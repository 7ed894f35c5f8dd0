//! Classification results reported to the host.

use std::path::{Path, PathBuf};

use super::error::ClassifyError;

/// What happened to a single file.
///
/// Closed set: hosts match exhaustively to log or notify.
#[derive(Debug)]
pub enum Outcome {
    /// Matched an exclude pattern; never moved.
    Excluded { path: PathBuf },

    /// Name has no Johnny Decimal prefix; left untouched.
    NotJdFile { path: PathBuf },

    /// Relocated (or, in dry-run, would have been).
    Moved {
        from: PathBuf,
        to: PathBuf,
        dry_run: bool,
    },

    /// Already at its destination; nothing to do.
    AlreadyInPlace { path: PathBuf },

    /// Could not be filed; left where it was.
    Failed { path: PathBuf, error: ClassifyError },
}

/// Discriminant of an [`Outcome`], for tallies and comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Excluded,
    NotJdFile,
    Moved,
    AlreadyInPlace,
    Failed,
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Excluded { .. } => OutcomeKind::Excluded,
            Outcome::NotJdFile { .. } => OutcomeKind::NotJdFile,
            Outcome::Moved { .. } => OutcomeKind::Moved,
            Outcome::AlreadyInPlace { .. } => OutcomeKind::AlreadyInPlace,
            Outcome::Failed { .. } => OutcomeKind::Failed,
        }
    }

    /// The path the file had when it was classified.
    pub fn path(&self) -> &Path {
        match self {
            Outcome::Excluded { path }
            | Outcome::NotJdFile { path }
            | Outcome::AlreadyInPlace { path }
            | Outcome::Failed { path, .. } => path,
            Outcome::Moved { from, .. } => from,
        }
    }

    /// The file's location after classification, if it is known to have changed.
    pub fn new_path(&self) -> Option<&Path> {
        match self {
            Outcome::Moved {
                to, dry_run: false, ..
            } => Some(to),
            _ => None,
        }
    }

    /// Whether a host should surface this outcome to the user.
    pub fn is_notable(&self) -> bool {
        matches!(self, Outcome::Moved { .. } | Outcome::Failed { .. })
    }
}

/// Which driver observed the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Scan,
    Watch,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Scan => f.write_str("scan"),
            Source::Watch => f.write_str("watcher"),
        }
    }
}
