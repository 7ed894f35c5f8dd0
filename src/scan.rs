//! One-shot recursive scan of the watched tree.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

use crate::classify::{Classifier, OutcomeKind, Source};
use crate::events::OutcomeSink;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Cannot read root {}: {source}", .path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Tally of a finished (or cancelled) scan.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub visited: usize,
    pub moved: usize,
    pub already_in_place: usize,
    pub excluded: usize,
    pub not_jd: usize,
    pub failed: usize,
    /// Entries the walk could not read; their subtrees were skipped.
    pub walk_errors: usize,
    pub cancelled: bool,
}

impl ScanReport {
    fn record(&mut self, kind: OutcomeKind) {
        self.visited += 1;
        match kind {
            OutcomeKind::Moved => self.moved += 1,
            OutcomeKind::AlreadyInPlace => self.already_in_place += 1,
            OutcomeKind::Excluded => self.excluded += 1,
            OutcomeKind::NotJdFile => self.not_jd += 1,
            OutcomeKind::Failed => self.failed += 1,
        }
    }

    /// Files that were (or in dry-run would have been) moved.
    pub fn touched(&self) -> usize {
        self.moved
    }
}

impl std::fmt::Display for ScanReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files: {} moved, {} in place, {} excluded, {} other, {} failed",
            self.visited,
            self.moved,
            self.already_in_place,
            self.excluded,
            self.not_jd,
            self.failed
        )?;
        if self.walk_errors > 0 {
            write!(f, ", {} unreadable", self.walk_errors)?;
        }
        if self.cancelled {
            f.write_str(" (cancelled)")?;
        }
        Ok(())
    }
}

/// Walk `root` depth-first and classify every regular file.
///
/// Fails only when the root itself cannot be read, before any file is
/// touched. Unreadable subtrees are counted and skipped. Cancellation stops
/// the walk between files.
///
/// This is blocking; run it on a blocking thread from async code.
pub fn scan(
    root: &Path,
    classifier: &Classifier,
    sink: &OutcomeSink,
    cancel: &CancellationToken,
) -> Result<ScanReport, ScanError> {
    fs::read_dir(root).map_err(|source| ScanError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    })?;

    let mut report = ScanReport::default();

    for entry in WalkDir::new(root).follow_links(false) {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("[scan] skipping unreadable entry: {e}");
                report.walk_errors += 1;
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let outcome = classifier.process_file(entry.path());
        report.record(outcome.kind());
        sink.outcome(Source::Scan, outcome);
    }

    Ok(report)
}
