//! Single-file classification: decide, ensure the destination, move.
//!
//! ```text
//! path -> excluded?        -> Excluded
//!      -> JD prefix?       -> NotJdFile
//!      -> folder chain     -> Failed on I/O error
//!      -> already there?   -> AlreadyInPlace
//!      -> rename (or not)  -> Moved
//! ```
//!
//! Running the classifier again on a file it already moved is a no-op, which
//! is what lets the scan and the watcher both observe the same file safely.

mod error;
mod outcome;

pub use error::ClassifyError;
pub use outcome::{Outcome, OutcomeKind, Source};

use std::fs;
use std::path::{Path, PathBuf};

use crate::exclude::ExclusionSet;
use crate::jd::{self, JohnnyDecimalId};

/// Classifies and files paths under one watched root.
///
/// Read-only after construction; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Classifier {
    root: PathBuf,
    exclusions: ExclusionSet,
    dry_run: bool,
}

impl Classifier {
    pub fn new(root: impl Into<PathBuf>, exclusions: ExclusionSet, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            exclusions,
            dry_run,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Classify one file and move it into place if needed.
    ///
    /// Failures are returned as [`Outcome::Failed`] and never retried; the
    /// file stays where it was.
    pub fn process_file(&self, path: &Path) -> Outcome {
        if self.exclusions.is_excluded(path) {
            return Outcome::Excluded {
                path: path.to_path_buf(),
            };
        }

        let Some(file_name) = path.file_name() else {
            return Outcome::Failed {
                path: path.to_path_buf(),
                error: ClassifyError::NoFileName,
            };
        };

        let jd = match JohnnyDecimalId::parse(&file_name.to_string_lossy()) {
            Ok(Some(jd)) => jd,
            Ok(None) => {
                return Outcome::NotJdFile {
                    path: path.to_path_buf(),
                };
            }
            Err(e) => {
                return Outcome::Failed {
                    path: path.to_path_buf(),
                    error: e.into(),
                };
            }
        };

        let destination = if self.dry_run {
            jd::resolve_folders(&jd, &self.root)
        } else {
            jd::ensure_folders(&jd, &self.root)
        };
        let destination = match destination {
            Ok(dir) => dir,
            Err(e) => {
                return Outcome::Failed {
                    path: path.to_path_buf(),
                    error: e.into(),
                };
            }
        };

        let target = destination.join(file_name);
        if target == path {
            return Outcome::AlreadyInPlace {
                path: path.to_path_buf(),
            };
        }

        if !self.dry_run {
            if let Err(source) = fs::rename(path, &target) {
                return Outcome::Failed {
                    path: path.to_path_buf(),
                    error: ClassifyError::Rename { to: target, source },
                };
            }
        }

        Outcome::Moved {
            from: path.to_path_buf(),
            to: target,
            dry_run: self.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn classifier(root: &Path, exclude: &[&str], dry_run: bool) -> Classifier {
        let exclusions = ExclusionSet::compile(exclude.iter().copied(), root).unwrap();
        Classifier::new(root, exclusions, dry_run)
    }

    fn inventory(root: &Path) -> Vec<PathBuf> {
        let mut all: Vec<_> = walkdir::WalkDir::new(root)
            .into_iter()
            .map(|e| e.unwrap().into_path())
            .collect();
        all.sort();
        all
    }

    #[test]
    fn test_moves_jd_file() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let file = root.join("15.23 Report.pdf");
        fs::write(&file, "report").unwrap();

        let outcome = classifier(root, &[], false).process_file(&file);

        let expected = root.join("10-19/15/15.23/15.23 Report.pdf");
        match outcome {
            Outcome::Moved { from, to, dry_run } => {
                assert_eq!(from, file);
                assert_eq!(to, expected);
                assert!(!dry_run);
            }
            other => panic!("expected Moved, got {other:?}"),
        }
        assert!(expected.is_file());
        assert!(!file.exists());
    }

    #[test]
    fn test_second_pass_is_already_in_place() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let file = root.join("15.23+JEM Notes.txt");
        fs::write(&file, "notes").unwrap();
        let c = classifier(root, &[], false);

        let first = c.process_file(&file);
        let Some(moved_to) = first.new_path().map(Path::to_path_buf) else {
            panic!("expected a move, got {first:?}");
        };
        assert_eq!(
            moved_to,
            root.join("10-19/15/15.23/15.23+JEM/15.23+JEM Notes.txt")
        );

        let before = inventory(root);
        let second = c.process_file(&moved_to);
        assert_eq!(second.kind(), OutcomeKind::AlreadyInPlace);
        assert_eq!(inventory(root), before);
    }

    #[test]
    fn test_non_jd_file_untouched() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let file = root.join("shopping list.txt");
        fs::write(&file, "milk").unwrap();
        let before = inventory(root);

        let outcome = classifier(root, &[], false).process_file(&file);

        assert_eq!(outcome.kind(), OutcomeKind::NotJdFile);
        assert_eq!(inventory(root), before);
    }

    #[test]
    fn test_excluded_file_never_moves() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let file = root.join("15.23 Notes.txt");
        fs::write(&file, "notes").unwrap();

        let outcome = classifier(root, &["15.23*"], false).process_file(&file);

        assert_eq!(outcome.kind(), OutcomeKind::Excluded);
        assert!(file.exists());
        assert!(!root.join("10-19").exists());
    }

    #[test]
    fn test_dry_run_leaves_inventory_unchanged() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let file = root.join("42.07 Plan.md");
        fs::write(&file, "plan").unwrap();
        let before = inventory(root);

        let outcome = classifier(root, &[], true).process_file(&file);

        match outcome {
            Outcome::Moved { to, dry_run, .. } => {
                assert!(dry_run);
                assert_eq!(to, root.join("40-49/42/42.07/42.07 Plan.md"));
            }
            other => panic!("expected Moved, got {other:?}"),
        }
        assert_eq!(inventory(root), before);
    }

    #[test]
    fn test_dry_run_reports_already_in_place() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let dir = root.join("40-49 Work/42/42.07");
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("42.07 Plan.md");
        fs::write(&file, "plan").unwrap();

        let outcome = classifier(root, &[], true).process_file(&file);
        assert_eq!(outcome.kind(), OutcomeKind::AlreadyInPlace);
    }

    #[test]
    fn test_reuses_decorated_area() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("10-19 Admin")).unwrap();
        let file = root.join("15.23 Notes.txt");
        fs::write(&file, "notes").unwrap();

        let outcome = classifier(root, &[], false).process_file(&file);

        assert_eq!(
            outcome.new_path(),
            Some(root.join("10-19 Admin/15/15.23/15.23 Notes.txt").as_path())
        );
        assert!(!root.join("10-19").exists());
    }

    #[test]
    fn test_vanished_file_fails_without_retry() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let file = root.join("15.23 gone.txt");

        let outcome = classifier(root, &[], false).process_file(&file);

        match outcome {
            Outcome::Failed {
                error: ClassifyError::Rename { source, .. },
                ..
            } => assert_eq!(source.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected rename failure, got {other:?}"),
        }
    }

    #[test]
    fn test_dry_run_agrees_with_real_run_on_blocked_folder() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("10-19")).unwrap();
        fs::write(root.join("10-19/15"), "squatter").unwrap();
        let file = root.join("15.23 Notes.txt");
        fs::write(&file, "notes").unwrap();

        let dry = classifier(root, &[], true).process_file(&file);
        let real = classifier(root, &[], false).process_file(&file);

        assert_eq!(dry.kind(), OutcomeKind::Failed);
        assert_eq!(real.kind(), dry.kind());
        assert!(file.is_file());
    }
}
