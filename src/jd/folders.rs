//! Area/Category/ID folder chain resolution.
//!
//! Each level reuses an existing directory whose name *starts with* the
//! expected code, so hand-decorated folders such as `10-19 Admin` keep
//! working. When several directories share the prefix, the first one in
//! directory-listing order wins.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::error::{FolderError, FolderLevel};
use super::id::JohnnyDecimalId;

const LEVELS: [FolderLevel; 4] = [
    FolderLevel::Area,
    FolderLevel::Category,
    FolderLevel::Id,
    FolderLevel::Extension,
];

/// Make sure the folder chain for `jd` exists under `root`, creating any
/// missing level. Returns the destination folder.
pub fn ensure_folders(jd: &JohnnyDecimalId, root: &Path) -> Result<PathBuf, FolderError> {
    walk_chain(jd, root, true)
}

/// Compute the destination folder for `jd` without touching the filesystem.
///
/// Existing prefix folders are reused exactly as [`ensure_folders`] would;
/// missing levels are named after their code.
pub fn resolve_folders(jd: &JohnnyDecimalId, root: &Path) -> Result<PathBuf, FolderError> {
    walk_chain(jd, root, false)
}

fn walk_chain(jd: &JohnnyDecimalId, root: &Path, create: bool) -> Result<PathBuf, FolderError> {
    let mut current = root.to_path_buf();
    // Once a level is missing in read-only mode, nothing below it can exist.
    let mut missing = false;

    for (level, prefix) in LEVELS.into_iter().zip(jd.folder_segments()) {
        if missing {
            current = current.join(&prefix);
            continue;
        }

        let found = find_prefixed_folder(&current, &prefix)
            .map_err(|e| folder_error(level, &current, e))?;

        current = match found {
            Some(existing) => existing,
            None => {
                let path = current.join(&prefix);
                match fs::metadata(&path) {
                    // A symlink to a directory: walk through it.
                    Ok(meta) if meta.is_dir() => {}
                    Ok(_) => {
                        let e = io::Error::new(
                            io::ErrorKind::AlreadyExists,
                            format!("{} exists and is not a directory", path.display()),
                        );
                        return Err(folder_error(level, &current, e));
                    }
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        if create {
                            create_folder(&path).map_err(|e| folder_error(level, &current, e))?;
                        } else {
                            missing = true;
                        }
                    }
                    Err(e) => return Err(folder_error(level, &current, e)),
                }
                path
            }
        };
    }

    Ok(current)
}

fn folder_error(level: FolderLevel, parent: &Path, source: io::Error) -> FolderError {
    FolderError {
        level,
        parent: parent.to_path_buf(),
        source,
    }
}

/// First directory in `parent` whose name starts with `prefix`.
fn find_prefixed_folder(parent: &Path, prefix: &str) -> io::Result<Option<PathBuf>> {
    for entry in fs::read_dir(parent)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with(prefix) {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

/// Create a single directory. Losing a race to another creator is fine.
fn create_folder(path: &Path) -> io::Result<()> {
    match fs::create_dir(path) {
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        other => other,
    }
}
