//! Error types for Johnny Decimal parsing and folder resolution.

use std::path::PathBuf;
use thiserror::Error;

/// A name matched the JD prefix but could not be turned into an identifier.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid category '{category}' in {filename}")]
    InvalidCategory { filename: String, category: String },
}

/// Which level of the folder chain failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderLevel {
    Area,
    Category,
    Id,
    Extension,
}

impl std::fmt::Display for FolderLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FolderLevel::Area => "area",
            FolderLevel::Category => "category",
            FolderLevel::Id => "ID",
            FolderLevel::Extension => "extension",
        };
        f.write_str(name)
    }
}

/// Listing or creating a folder in the chain failed.
#[derive(Error, Debug)]
#[error("Could not ensure {level} folder under {}: {source}", .parent.display())]
pub struct FolderError {
    pub level: FolderLevel,
    pub parent: PathBuf,
    #[source]
    pub source: std::io::Error,
}
