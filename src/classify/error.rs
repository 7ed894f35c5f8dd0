use std::path::PathBuf;
use thiserror::Error;

use crate::jd::{FolderError, ParseError};

/// Why a file could not be filed. Always contained to that one file.
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Johnny Decimal parsing error: {0}")]
    Parse(#[from] ParseError),

    #[error("Error creating folders: {0}")]
    Folders(#[from] FolderError),

    #[error("Error moving to {}: {source}", .to.display())]
    Rename {
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path has no file name")]
    NoFileName,
}
