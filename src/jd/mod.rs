//! Johnny Decimal naming: identifier parsing and the folder chain it maps to.
//!
//! ```text
//! "15.23+JEM Notes.txt"
//!   -> JohnnyDecimalId { area: 10-19, category: 15, id: 15.23, extension: +JEM }
//!   -> <root>/10-19/15/15.23/15.23+JEM/
//! ```

mod error;
mod folders;
mod id;

pub use error::{FolderError, FolderLevel, ParseError};
pub use folders::{ensure_folders, resolve_folders};
pub use id::{JD_FILE_PATTERN, JohnnyDecimalId};
