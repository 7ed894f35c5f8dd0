//! Johnny Decimal identifiers parsed from file names.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::error::ParseError;

/// Prefix a file name must start with to be filed: `15.23` or `15.23+JEM`.
pub const JD_FILE_PATTERN: &str = r"^(\d{2})\.(\d{2})(\+\S+)?";

static JD_FILE_REGEX: OnceLock<Regex> = OnceLock::new();

fn jd_file_regex() -> &'static Regex {
    JD_FILE_REGEX.get_or_init(|| Regex::new(JD_FILE_PATTERN).expect("JD pattern is a valid regex"))
}

/// A parsed Johnny Decimal identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JohnnyDecimalId {
    area: String,
    category: String,
    id: String,
    extension: Option<String>,
}

impl JohnnyDecimalId {
    /// Parse the Johnny Decimal prefix of a file name.
    ///
    /// Returns `Ok(None)` when the name has no JD prefix. That is a routing
    /// decision, not an error: such files are left where they are.
    /// Anything after the prefix is ignored.
    pub fn parse(filename: &str) -> Result<Option<Self>, ParseError> {
        let Some(caps) = jd_file_regex().captures(filename) else {
            return Ok(None);
        };

        let category = &caps[1];
        let subcode = &caps[2];

        let leading = category
            .chars()
            .next()
            .and_then(|c| c.to_digit(10))
            .ok_or_else(|| ParseError::InvalidCategory {
                filename: filename.to_string(),
                category: category.to_string(),
            })?;

        let area_start = leading * 10;
        let area = format!("{area_start:02}-{:02}", area_start + 9);

        Ok(Some(Self {
            area,
            category: category.to_string(),
            id: format!("{category}.{subcode}"),
            extension: caps.get(3).map(|m| m.as_str().to_string()),
        }))
    }

    /// Decade range, e.g. `10-19`.
    pub fn area(&self) -> &str {
        &self.area
    }

    /// Two-digit category, e.g. `15`.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Full identifier, e.g. `15.23`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Optional suffix including the leading `+`, e.g. `+JEM`.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Folder name prefixes from the root down to the file's destination.
    ///
    /// Three segments for a plain id, four when an extension is present
    /// (the last one being `id+extension`).
    pub fn folder_segments(&self) -> Vec<String> {
        let mut segments = vec![self.area.clone(), self.category.clone(), self.id.clone()];
        if let Some(ext) = &self.extension {
            segments.push(format!("{}{ext}", self.id));
        }
        segments
    }
}

impl fmt::Display for JohnnyDecimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Area: {}, Category: {}, ID: {}",
            self.area, self.category, self.id
        )?;
        if let Some(ext) = &self.extension {
            write!(f, ", Extension: {ext}")?;
        }
        Ok(())
    }
}
