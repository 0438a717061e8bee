//! Which on-disk generation a file belongs to, decided by extension alone.

use std::path::Path;

use crate::errors::{JournalError, Result};

/// Extension of the oldest, hex-text generation (JournalBear 5.0).
pub const TEXT_EXTENSION: &str = "ejournal";

/// Extension of the encrypted-archive generation (JournalBear 5.1 onward).
/// Its cipher layout changed between releases without the extension
/// changing, so a decoder for it must try both layouts.
pub const ARCHIVE_EXTENSION: &str = "zjournal";

/// A container generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    /// Encrypted JSON string stored as hex text; attachments stay inline.
    Text,
    /// Encrypted gzip(tar(`data.json` + `images/`)).
    Archive,
}

impl Generation {
    /// Route a path to its generation.  Anything else is rejected before a
    /// single byte is read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            TEXT_EXTENSION => Ok(Generation::Text),
            ARCHIVE_EXTENSION => Ok(Generation::Archive),
            "" => Err(JournalError::UnsupportedFormat(format!(
                "{} has no extension (expected .{ARCHIVE_EXTENSION} or .{TEXT_EXTENSION})",
                path.display()
            ))),
            other => Err(JournalError::UnsupportedFormat(format!(
                ".{other} (expected .{ARCHIVE_EXTENSION} or .{TEXT_EXTENSION})"
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Generation::Text => TEXT_EXTENSION,
            Generation::Archive => ARCHIVE_EXTENSION,
        }
    }

    /// The release that introduced this generation.
    pub fn release(&self) -> &'static str {
        match self {
            Generation::Text => "5.0",
            Generation::Archive => "5.1",
        }
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JournalBear {} (.{})", self.release(), self.extension())
    }
}
