//! Write a file so readers only ever see the old or the new version.
//!
//! Content goes to a hidden temp file next to the target, is synced, and
//! is renamed over the target only after every stage has succeeded.  On
//! failure the temp file is removed and the target is left untouched.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{JournalError, Result};

/// Temp path used while writing `path`: `.<name>.tmp` in the same directory,
/// so the final rename never crosses a filesystem.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

/// Stream content produced by `fill` into `path` atomically.
pub fn write_atomic<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let tmp_path = temp_path_for(path);
    let written = (|| -> Result<()> {
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        fill(&mut writer)?;
        writer.flush()?;
        let file = writer
            .into_inner()
            .map_err(|e| JournalError::Io(e.into_error()))?;
        file.sync_all()?;
        Ok(())
    })();

    match written {
        Ok(()) => {
            fs::rename(&tmp_path, path)?;
            debug!(path = %path.display(), "wrote file atomically");
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(&tmp_path);
            Err(e)
        }
    }
}
