//! The ArchiveTree layout: `data.json` plus an `images/` directory.
//!
//! `stage` turns an in-memory journal into that tree (externalizing inline
//! images) and `load` turns an extracted tree back into a self-contained
//! journal (re-inlining them).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{JournalError, Result};
use crate::journal::attachment::{self, DataUrl, IMAGES_DIR};
use crate::journal::JournalContainer;

/// Manifest written by this crate.
pub const MANIFEST_FILE: &str = "data.json";

/// Manifest name used by the 5.x releases.
pub const LEGACY_MANIFEST_FILE: &str = "journal.json";

/// Write `journal` into `dir` as `data.json` + `images/`.
///
/// `dir` is wiped first.  Every inline `data:image/...` attachment is
/// written to `images/<entryIdx>_<attachmentIdx>.<ext>` and replaced by
/// its relative path in the manifest.  Returns the number of images
/// written.
pub fn stage(journal: &JournalContainer, dir: &Path) -> Result<usize> {
    super::reset_dir(dir)?;
    let images = dir.join(IMAGES_DIR);
    fs::create_dir_all(&images)?;

    let mut manifest = journal.clone();
    let mut written = 0;
    for (entry_idx, entry) in manifest.entries.iter_mut().enumerate() {
        for (attachment_idx, reference) in entry.attachment.iter_mut().enumerate() {
            let Some(image) = DataUrl::parse(reference) else {
                continue;
            };
            let name = image.file_name(entry_idx, attachment_idx);
            fs::write(images.join(&name), &image.bytes)?;
            *reference = attachment::archive_reference(&name);
            written += 1;
        }
    }

    fs::write(dir.join(MANIFEST_FILE), manifest.to_json()?)?;
    debug!(dir = %dir.display(), images = written, "staged journal tree");
    Ok(written)
}

/// Read a journal back out of an extracted tree.
///
/// Relative image references are resolved against the directory holding
/// the manifest and turned back into data URLs.  A reference whose file
/// is missing is kept as-is.
pub fn load(dir: &Path) -> Result<JournalContainer> {
    let (root, manifest_path) = find_manifest(dir)?;

    let bytes = fs::read(&manifest_path)?;
    let mut journal = JournalContainer::from_json(&bytes).map_err(|e| {
        JournalError::CorruptArchive(format!("{}: {e}", manifest_path.display()))
    })?;

    for entry in &mut journal.entries {
        for reference in &mut entry.attachment {
            let Some(path) = attachment::resolve_reference(&root, reference) else {
                if !reference.starts_with("data:") {
                    warn!(reference = %reference, "attachment not found in archive");
                }
                continue;
            };
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_else(|| "png".to_string());
            let image = DataUrl::from_archive_file(&ext, fs::read(&path)?);
            *reference = image.to_url();
        }
    }

    Ok(journal)
}

/// Locate the manifest: `data.json` or `journal.json`, at the top level or
/// inside a single top-level directory (older releases archived the
/// staging folder by name).
fn find_manifest(dir: &Path) -> Result<(PathBuf, PathBuf)> {
    if let Some(found) = manifest_in(dir) {
        return Ok((dir.to_path_buf(), found));
    }

    let subdirs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    if let [only] = subdirs.as_slice() {
        if let Some(found) = manifest_in(only) {
            return Ok((only.clone(), found));
        }
    }

    Err(JournalError::CorruptArchive(format!(
        "archive contains no {MANIFEST_FILE}"
    )))
}

fn manifest_in(dir: &Path) -> Option<PathBuf> {
    [MANIFEST_FILE, LEGACY_MANIFEST_FILE]
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::JournalEntry;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn journal_with_images() -> JournalContainer {
        let mut journal = JournalContainer::new();
        let mut entry = JournalEntry::new(Utc.with_ymd_and_hms(2022, 1, 1, 9, 0, 0).unwrap(), "a");
        entry.attachment = vec![PIXEL.to_string(), "data:image/jpeg;base64,/9j/4A==".to_string()];
        journal.add_entry(entry).unwrap();
        journal
    }

    #[test]
    fn stage_externalizes_inline_images() {
        let dir = TempDir::new().unwrap();
        let written = stage(&journal_with_images(), dir.path()).unwrap();
        assert_eq!(written, 2);
        assert!(dir.path().join("images/0_0.png").is_file());
        assert!(dir.path().join("images/0_1.jpeg").is_file());

        let manifest: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join(MANIFEST_FILE)).unwrap()).unwrap();
        assert_eq!(manifest["en"][0]["attachment"][0], "images/0_0.png");
    }

    #[test]
    fn stage_then_load_restores_data_urls() {
        let dir = TempDir::new().unwrap();
        let journal = journal_with_images();
        stage(&journal, dir.path()).unwrap();
        assert_eq!(load(dir.path()).unwrap(), journal);
    }

    #[test]
    fn stage_wipes_previous_contents() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("stale.txt"), b"old").unwrap();
        stage(&JournalContainer::new(), dir.path()).unwrap();
        assert!(!dir.path().join("stale.txt").exists());
    }

    #[test]
    fn load_finds_legacy_manifest_in_subdirectory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("_jbfiles");
        fs::create_dir_all(nested.join("images")).unwrap();
        fs::write(nested.join("images/x.png"), b"\x89PNG\r\n\x1a\n").unwrap();
        fs::write(
            nested.join(LEGACY_MANIFEST_FILE),
            br#"{"en":[{"entryDate":"2018-06-01T00:00:00.000Z","content":"old","attachment":["./_jbfiles/images/x.png","images/gone.png"]}]}"#,
        )
        .unwrap();

        let journal = load(dir.path()).unwrap();
        let refs = &journal.entries[0].attachment;
        assert_eq!(refs[0], PIXEL);
        assert_eq!(refs[1], "images/gone.png");
    }

    #[test]
    fn load_without_manifest_is_corrupt_archive() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("other.txt"), b"x").unwrap();
        assert!(matches!(
            load(dir.path()),
            Err(JournalError::CorruptArchive(_))
        ));
    }

    #[test]
    fn load_with_bad_json_is_corrupt_archive() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), b"{not json").unwrap();
        assert!(matches!(
            load(dir.path()),
            Err(JournalError::CorruptArchive(_))
        ));
    }
}
