//! `journalbear images`: save every attached image to a directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::cli::output;
use crate::cli::{load_settings, open_session, Cli};
use crate::errors::Result;
use crate::journal::{DataUrl, JournalContainer};

/// Execute the `images` command.
pub fn execute(cli: &Cli, file: &Path, dir: &Path) -> Result<()> {
    let settings = load_settings()?;
    let session = open_session(cli, &settings, file)?;

    let written = extract_images(session.journal(), dir)?;
    if written.is_empty() {
        output::info("No images in this journal.");
    } else {
        output::success(&format!(
            "Saved {} image(s) to {}",
            written.len(),
            dir.display()
        ));
    }

    Ok(())
}

/// Write each inline image as `<date>_<n>.<ext>` under `dir`.
/// References that are not data URLs are skipped.
pub fn extract_images(journal: &JournalContainer, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for entry in journal.sorted_entries() {
        for (n, reference) in entry.attachment.iter().enumerate() {
            let Some(image) = DataUrl::parse(reference) else {
                warn!(date = %entry.date(), "skipping attachment that is not an inline image");
                continue;
            };
            let path = dir.join(format!("{}_{n}.{}", entry.date(), image.extension()));
            fs::write(&path, &image.bytes)?;
            written.push(path);
        }
    }

    Ok(written)
}
