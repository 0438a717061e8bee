//! `journalbear export`: write the decrypted journal as JSON.

use std::fs;
use std::path::Path;

use crate::cli::output;
use crate::cli::{load_settings, open_session, Cli};
use crate::container::Generation;
use crate::errors::{JournalError, Result};
use crate::journal::JournalContainer;

/// Execute the `export` command.
pub fn execute(cli: &Cli, file: &Path, output_path: Option<&Path>) -> Result<()> {
    // Refuse to write plaintext over an encrypted journal.
    if let Some(dest) = output_path {
        if Generation::from_path(dest).is_ok() {
            return Err(JournalError::CommandFailed(
                "refusing to export over a journal file".into(),
            ));
        }
    }

    let settings = load_settings()?;
    let session = open_session(cli, &settings, file)?;
    let content = format_as_json(session.journal())?;

    match output_path {
        Some(dest) => {
            fs::write(dest, &content).map_err(|e| {
                JournalError::CommandFailed(format!("failed to write export file: {e}"))
            })?;
            output::success(&format!(
                "Exported {} entries to {}",
                session.journal().entries.len(),
                dest.display()
            ));
            output::warning("The exported file is not encrypted.");
        }
        None => {
            println!("{content}");
        }
    }

    Ok(())
}

/// Pretty-printed JSON in the same shape as `data.json`.
fn format_as_json(journal: &JournalContainer) -> Result<String> {
    serde_json::to_string_pretty(journal)
        .map_err(|e| JournalError::SerializationError(format!("JSON export: {e}")))
}
