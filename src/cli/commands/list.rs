//! `journalbear list`: show every entry in a table.

use std::path::Path;

use crate::cli::output;
use crate::cli::{load_settings, open_session, Cli};
use crate::container::Scheme;
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, file: &Path) -> Result<()> {
    let settings = load_settings()?;
    let session = open_session(cli, &settings, file)?;
    let entries = session.journal().sorted_entries();

    output::info(&format!(
        "{}: {} entr{} ({})",
        file.display(),
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" },
        session.generation()
    ));

    output::print_entries_table(&entries, settings.preview_length);

    if session.journal().is_newer_than_app() {
        output::warning("This journal was written by a newer version of JournalBear.");
    }
    if session.scheme() == Scheme::Legacy {
        output::tip("This file uses the old unsalted encryption; any save will upgrade it.");
    }

    Ok(())
}
