//! `journalbear show`: print one day's entry.

use std::path::Path;

use crate::cli::output;
use crate::cli::{load_settings, open_session, parse_date, Cli};
use crate::errors::{JournalError, Result};

/// Execute the `show` command.
pub fn execute(cli: &Cli, file: &Path, date: &str) -> Result<()> {
    let date = parse_date(date)?;
    let settings = load_settings()?;
    let session = open_session(cli, &settings, file)?;

    let entry = session
        .journal()
        .entry_for(date)
        .ok_or(JournalError::EntryNotFound(date))?;
    output::print_entry(entry);

    Ok(())
}
