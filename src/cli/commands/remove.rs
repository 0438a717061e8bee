//! `journalbear remove`: delete one day's entry.

use std::path::Path;

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{load_settings, open_session, parse_date, Cli};
use crate::errors::{JournalError, Result};

/// Execute the `remove` command.
pub fn execute(cli: &Cli, file: &Path, date: &str, force: bool) -> Result<()> {
    let date = parse_date(date)?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete the entry for {date}?"))
            .default(false)
            .interact()
            .map_err(|e| JournalError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let settings = load_settings()?;
    let mut session = open_session(cli, &settings, file)?;
    session.remove_entry(date)?;
    session.save()?;

    output::success(&format!("Deleted the entry for {date}"));

    Ok(())
}
