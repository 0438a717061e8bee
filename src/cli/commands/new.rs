//! `journalbear new`: create an empty journal file.

use std::path::Path;

use crate::cli::output;
use crate::cli::{load_settings, prompt_new_password, workspace, Cli};
use crate::container::Generation;
use crate::errors::{JournalError, Result};
use crate::session::Session;

/// Execute the `new` command.
pub fn execute(cli: &Cli, file: &Path) -> Result<()> {
    Generation::from_path(file)?;
    if file.exists() {
        output::tip("Use `journalbear add` to write into the existing journal.");
        return Err(JournalError::JournalExists(file.to_path_buf()));
    }

    let settings = load_settings()?;
    let password = prompt_new_password(&settings.strength_options())?;
    let session = Session::create(
        workspace(cli, &settings)?,
        file,
        password,
        &settings.strength_options(),
    )?;

    output::success(&format!(
        "Created {} journal at {}",
        session.generation(),
        file.display()
    ));
    output::tip(&format!(
        "Run `journalbear add {}` to write your first entry.",
        file.display()
    ));

    Ok(())
}
