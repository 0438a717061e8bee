//! `journalbear convert`: re-save a journal as another file or generation.
//!
//! Works for every generation on either side, so it doubles as the way to
//! upgrade an unsalted file: the output is always written salted.

use std::path::Path;

use crate::cli::output;
use crate::cli::{load_settings, open_session, prompt_replacement_password, Cli};
use crate::container::{Generation, Scheme};
use crate::errors::{JournalError, Result};

/// Execute the `convert` command.
pub fn execute(cli: &Cli, file: &Path, out: &Path, new_password: bool) -> Result<()> {
    // Route the output before asking for anything.
    let target = Generation::from_path(out)?;
    if out.exists() {
        return Err(JournalError::JournalExists(out.to_path_buf()));
    }

    let settings = load_settings()?;
    let mut session = open_session(cli, &settings, file)?;
    let source = session.generation();
    let was_legacy = session.scheme() == Scheme::Legacy;

    if new_password {
        output::info("Choose a password for the new file.");
        let strength = settings.strength_options();
        let password = prompt_replacement_password(&strength)?;
        session.save_as_with_password(out, password, &strength)?;
    } else {
        session.save_as(out)?;
    }

    output::success(&format!(
        "Converted {} ({source}) to {} ({target})",
        file.display(),
        out.display()
    ));
    if was_legacy {
        output::info("The new file uses salted PBKDF2 encryption.");
    }

    Ok(())
}
