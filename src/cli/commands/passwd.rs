//! `journalbear passwd`: change a journal's password.
//!
//! The journal is decrypted with the current password, then written back
//! with a fresh salt and IV under the new one.  The old file stays in
//! place until the new one is complete.

use std::path::Path;

use crate::cli::output;
use crate::cli::{load_settings, open_session, prompt_replacement_password, Cli};
use crate::errors::Result;

/// Execute the `passwd` command.
pub fn execute(cli: &Cli, file: &Path) -> Result<()> {
    let settings = load_settings()?;

    output::info("Enter the current journal password.");
    let mut session = open_session(cli, &settings, file)?;

    output::info("Choose the new journal password.");
    let new_password = prompt_replacement_password(&settings.strength_options())?;
    session.change_password(new_password, &settings.strength_options())?;

    output::success(&format!(
        "Password changed for {} ({} entries re-encrypted)",
        file.display(),
        session.journal().entries.len()
    ));

    Ok(())
}
