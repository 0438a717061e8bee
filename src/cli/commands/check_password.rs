//! `journalbear check-password`: run a password past the strength rules
//! without touching any journal.

use crate::cli::output;
use crate::cli::{load_settings, prompt_password};
use crate::crypto::strength;
use crate::errors::{JournalError, Result};

/// Execute the `check-password` command.
pub fn execute() -> Result<()> {
    let settings = load_settings()?;
    let password = prompt_password()?;

    let violations = strength::check(&password, &settings.strength_options());
    if !violations.is_empty() {
        return Err(JournalError::WeakPassword(violations));
    }

    output::success("Password meets the strength rules.");
    Ok(())
}
