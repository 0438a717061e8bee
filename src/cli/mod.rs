//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::container::Workspace;
use crate::crypto::strength::{self, StrengthOptions};
use crate::errors::{JournalError, Result};
use crate::session::Session;

/// Environment variable that supplies the password non-interactively.
pub const PASSWORD_ENV: &str = "JOURNALBEAR_PASSWORD";

/// Replacement password for `passwd` and `convert --new-password`.
pub const NEW_PASSWORD_ENV: &str = "JOURNALBEAR_NEW_PASSWORD";

/// JournalBear CLI: read and write encrypted journals.
#[derive(Parser)]
#[command(
    name = "journalbear",
    about = "Encrypted journal reader and writer (.zjournal / .ejournal)",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log codec progress (same as JOURNALBEAR_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Parent directory for scratch space (overrides the config file)
    #[arg(long, global = true)]
    pub scratch_dir: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new, empty journal
    New {
        /// Journal file (.zjournal or .ejournal)
        file: PathBuf,
    },

    /// List entries, newest first
    List {
        /// Journal file
        file: PathBuf,
    },

    /// Print one day's entry
    Show {
        /// Journal file
        file: PathBuf,
        /// Day of the entry (YYYY-MM-DD)
        date: String,
    },

    /// Write an entry
    Add {
        /// Journal file
        file: PathBuf,
        /// Day of the entry (default: today)
        #[arg(short, long)]
        date: Option<String>,
        /// Happy, Angry, Sad, Neutral, Loved or Excited
        #[arg(short, long)]
        sentiment: Option<String>,
        /// Mark the entry as not safe for work
        #[arg(long)]
        nsfw: bool,
        /// Image file to attach (repeatable)
        #[arg(short, long = "attach")]
        attach: Vec<PathBuf>,
        /// Entry text (omit to open an editor, or pipe it on stdin)
        #[arg(short, long)]
        content: Option<String>,
        /// Overwrite an existing entry for the same day
        #[arg(long)]
        replace: bool,
    },

    /// Delete one day's entry
    Remove {
        /// Journal file
        file: PathBuf,
        /// Day of the entry (YYYY-MM-DD)
        date: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Print the decrypted journal as JSON
    Export {
        /// Journal file
        file: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Save every attached image into a directory
    Images {
        /// Journal file
        file: PathBuf,
        /// Destination directory
        dir: PathBuf,
    },

    /// Re-save a journal under another file name or generation
    Convert {
        /// Journal file to read
        file: PathBuf,
        /// File to write; its extension picks the generation
        out: PathBuf,
        /// Prompt for a password for the new file
        #[arg(long)]
        new_password: bool,
    },

    /// Check a password against the strength rules
    CheckPassword,

    /// Change a journal's password
    Passwd {
        /// Journal file
        file: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Settings from `.journalbear.toml` in the current directory.
pub fn load_settings() -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    Settings::load(&cwd)
}

/// A fresh workspace under `--scratch-dir`, the configured dir, or the OS temp dir.
pub fn workspace(cli: &Cli, settings: &Settings) -> Result<Workspace> {
    let parent = cli
        .scratch_dir
        .as_deref()
        .or(settings.scratch_dir.as_deref());
    Workspace::new(parent)
}

/// Prompt for the password and open `file`.
pub fn open_session(cli: &Cli, settings: &Settings, file: &Path) -> Result<Session> {
    if !file.exists() {
        return Err(JournalError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", file.display()),
        )));
    }
    let password = prompt_password()?;
    Session::open(workspace(cli, settings)?, file, password)
}

/// Get the journal password, trying in order:
/// 1. `JOURNALBEAR_PASSWORD` env var
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env(PASSWORD_ENV) {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Journal password")
        .allow_empty_password(true)
        .interact()
        .map_err(|e| JournalError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Password for a journal being created.  Also respects `JOURNALBEAR_PASSWORD`.
pub fn prompt_new_password(options: &StrengthOptions) -> Result<Zeroizing<String>> {
    choose_password(PASSWORD_ENV, options)
}

/// Password replacing the current one.  Respects `JOURNALBEAR_NEW_PASSWORD`.
pub fn prompt_replacement_password(options: &StrengthOptions) -> Result<Zeroizing<String>> {
    choose_password(NEW_PASSWORD_ENV, options)
}

/// Ask for a password with confirmation until it passes the strength
/// rules.  A password taken from `env` is used as-is but must still pass.
fn choose_password(env: &str, options: &StrengthOptions) -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env(env) {
        strength::ensure_strong(&pw, options)?;
        return Ok(pw);
    }

    loop {
        let password = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Choose journal password")
                .with_confirmation("Confirm password", "Passwords do not match, try again")
                .interact()
                .map_err(|e| JournalError::CommandFailed(format!("password prompt: {e}")))?,
        );

        let violations = strength::check(&password, options);
        if violations.is_empty() {
            return Ok(password);
        }
        for v in &violations {
            output::warning(v);
        }
    }
}

fn password_from_env(var: &str) -> Option<Zeroizing<String>> {
    std::env::var(var)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

/// Parse a `YYYY-MM-DD` day given on the command line.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| JournalError::CommandFailed(format!("'{s}' is not a date (expected YYYY-MM-DD)")))
}
