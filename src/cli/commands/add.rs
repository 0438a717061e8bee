//! `journalbear add`: write an entry, optionally with images.
//!
//! Content comes from `--content`, from stdin when it is piped, or from
//! `$EDITOR` otherwise.  Images are read from disk and stored inline as
//! data URLs; they are split back out into `images/` on save.

use std::fs;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime, Utc};

use crate::cli::output;
use crate::cli::{load_settings, open_session, parse_date, Cli};
use crate::errors::{JournalError, Result};
use crate::journal::{DataUrl, JournalEntry, Sentiment};

/// Image types the journal viewer can display.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];

/// Options of the `add` command, as given on the command line.
pub struct AddArgs<'a> {
    pub date: Option<&'a str>,
    pub sentiment: Option<&'a str>,
    pub nsfw: bool,
    pub attach: &'a [PathBuf],
    pub content: Option<&'a str>,
    pub replace: bool,
}

/// Execute the `add` command.
pub fn execute(cli: &Cli, file: &Path, args: AddArgs<'_>) -> Result<()> {
    let date = match args.date {
        Some(d) => parse_date(d)?,
        None => Utc::now().date_naive(),
    };
    let sentiment = args
        .sentiment
        .map(|s| s.parse::<Sentiment>())
        .transpose()
        .map_err(JournalError::CommandFailed)?;
    let attachments = args
        .attach
        .iter()
        .map(|p| load_attachment(p))
        .collect::<Result<Vec<_>>>()?;

    let settings = load_settings()?;
    let mut session = open_session(cli, &settings, file)?;
    if !args.replace && session.journal().entry_for(date).is_some() {
        output::tip("Pass --replace to overwrite it.");
        return Err(JournalError::EntryExists(date));
    }

    let content = match args.content {
        Some(c) => c.to_string(),
        None => read_content()?,
    };

    let mut entry = JournalEntry::new(at_midnight(date), content);
    entry.sentiment = sentiment;
    entry.nsfw = args.nsfw;
    entry.attachment = attachments;
    let images = entry.attachment.len();

    if args.replace && session.journal().entry_for(date).is_some() {
        session.replace_entry(entry)?;
    } else {
        session.add_entry(entry)?;
    }
    session.save()?;

    output::success(&format!(
        "Saved the entry for {date}{}",
        match images {
            0 => String::new(),
            n => format!(" with {n} image(s)"),
        }
    ));

    Ok(())
}

fn at_midnight(date: NaiveDate) -> chrono::DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Read an image file into an inline data URL.
pub fn load_attachment(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if !IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(JournalError::CommandFailed(format!(
            "{} is not a supported image ({})",
            path.display(),
            IMAGE_EXTENSIONS.join(", ")
        )));
    }
    let bytes = fs::read(path)?;
    Ok(DataUrl::from_file(&ext, bytes).to_url())
}

fn read_content() -> Result<String> {
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        let mut content = String::new();
        stdin.lock().read_to_string(&mut content)?;
        return Ok(content);
    }

    dialoguer::Editor::new()
        .extension(".md")
        .edit("")
        .map_err(|e| JournalError::CommandFailed(format!("editor: {e}")))?
        .ok_or(JournalError::UserCancelled)
}
