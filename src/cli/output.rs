//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::journal::JournalEntry;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of entries (Date, Sentiment, Images, Preview).
pub fn print_entries_table(entries: &[&JournalEntry], preview_length: usize) {
    if entries.is_empty() {
        info("No entries in this journal yet.");
        tip("Run `journalbear add <FILE>` to write your first entry.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Date", "Sentiment", "Images", "Preview"]);

    for e in entries {
        let mut preview = preview(&e.content, preview_length);
        if e.nsfw {
            preview = format!("[nsfw] {preview}");
        }
        table.add_row(vec![
            e.date().format("%Y-%m-%d").to_string(),
            e.sentiment.map(|s| s.to_string()).unwrap_or_default(),
            e.attachment.len().to_string(),
            preview,
        ]);
    }

    println!("{table}");
}

/// Print a single entry in full.
pub fn print_entry(entry: &JournalEntry) {
    let mut heading = entry.entry_date.format("%A, %B %-d, %Y").to_string();
    if let Some(sentiment) = entry.sentiment {
        heading.push_str(&format!(" ({sentiment})"));
    }
    println!("{}", style(heading).bold());
    if entry.nsfw {
        println!("{}", style("marked nsfw").yellow());
    }
    println!();
    println!("{}", entry.content);
    if !entry.attachment.is_empty() {
        println!();
        tip(&format!("{} image(s) attached", entry.attachment.len()));
    }
}

/// First line of `content`, cut to `max` characters.
pub fn preview(content: &str, max: usize) -> String {
    let line = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if line.chars().count() <= max {
        return line.to_string();
    }
    let mut cut: String = line.chars().take(max.saturating_sub(1)).collect();
    cut.push('\u{2026}');
    cut
}
