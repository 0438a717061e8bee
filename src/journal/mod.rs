//! Journal module: the in-memory data model.
//!
//! This module provides:
//! - `JournalEntry` and `Sentiment` (`entry`)
//! - Data URL / archive path handling for attachments (`attachment`)
//! - `JournalContainer`, the document that gets encrypted (below)

pub mod attachment;
pub mod entry;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{JournalError, Result};

pub use attachment::DataUrl;
pub use entry::{JournalEntry, Sentiment};

/// Format version stamped on every journal this build saves.
pub const FORMAT_VERSION: f64 = 6.0;

/// The serialized document: `{ "version": 6.0, "en": [ ... ] }`.
///
/// `version` is advisory.  It is never used to pick a decoder; it only
/// drives the "written by a newer release" warning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JournalContainer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<f64>,

    #[serde(rename = "en", default)]
    pub entries: Vec<JournalEntry>,
}

impl JournalContainer {
    /// An empty journal stamped with the current format version.
    pub fn new() -> Self {
        Self {
            version: Some(FORMAT_VERSION),
            entries: Vec::new(),
        }
    }

    /// Parse the JSON manifest.
    pub fn from_json(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| JournalError::SerializationError(format!("journal: {e}")))
    }

    /// `true` if a newer release wrote this file.
    pub fn is_newer_than_app(&self) -> bool {
        self.version.is_some_and(|v| v > FORMAT_VERSION)
    }

    /// Entry for a calendar day, if any.
    pub fn entry_for(&self, date: NaiveDate) -> Option<&JournalEntry> {
        self.entries.iter().find(|e| e.date() == date)
    }

    /// Add an entry.  A journal holds at most one entry per calendar day.
    pub fn add_entry(&mut self, entry: JournalEntry) -> Result<()> {
        let date = entry.date();
        if self.entry_for(date).is_some() {
            return Err(JournalError::EntryExists(date));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Replace the entry for the same day, returning the old one.
    pub fn replace_entry(&mut self, entry: JournalEntry) -> Result<JournalEntry> {
        let date = entry.date();
        let slot = self
            .entries
            .iter_mut()
            .find(|e| e.date() == date)
            .ok_or(JournalError::EntryNotFound(date))?;
        Ok(std::mem::replace(slot, entry))
    }

    pub fn remove_entry(&mut self, date: NaiveDate) -> Result<JournalEntry> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.date() == date)
            .ok_or(JournalError::EntryNotFound(date))?;
        Ok(self.entries.remove(idx))
    }

    /// Entries newest first, as the journal view shows them.
    pub fn sorted_entries(&self) -> Vec<&JournalEntry> {
        let mut list: Vec<&JournalEntry> = self.entries.iter().collect();
        list.sort_by(|a, b| b.entry_date.cmp(&a.entry_date));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(day: u32, hour: u32) -> JournalEntry {
        JournalEntry::new(Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap(), "text")
    }

    #[test]
    fn empty_journal_json_shape() {
        let json = String::from_utf8(JournalContainer::new().to_json().unwrap()).unwrap();
        assert_eq!(json, r#"{"version":6.0,"en":[]}"#);
    }

    #[test]
    fn parses_minimal_document() {
        let journal = JournalContainer::from_json(br#"{"en":[]}"#).unwrap();
        assert_eq!(journal.version, None);
        assert!(journal.entries.is_empty());
        assert!(!journal.is_newer_than_app());
    }

    #[test]
    fn newer_version_is_detected() {
        let journal = JournalContainer::from_json(br#"{"version":7.1,"en":[]}"#).unwrap();
        assert!(journal.is_newer_than_app());
    }

    #[test]
    fn one_entry_per_day() {
        let mut journal = JournalContainer::new();
        journal.add_entry(entry(1, 8)).unwrap();
        let err = journal.add_entry(entry(1, 20)).unwrap_err();
        assert!(matches!(err, JournalError::EntryExists(_)));
        journal.add_entry(entry(2, 8)).unwrap();
        assert_eq!(journal.entries.len(), 2);
    }

    #[test]
    fn replace_and_remove() {
        let mut journal = JournalContainer::new();
        journal.add_entry(entry(1, 8)).unwrap();

        let mut updated = entry(1, 9);
        updated.content = "updated".into();
        let old = journal.replace_entry(updated).unwrap();
        assert_eq!(old.content, "text");

        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(journal.entry_for(date).unwrap().content, "updated");
        journal.remove_entry(date).unwrap();
        assert!(matches!(
            journal.remove_entry(date),
            Err(JournalError::EntryNotFound(_))
        ));
    }

    #[test]
    fn sorted_newest_first() {
        let mut journal = JournalContainer::new();
        journal.add_entry(entry(1, 8)).unwrap();
        journal.add_entry(entry(3, 8)).unwrap();
        journal.add_entry(entry(2, 8)).unwrap();
        let days: Vec<u32> = journal
            .sorted_entries()
            .iter()
            .map(|e| chrono::Datelike::day(&e.date()))
            .collect();
        assert_eq!(days, vec![3, 2, 1]);
    }
}
