//! An open journal: where it lives, how it is locked, and what is in it.
//!
//! `Session` is what commands work with.  It owns the password and the
//! in-memory journal, and hands every encode/decode to its `Workspace`,
//! so the codec underneath stays stateless.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::container::{Generation, Scheme, Workspace};
use crate::crypto::strength::{ensure_strong, StrengthOptions};
use crate::errors::{JournalError, Result};
use crate::journal::{JournalContainer, JournalEntry, FORMAT_VERSION};

pub struct Session {
    /// Scratch directory and its lock.
    workspace: Workspace,

    /// File the journal is saved to.
    path: PathBuf,

    /// Generation selected by `path`'s extension.
    generation: Generation,

    /// Layout the file was found in.  Always salted once saved.
    scheme: Scheme,

    /// Wiped on drop.
    password: Zeroizing<String>,

    journal: JournalContainer,
}

impl Session {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create an empty journal at `path` and write it to disk.
    ///
    /// The password must pass the strength rules; an existing file is
    /// never overwritten.
    pub fn create(
        workspace: Workspace,
        path: &Path,
        password: Zeroizing<String>,
        strength: &StrengthOptions,
    ) -> Result<Self> {
        let generation = Generation::from_path(path)?;
        if path.exists() {
            return Err(JournalError::JournalExists(path.to_path_buf()));
        }
        ensure_strong(&password, strength)?;

        let mut session = Self {
            workspace,
            path: path.to_path_buf(),
            generation,
            scheme: Scheme::Salted,
            password,
            journal: JournalContainer::new(),
        };
        session.save()?;
        info!(path = %path.display(), "created journal");
        Ok(session)
    }

    /// Open an existing journal, whichever generation and layout it uses.
    pub fn open(workspace: Workspace, path: &Path, password: Zeroizing<String>) -> Result<Self> {
        let decoded = workspace.open(path, password.as_bytes())?;

        if decoded.journal.is_newer_than_app() {
            warn!(
                version = ?decoded.journal.version,
                supported = FORMAT_VERSION,
                "journal was written by a newer version of JournalBear"
            );
        }
        if decoded.scheme == Scheme::Legacy {
            info!(path = %path.display(), "journal uses the unsalted layout; saving will upgrade it");
        }

        Ok(Self {
            workspace,
            path: path.to_path_buf(),
            generation: decoded.generation,
            scheme: decoded.scheme,
            password,
            journal: decoded.journal,
        })
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Write the journal back to its file, stamped with this app's version.
    pub fn save(&mut self) -> Result<()> {
        self.journal.version = Some(FORMAT_VERSION);
        self.workspace
            .save(&self.path, &self.journal, self.password.as_bytes())?;
        self.scheme = Scheme::Salted;
        Ok(())
    }

    /// Write the journal to a new path and make that the session's file.
    /// The extension of `path` decides the generation written.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        let generation = Generation::from_path(path)?;
        self.journal.version = Some(FORMAT_VERSION);
        self.workspace
            .save(path, &self.journal, self.password.as_bytes())?;
        self.path = path.to_path_buf();
        self.generation = generation;
        self.scheme = Scheme::Salted;
        Ok(())
    }

    /// [`Session::save_as`] under a new password.  Nothing is written
    /// unless the password passes the strength rules, and the session keeps
    /// its old path and password if the write fails.
    pub fn save_as_with_password(
        &mut self,
        path: &Path,
        new_password: Zeroizing<String>,
        strength: &StrengthOptions,
    ) -> Result<()> {
        Generation::from_path(path)?;
        ensure_strong(&new_password, strength)?;
        let old = std::mem::replace(&mut self.password, new_password);
        if let Err(e) = self.save_as(path) {
            self.password = old;
            return Err(e);
        }
        info!(path = %path.display(), "saved under a new password");
        Ok(())
    }

    /// Re-encrypt the journal under a new password.
    pub fn change_password(
        &mut self,
        new_password: Zeroizing<String>,
        strength: &StrengthOptions,
    ) -> Result<()> {
        ensure_strong(&new_password, strength)?;
        let old = std::mem::replace(&mut self.password, new_password);
        if let Err(e) = self.save() {
            self.password = old;
            return Err(e);
        }
        info!(path = %self.path.display(), "password changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Entries
    // ------------------------------------------------------------------

    pub fn add_entry(&mut self, entry: JournalEntry) -> Result<()> {
        self.journal.add_entry(entry)
    }

    pub fn replace_entry(&mut self, entry: JournalEntry) -> Result<JournalEntry> {
        self.journal.replace_entry(entry)
    }

    pub fn remove_entry(&mut self, date: NaiveDate) -> Result<JournalEntry> {
        self.journal.remove_entry(date)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn journal(&self) -> &JournalContainer {
        &self.journal
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::fs;
    use tempfile::TempDir;

    const PASSWORD: &str = "Correct-Horse-9";

    fn pw(s: &str) -> Zeroizing<String> {
        Zeroizing::new(s.to_string())
    }

    fn workspace(dir: &TempDir) -> Workspace {
        Workspace::new(Some(dir.path())).unwrap()
    }

    fn entry(day: u32, content: &str) -> JournalEntry {
        JournalEntry::new(Utc.with_ymd_and_hms(2024, 3, day, 20, 0, 0).unwrap(), content)
    }

    #[test]
    fn create_writes_an_openable_empty_journal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("diary.zjournal");
        Session::create(workspace(&dir), &path, pw(PASSWORD), &StrengthOptions::default()).unwrap();

        let session = Session::open(workspace(&dir), &path, pw(PASSWORD)).unwrap();
        assert!(session.journal().entries.is_empty());
        assert_eq!(session.journal().version, Some(FORMAT_VERSION));
        assert_eq!(session.generation(), Generation::Archive);
    }

    #[test]
    fn create_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("diary.ejournal");
        fs::write(&path, b"keep me").unwrap();

        let result = Session::create(workspace(&dir), &path, pw(PASSWORD), &StrengthOptions::default());
        assert!(matches!(result, Err(JournalError::JournalExists(_))));
        assert_eq!(fs::read(&path).unwrap(), b"keep me");
    }

    #[test]
    fn create_rejects_weak_password() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("diary.zjournal");
        let result = Session::create(workspace(&dir), &path, pw("short"), &StrengthOptions::default());
        assert!(matches!(result, Err(JournalError::WeakPassword(_))));
        assert!(!path.exists());
    }

    #[test]
    fn entries_survive_save_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("diary.zjournal");
        let mut session =
            Session::create(workspace(&dir), &path, pw(PASSWORD), &StrengthOptions::default()).unwrap();
        session.add_entry(entry(1, "first")).unwrap();
        session.add_entry(entry(2, "second")).unwrap();
        session.save().unwrap();
        drop(session);

        let session = Session::open(workspace(&dir), &path, pw(PASSWORD)).unwrap();
        assert_eq!(session.journal().entries.len(), 2);
    }

    #[test]
    fn save_as_converts_generation() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("diary.ejournal");
        let new = dir.path().join("diary.zjournal");
        let mut session =
            Session::create(workspace(&dir), &old, pw(PASSWORD), &StrengthOptions::default()).unwrap();
        session.add_entry(entry(5, "moved")).unwrap();
        session.save_as(&new).unwrap();
        assert_eq!(session.generation(), Generation::Archive);
        assert_eq!(session.path(), new.as_path());

        let reopened = Session::open(workspace(&dir), &new, pw(PASSWORD)).unwrap();
        assert_eq!(reopened.journal().entries[0].content, "moved");
    }

    #[test]
    fn change_password_reencrypts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("diary.zjournal");
        let mut session =
            Session::create(workspace(&dir), &path, pw(PASSWORD), &StrengthOptions::default()).unwrap();
        session
            .change_password(pw("Another-Secret-7"), &StrengthOptions::default())
            .unwrap();
        drop(session);

        assert!(matches!(
            Session::open(workspace(&dir), &path, pw(PASSWORD)),
            Err(JournalError::WrongPasswordOrCorrupt)
        ));
        Session::open(workspace(&dir), &path, pw("Another-Secret-7")).unwrap();
    }

    #[test]
    fn save_as_with_weak_password_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("diary.ejournal");
        let new = dir.path().join("diary.zjournal");
        let mut session =
            Session::create(workspace(&dir), &old, pw(PASSWORD), &StrengthOptions::default()).unwrap();

        let result = session.save_as_with_password(&new, pw("weak"), &StrengthOptions::default());
        assert!(matches!(result, Err(JournalError::WeakPassword(_))));
        assert!(!new.exists());
        assert_eq!(session.path(), old.as_path());

        session
            .save_as_with_password(&new, pw("Another-Secret-7"), &StrengthOptions::default())
            .unwrap();
        assert_eq!(session.path(), new.as_path());
        Session::open(workspace(&dir), &new, pw("Another-Secret-7")).unwrap();
        Session::open(workspace(&dir), &old, pw(PASSWORD)).unwrap();
    }

    #[test]
    fn weak_new_password_keeps_old_one() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("diary.zjournal");
        let mut session =
            Session::create(workspace(&dir), &path, pw(PASSWORD), &StrengthOptions::default()).unwrap();
        assert!(session
            .change_password(pw("aaa"), &StrengthOptions::default())
            .is_err());
        drop(session);
        Session::open(workspace(&dir), &path, pw(PASSWORD)).unwrap();
    }
}
