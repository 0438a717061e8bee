//! A per-session scratch directory plus the lock that serializes every
//! open and save running in it.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tempfile::TempDir;
use tracing::{debug, info};

use super::{atomic, binary, text, Decoded, Generation, Source};
use crate::errors::{JournalError, Result};
use crate::journal::JournalContainer;

/// Prefix of the scratch directory created under the chosen parent.
const SCRATCH_PREFIX: &str = "_jb";

/// Owns a fresh scratch directory for the lifetime of a session.
///
/// The directory is created empty and removed again on drop, so nothing
/// from a previous run can leak into this one.
#[derive(Debug)]
pub struct Workspace {
    scratch: Mutex<TempDir>,
}

impl Workspace {
    /// Create a scratch directory under `parent`, or the OS temp dir.
    pub fn new(parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let dir = match parent {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        debug!(scratch = %dir.path().display(), "created workspace");
        Ok(Self {
            scratch: Mutex::new(dir),
        })
    }

    /// Exclusive access to the scratch directory.  A panic in an earlier
    /// operation does not poison it: every operation resets what it uses.
    fn lock(&self) -> MutexGuard<'_, TempDir> {
        self.scratch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a journal file, routing on its extension before reading it.
    pub fn open(&self, path: &Path, password: &[u8]) -> Result<Decoded> {
        let generation = Generation::from_path(path)?;
        let scratch = self.lock();
        info!(path = %path.display(), %generation, "opening journal");

        match generation {
            Generation::Text => {
                let stored = fs::read_to_string(path).map_err(|e| match e.kind() {
                    std::io::ErrorKind::InvalidData => {
                        JournalError::CorruptFile("file is not hex text".into())
                    }
                    _ => JournalError::Io(e),
                })?;
                super::decode_text_container(&stored, password)
            }
            Generation::Archive => {
                super::decode_archive_source(Source::File(path), password, scratch.path())
            }
        }
    }

    /// Encrypt `journal` into `path` using the generation its extension
    /// names.  The previous file survives any failure.
    pub fn save(&self, path: &Path, journal: &JournalContainer, password: &[u8]) -> Result<()> {
        let generation = Generation::from_path(path)?;
        let scratch = self.lock();
        info!(path = %path.display(), %generation, entries = journal.entries.len(), "saving journal");

        atomic::write_atomic(path, |writer| match generation {
            Generation::Text => {
                let json = journal.to_json()?;
                let json = String::from_utf8(json)
                    .map_err(|e| JournalError::SerializationError(e.to_string()))?;
                std::io::Write::write_all(writer, text::encode_text(&json, password).as_bytes())?;
                Ok(())
            }
            Generation::Archive => {
                binary::encode_archive_to(journal, password, scratch.path(), writer)?;
                Ok(())
            }
        })
    }

    /// In-memory encode, under the same lock as file saves.
    pub fn encode(
        &self,
        journal: &JournalContainer,
        password: &[u8],
        generation: Generation,
    ) -> Result<Vec<u8>> {
        let scratch = self.lock();
        super::encode_container(journal, password, generation, scratch.path())
    }

    /// In-memory decode, under the same lock as file opens.
    pub fn decode(&self, bytes: &[u8], password: &[u8], generation: Generation) -> Result<Decoded> {
        let scratch = self.lock();
        super::decode_container(bytes, password, generation, scratch.path())
    }
}
