//! Container module: whole-file encode/decode across every generation.
//!
//! This module provides:
//! - Extension-based routing to a generation (`generation`)
//! - The hex-text generation codec (`text`)
//! - The encrypted-archive generation codec with ordered fallback (`binary`)
//! - Temp-file + rename writes (`atomic`)
//! - `Workspace`, the locked scratch directory that open/save run in (`workspace`)
//!
//! The free functions here are stateless: everything they touch is passed
//! in, including the scratch directory.  Serializing access to that
//! directory is `Workspace`'s job.

pub mod atomic;
pub mod binary;
pub mod generation;
pub mod text;
pub mod workspace;

use std::path::Path;

use tracing::debug;

use crate::errors::{JournalError, Result};
use crate::journal::JournalContainer;

pub use binary::{Outcome, Source, ATTEMPT_ORDER};
pub use generation::{Generation, ARCHIVE_EXTENSION, TEXT_EXTENSION};
pub use workspace::Workspace;

/// Key-derivation layout found inside a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Unsalted MD5 chain; read-only support.
    Legacy,
    /// PBKDF2-HMAC-SHA256 with stored salt and IV.
    Salted,
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Scheme::Legacy => "legacy (unsalted)",
            Scheme::Salted => "PBKDF2 (salted)",
        })
    }
}

/// A successfully decoded container.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub journal: JournalContainer,
    pub generation: Generation,
    pub scheme: Scheme,
}

/// Encode a journal for the given generation.  Always the salted scheme.
pub fn encode_container(
    journal: &JournalContainer,
    password: &[u8],
    generation: Generation,
    scratch: &Path,
) -> Result<Vec<u8>> {
    match generation {
        Generation::Text => {
            let json = journal.to_json()?;
            let json = String::from_utf8(json)
                .map_err(|e| JournalError::SerializationError(e.to_string()))?;
            Ok(text::encode_text(&json, password).into_bytes())
        }
        Generation::Archive => binary::encode_archive_to(journal, password, scratch, Vec::new()),
    }
}

/// Decode container bytes of a known generation.
pub fn decode_container(
    bytes: &[u8],
    password: &[u8],
    generation: Generation,
    scratch: &Path,
) -> Result<Decoded> {
    match generation {
        Generation::Text => {
            let stored = std::str::from_utf8(bytes)
                .map_err(|_| JournalError::CorruptFile("file is not hex text".into()))?;
            decode_text_container(stored, password)
        }
        Generation::Archive => decode_archive_source(Source::Bytes(bytes), password, scratch),
    }
}

/// Text generation: decrypt, then let JSON parsing be the correctness check.
pub(crate) fn decode_text_container(stored: &str, password: &[u8]) -> Result<Decoded> {
    let (json, scheme) = text::decode_text(stored, password)?;
    let journal = JournalContainer::from_json(json.as_bytes()).map_err(|e| {
        debug!(error = %e, "decrypted text is not a journal");
        JournalError::WrongPasswordOrCorrupt
    })?;
    Ok(Decoded {
        journal,
        generation: Generation::Text,
        scheme,
    })
}

pub(crate) fn decode_archive_source(
    source: Source<'_>,
    password: &[u8],
    scratch: &Path,
) -> Result<Decoded> {
    let (journal, scheme) = binary::decode_archive(source, password, scratch)?;
    Ok(Decoded {
        journal,
        generation: Generation::Archive,
        scheme,
    })
}
