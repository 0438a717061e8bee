//! The encrypted-archive generation (`.zjournal`).
//!
//! Nothing in the file says which cipher layout it uses:
//!
//! ```text
//! legacy: [ ciphertext ........................ ]   key+iv from MD5 chain
//! salted: [ salt: 16 ][ iv: 16 ][ ciphertext .. ]   key from PBKDF2(salt)
//! ```
//!
//! So decoding walks an ordered list of candidates, legacy first, and the
//! first one whose plaintext unpacks as a gzip'd tar wins.  Each attempt
//! reports an [`Outcome`] instead of erroring, so "try the next one" is
//! plain control flow.  Real I/O failures still abort immediately.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::Path;

use tracing::{debug, info};

use super::Scheme;
use crate::archive;
use crate::crypto::{self, DecryptReader, EncryptWriter, IV_LEN, SALT_LEN};
use crate::errors::{JournalError, Result};
use crate::journal::JournalContainer;

/// Order in which archive layouts are attempted.  Legacy goes first: it is
/// what 5.1 wrote, and those files predate the salted layout.
///
/// A salted file whose legacy decryption happens to form a valid gzip'd
/// tar is accepted as legacy.  Nothing in the file can rule that out.
pub const ATTEMPT_ORDER: [Scheme; 2] = [Scheme::Legacy, Scheme::Salted];

/// Length of the `salt || iv` header in the salted layout.
pub const SALTED_HEADER_LEN: usize = SALT_LEN + IV_LEN;

/// Sub-directory of the scratch area used for staging on save.
const STAGE_DIR: &str = "stage";

/// Sub-directory of the scratch area used for extraction on open.
const EXTRACT_DIR: &str = "files";

/// Result of a single decoding attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The candidate produced a structurally valid payload.
    Accepted(T),
    /// The candidate's output was not a valid archive.
    Rejected(String),
}

/// Where encrypted archive bytes come from.  Each attempt re-opens it.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    File(&'a Path),
    Bytes(&'a [u8]),
}

impl<'a> Source<'a> {
    fn open(&self) -> io::Result<Box<dyn Read + 'a>> {
        match *self {
            Source::File(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
            Source::Bytes(bytes) => Ok(Box::new(bytes)),
        }
    }
}

/// Run `attempt` for each scheme in `order` until one is accepted.
///
/// `Err` from an attempt stops the walk.  If every candidate is rejected
/// the caller gets `WrongPasswordOrCorrupt`.
pub fn first_accepted<T, F>(order: &[Scheme], mut attempt: F) -> Result<(Scheme, T)>
where
    F: FnMut(Scheme) -> Result<Outcome<T>>,
{
    for &scheme in order {
        match attempt(scheme)? {
            Outcome::Accepted(value) => {
                info!(?scheme, "archive decoded");
                return Ok((scheme, value));
            }
            Outcome::Rejected(reason) => {
                debug!(?scheme, %reason, "archive candidate rejected");
            }
        }
    }
    Err(JournalError::WrongPasswordOrCorrupt)
}

/// Decrypt `source` under one scheme and unpack it into `dest`.
///
/// On rejection `dest` is removed so a later candidate starts clean.
pub fn attempt_unpack(source: Source<'_>, password: &[u8], scheme: Scheme, dest: &Path) -> Result<Outcome<()>> {
    let mut input = source.open()?;

    let result = match scheme {
        Scheme::Legacy => {
            let (key, iv) = crypto::derive_legacy_key_and_iv(password);
            archive::unpack_from(DecryptReader::new(input, &key, &iv), dest)
        }
        Scheme::Salted => {
            let mut header = [0u8; SALTED_HEADER_LEN];
            match input.read_exact(&mut header) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    return Ok(Outcome::Rejected(
                        "file too small for a salted header".into(),
                    ));
                }
                Err(e) => return Err(e.into()),
            }
            let (salt, iv) = split_header(&header);
            let key = crypto::derive_salted_key(password, &salt);
            archive::unpack_from(DecryptReader::new(input, &key, &iv), dest)
        }
    };

    match result {
        Ok(()) => Ok(Outcome::Accepted(())),
        Err(JournalError::CorruptArchive(reason)) => {
            archive::discard(dest)?;
            Ok(Outcome::Rejected(reason))
        }
        Err(other) => {
            archive::discard(dest)?;
            Err(other)
        }
    }
}

fn split_header(header: &[u8; SALTED_HEADER_LEN]) -> ([u8; SALT_LEN], [u8; IV_LEN]) {
    let mut salt = [0u8; SALT_LEN];
    let mut iv = [0u8; IV_LEN];
    salt.copy_from_slice(&header[..SALT_LEN]);
    iv.copy_from_slice(&header[SALT_LEN..]);
    (salt, iv)
}

/// Decode an archive-generation container, using `scratch` for extraction.
///
/// The extraction directory is removed again before returning.
pub fn decode_archive(
    source: Source<'_>,
    password: &[u8],
    scratch: &Path,
) -> Result<(JournalContainer, Scheme)> {
    let dest = scratch.join(EXTRACT_DIR);
    let decoded = first_accepted(&ATTEMPT_ORDER, |scheme| {
        attempt_unpack(source, password, scheme, &dest)
    })
    .and_then(|(scheme, ())| archive::load(&dest).map(|journal| (journal, scheme)));
    archive::discard(&dest)?;
    decoded
}

/// Encode `journal` as `salt || iv || AES-CBC(gzip(tar(tree)))` into `writer`.
///
/// Always uses the salted scheme with fresh randomness.  The staged tree
/// under `scratch` is removed before returning.
pub fn encode_archive_to<W: Write>(
    journal: &JournalContainer,
    password: &[u8],
    scratch: &Path,
    mut writer: W,
) -> Result<W> {
    let tree = scratch.join(STAGE_DIR);
    let encoded = (|| -> Result<W> {
        let images = archive::stage(journal, &tree)?;

        let salt = crypto::generate_salt();
        let iv = crypto::generate_iv();
        let key = crypto::derive_salted_key(password, &salt);
        writer.write_all(&salt)?;
        writer.write_all(&iv)?;

        let encrypting = archive::pack_to(&tree, EncryptWriter::new(writer, &key, &iv))?;
        let writer = encrypting.finish()?;
        debug!(entries = journal.entries.len(), images, "encoded archive container");
        Ok(writer)
    })();
    archive::discard(&tree)?;
    encoded
}
