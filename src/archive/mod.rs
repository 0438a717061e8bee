//! Archive module: gzip-compressed tar of a journal directory tree.
//!
//! This module provides:
//! - `pack` / `pack_to`: tar + gzip a directory, entries relative to its root
//! - `unpack` / `unpack_from`: the reverse, into a freshly wiped destination
//! - The `data.json` + `images/` tree layout (`tree`)
//!
//! Entries are added in sorted order with deterministic headers, so
//! packing the same tree twice yields the same bytes.

pub mod tree;

use std::fs;
use std::io::{self, Cursor, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::debug;

use crate::crypto::CipherError;
use crate::errors::{JournalError, Result};

pub use tree::{load, stage, LEGACY_MANIFEST_FILE, MANIFEST_FILE};

/// The two bytes every gzip stream starts with.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Pack `dir` into a gzip-compressed tar and return the bytes.
pub fn pack(dir: &Path) -> Result<Vec<u8>> {
    pack_to(dir, Vec::new())
}

/// Pack `dir` into `writer`, returning the writer once the gzip trailer
/// has been written.
pub fn pack_to<W: Write>(dir: &Path, writer: W) -> Result<W> {
    if !dir.is_dir() {
        return Err(JournalError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", dir.display()),
        )));
    }

    let encoder = GzEncoder::new(writer, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.mode(tar::HeaderMode::Deterministic);

    let count = append_tree(&mut builder, dir, Path::new(""))?;
    debug!(dir = %dir.display(), entries = count, "packed archive");

    let encoder = builder.into_inner()?;
    Ok(encoder.finish()?)
}

fn append_tree<W: Write>(builder: &mut tar::Builder<W>, dir: &Path, prefix: &Path) -> Result<usize> {
    let mut children: Vec<_> = fs::read_dir(dir)?.collect::<io::Result<_>>()?;
    children.sort_by_key(|c| c.file_name());

    let mut count = 0;
    for child in children {
        let path = child.path();
        let name = prefix.join(child.file_name());
        let file_type = child.file_type()?;

        if file_type.is_dir() {
            builder.append_dir(&name, &path)?;
            count += 1 + append_tree(builder, &path, &name)?;
        } else if file_type.is_file() {
            builder.append_path_with_name(&path, &name)?;
            count += 1;
        } else {
            debug!(path = %path.display(), "skipping non-regular file");
        }
    }
    Ok(count)
}

/// Unpack archive bytes into `dest`.  See [`unpack_from`].
pub fn unpack(archive: &[u8], dest: &Path) -> Result<()> {
    unpack_from(archive, dest)
}

/// Unpack a gzip-compressed tar stream into `dest`.
///
/// `dest` is removed and recreated first so nothing from an earlier
/// extraction survives.  Bad magic bytes, a damaged deflate stream or a
/// malformed tar header are reported as `CorruptArchive`; filesystem
/// failures while writing members stay `Io`.
pub fn unpack_from<R: Read>(mut reader: R, dest: &Path) -> Result<()> {
    reset_dir(dest)?;

    let mut magic = [0u8; 2];
    if let Err(e) = reader.read_exact(&mut magic) {
        return Err(classify(e));
    }
    if magic != GZIP_MAGIC {
        return Err(JournalError::CorruptArchive(
            "missing gzip magic bytes".into(),
        ));
    }

    let stream = Cursor::new(magic).chain(reader);
    let mut archive = tar::Archive::new(GzDecoder::new(stream));
    archive.set_preserve_permissions(false);
    archive.set_overwrite(true);
    archive.unpack(dest).map_err(classify)?;

    debug!(dest = %dest.display(), "unpacked archive");
    Ok(())
}

/// Remove `dir` (if present) and create it empty.
pub fn reset_dir(dir: &Path) -> Result<()> {
    discard(dir)?;
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Remove `dir` and everything in it; a missing directory is fine.
pub fn discard(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Sort an unpack failure into "the bytes are not an archive" versus
/// "the disk let us down".
fn classify(err: io::Error) -> JournalError {
    if CipherError::from_io(&err).is_some() {
        return JournalError::CorruptArchive(err.to_string());
    }
    match err.kind() {
        io::ErrorKind::InvalidData
        | io::ErrorKind::InvalidInput
        | io::ErrorKind::UnexpectedEof
        | io::ErrorKind::Other => JournalError::CorruptArchive(err.to_string()),
        _ => JournalError::Io(err),
    }
}
