//! Image attachment references.
//!
//! In memory every attachment is a self-contained `data:image/<type>;base64,`
//! URL.  Inside an archive the image bytes live in `images/` as
//! `<entryIdx>_<attachmentIdx>.<ext>` and `data.json` points at them by
//! relative path.  The archive extension maps back to the exact MIME
//! subtype: bytes outside `[a-z0-9+-]` are written as `%XX`.

use std::path::{Component, Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Deserializer};

/// Directory inside the archive that holds attachment files.
pub const IMAGES_DIR: &str = "images";

/// A decoded `data:image/...;base64,` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// The part after `image/`, e.g. `png`, `jpeg`, `svg+xml`.
    pub subtype: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    /// Parse an inline image reference.  Returns `None` for anything that
    /// is not a well-formed base64 image data URL.
    pub fn parse(reference: &str) -> Option<Self> {
        let rest = reference.strip_prefix("data:image/")?;
        let (subtype, payload) = rest.split_once(";base64,")?;
        if subtype.is_empty()
            || !subtype
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
        {
            return None;
        }
        let bytes = BASE64.decode(payload).ok()?;
        Some(Self {
            subtype: subtype.to_string(),
            bytes,
        })
    }

    /// Build a data URL from an image file extension and its bytes.
    pub fn from_file(extension: &str, bytes: Vec<u8>) -> Self {
        let ext = extension.to_ascii_lowercase();
        let subtype = match ext.as_str() {
            "jpg" => "jpeg".to_string(),
            "svg" => "svg+xml".to_string(),
            _ => ext,
        };
        Self { subtype, bytes }
    }

    /// Rebuild an image staged by [`DataUrl::file_name`] from its archive
    /// extension.  Escaped extensions decode to the exact subtype; plain
    /// ones go through [`DataUrl::from_file`] so archives written by other
    /// tools still load.
    pub fn from_archive_file(extension: &str, bytes: Vec<u8>) -> Self {
        match unescape_subtype(extension) {
            Some(subtype) => Self { subtype, bytes },
            None => Self::from_file(extension, bytes),
        }
    }

    /// File name used for this image inside the archive.
    pub fn file_name(&self, entry_idx: usize, attachment_idx: usize) -> String {
        format!("{entry_idx}_{attachment_idx}.{}", self.archive_extension())
    }

    fn archive_extension(&self) -> String {
        // Plain `jpg` and `svg` read back as `jpeg` and `svg+xml`.
        if matches!(self.subtype.as_str(), "jpg" | "svg") {
            return escape_all(&self.subtype);
        }
        let mut ext = String::with_capacity(self.subtype.len());
        for b in self.subtype.bytes() {
            if is_plain(b) {
                ext.push(b as char);
            } else {
                ext.push_str(&format!("%{b:02x}"));
            }
        }
        ext
    }

    /// Extension for saving the image outside an archive.
    pub fn extension(&self) -> &str {
        match self.subtype.as_str() {
            "jpeg" => "jpg",
            "svg+xml" => "svg",
            other => other,
        }
    }

    pub fn to_url(&self) -> String {
        format!("data:image/{};base64,{}", self.subtype, BASE64.encode(&self.bytes))
    }
}

fn is_plain(b: u8) -> bool {
    b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'+' || b == b'-'
}

fn escape_all(subtype: &str) -> String {
    subtype.bytes().map(|b| format!("%{b:02x}")).collect()
}

/// Decode a `%XX`-escaped archive extension.  `None` when nothing is
/// escaped or the escapes are malformed.
fn unescape_subtype(extension: &str) -> Option<String> {
    if !extension.contains('%') {
        return None;
    }
    let bytes = extension.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let pair = bytes.get(i + 1..i + 3)?;
            out.extend(hex::decode(pair).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Relative reference stored in `data.json` for an externalized image.
pub fn archive_reference(file_name: &str) -> String {
    format!("{IMAGES_DIR}/{file_name}")
}

/// Locate the file a relative reference points at inside `root`.
///
/// Accepts `images/<name>` as well as the historical
/// `./_jbfiles/images/<name>` form.  Only the final file name is trusted;
/// it is always looked up directly under `root/images`.
pub fn resolve_reference(root: &Path, reference: &str) -> Option<PathBuf> {
    if reference.starts_with("data:") {
        return None;
    }
    let path = Path::new(reference);
    if path
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
    {
        return None;
    }
    let name = path.file_name()?;
    let candidate = root.join(IMAGES_DIR).join(name);
    candidate.is_file().then_some(candidate)
}

/// Accept a list, a single string, or `null` for the attachment field.
pub fn deserialize_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<Option<String>>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) if s.is_empty() => Vec::new(),
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(list)) => list.into_iter().flatten().collect(),
    })
}
