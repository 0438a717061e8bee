//! Integration tests for whole-file encode/decode across generations.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};
use journalbear::archive;
use journalbear::container::binary::{first_accepted, Outcome};
use journalbear::container::text::{decode_text, encode_text};
use journalbear::container::{
    decode_container, encode_container, Generation, Scheme, Workspace, ATTEMPT_ORDER,
};
use journalbear::crypto::{self, SALT_LEN};
use journalbear::errors::JournalError;
use journalbear::journal::{DataUrl, JournalContainer, JournalEntry, Sentiment};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn journal_with_images() -> JournalContainer {
    let mut journal = JournalContainer::new();

    let mut first = JournalEntry::new(
        Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap(),
        "# New year\nTwo photos today.",
    );
    first.sentiment = Some(Sentiment::Excited);
    first.attachment = vec![
        DataUrl::from_file("png", vec![0x89, b'P', b'N', b'G', 1, 2, 3]).to_url(),
        DataUrl::from_file("jpg", vec![0xff, 0xd8, 0xff, 9, 9]).to_url(),
    ];
    journal.add_entry(first).unwrap();

    let mut second = JournalEntry::new(
        Utc.with_ymd_and_hms(2023, 1, 2, 22, 15, 0).unwrap(),
        "quiet day",
    );
    second.nsfw = true;
    journal.add_entry(second).unwrap();

    journal
}

/// Map of relative path -> contents for every file under `root`.
fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<String, Vec<u8>>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let rel = path.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/");
                out.insert(rel, fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

fn legacy_encrypt(plaintext: &[u8], password: &str) -> Vec<u8> {
    let (key, iv) = crypto::derive_legacy_key_and_iv(password.as_bytes());
    crypto::encrypt(&key, &iv, plaintext)
}

fn salted_split(file: &[u8], password: &str) -> Vec<u8> {
    let salt: [u8; 16] = file[..SALT_LEN].try_into().unwrap();
    let iv: [u8; 16] = file[SALT_LEN..SALT_LEN + 16].try_into().unwrap();
    let key = crypto::derive_salted_key(password.as_bytes(), &salt);
    crypto::decrypt(&key, &iv, &file[32..]).unwrap()
}

// ---------------------------------------------------------------------------
// Round-trip and wrong-password safety
// ---------------------------------------------------------------------------

#[test]
fn roundtrip_both_generations_with_various_passwords() {
    let scratch = TempDir::new().unwrap();
    let long = "x".repeat(200);
    for password in ["", "pässwörd 🐻", long.as_str()] {
        for generation in [Generation::Text, Generation::Archive] {
            let bytes = encode_container(
                &journal_with_images(),
                password.as_bytes(),
                generation,
                scratch.path(),
            )
            .unwrap();
            let decoded =
                decode_container(&bytes, password.as_bytes(), generation, scratch.path()).unwrap();
            assert_eq!(decoded.journal, journal_with_images(), "{generation} / {password:?}");
        }
    }
}

#[test]
fn archive_roundtrip_keeps_unusual_image_subtypes() {
    let scratch = TempDir::new().unwrap();
    let mut journal = JournalContainer::new();
    let mut entry = JournalEntry::new(Utc.with_ymd_and_hms(2022, 6, 1, 9, 0, 0).unwrap(), "icons");
    entry.attachment = vec![
        "data:image/vnd.microsoft.icon;base64,AAAB".to_string(),
        "data:image/PNG;base64,iVBORw0KGgo=".to_string(),
        "data:image/x-icon;base64,AAAB".to_string(),
        "data:image/jpg;base64,/9j/".to_string(),
    ];
    journal.add_entry(entry).unwrap();

    let bytes = encode_container(&journal, b"pw", Generation::Archive, scratch.path()).unwrap();
    let decoded = decode_container(&bytes, b"pw", Generation::Archive, scratch.path()).unwrap();
    assert_eq!(decoded.journal, journal);
}

#[test]
fn wrong_password_is_always_the_same_error() {
    let scratch = TempDir::new().unwrap();
    for generation in [Generation::Text, Generation::Archive] {
        let bytes = encode_container(&journal_with_images(), b"right", generation, scratch.path())
            .unwrap();
        for wrong in ["", "Right", "right ", "wrong"] {
            let result = decode_container(&bytes, wrong.as_bytes(), generation, scratch.path());
            assert!(
                matches!(result, Err(JournalError::WrongPasswordOrCorrupt)),
                "{generation} with {wrong:?}: {result:?}"
            );
            assert_eq!(
                result.unwrap_err().to_string(),
                "Wrong password. Try again."
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[test]
fn legacy_text_fixture_opens_without_naming_the_scheme() {
    let (text, scheme) = decode_text("e524edb5030515ce48c9b2857adfa9c9", b"test1234").unwrap();
    assert_eq!(text, "hello world");
    assert_eq!(scheme, Scheme::Legacy);
}

#[test]
fn salted_text_fixture_is_byte_identical() {
    let stored = encode_text(r#"{"en":[]}"#, b"Tr0ub4dor&3");
    assert_eq!(stored.split(':').count(), 3);
    let (text, scheme) = decode_text(&stored, b"Tr0ub4dor&3").unwrap();
    assert_eq!(text.as_bytes(), br#"{"en":[]}"#);
    assert_eq!(scheme, Scheme::Salted);
}

#[test]
fn oldest_journal_json_without_version_opens() {
    let stored = encode_text(
        r#"{"en":[{"entryDate":"2019-05-04","content":"old","Attachment":null}]}"#,
        b"pw",
    );
    let scratch = TempDir::new().unwrap();
    let decoded =
        decode_container(stored.as_bytes(), b"pw", Generation::Text, scratch.path()).unwrap();
    assert_eq!(decoded.journal.version, None);
    assert_eq!(decoded.journal.entries[0].content, "old");
    assert_eq!(decoded.journal.entries[0].sentiment, None);
    assert!(decoded.journal.entries[0].attachment.is_empty());
}

// ---------------------------------------------------------------------------
// Archive layout
// ---------------------------------------------------------------------------

#[test]
fn archive_fidelity_for_manifest_and_images() {
    let src = TempDir::new().unwrap();
    fs::write(src.path().join("data.json"), br#"{"version":6.0,"en":[]}"#).unwrap();
    fs::create_dir(src.path().join("images")).unwrap();
    fs::write(src.path().join("images/0_0.png"), [1u8, 2, 3, 4]).unwrap();
    fs::write(src.path().join("images/0_1.jpeg"), vec![7u8; 70_000]).unwrap();

    let packed = archive::pack(src.path()).unwrap();
    assert_eq!(packed[..2], archive::GZIP_MAGIC);

    let dest = TempDir::new().unwrap();
    archive::unpack(&packed, dest.path()).unwrap();
    assert_eq!(snapshot(dest.path()), snapshot(src.path()));
}

#[test]
fn unpack_twice_leaves_no_stale_files() {
    let first = TempDir::new().unwrap();
    fs::write(first.path().join("data.json"), b"{}").unwrap();
    fs::create_dir(first.path().join("images")).unwrap();
    fs::write(first.path().join("images/0_0.png"), b"old").unwrap();

    let second = TempDir::new().unwrap();
    fs::write(second.path().join("data.json"), b"{\"en\":[]}").unwrap();

    let dest = TempDir::new().unwrap();
    archive::unpack(&archive::pack(first.path()).unwrap(), dest.path()).unwrap();
    archive::unpack(&archive::pack(second.path()).unwrap(), dest.path()).unwrap();

    assert_eq!(snapshot(dest.path()), snapshot(second.path()));
    assert!(!dest.path().join("images/0_0.png").exists());
}

#[test]
fn saved_archive_externalizes_images() {
    let scratch = TempDir::new().unwrap();
    let bytes = encode_container(
        &journal_with_images(),
        b"pw",
        Generation::Archive,
        scratch.path(),
    )
    .unwrap();

    let tree = TempDir::new().unwrap();
    archive::unpack(&salted_split(&bytes, "pw"), tree.path()).unwrap();
    let files = snapshot(tree.path());

    assert!(files.contains_key("data.json"));
    assert_eq!(files["images/0_0.png"], vec![0x89, b'P', b'N', b'G', 1, 2, 3]);
    assert_eq!(files["images/0_1.jpeg"], vec![0xff, 0xd8, 0xff, 9, 9]);

    let manifest = String::from_utf8(files["data.json"].clone()).unwrap();
    assert!(manifest.contains("\"images/0_0.png\""));
    assert!(!manifest.contains("data:image"));
}

#[test]
fn archive_with_nested_legacy_manifest_opens() {
    // Older releases archived the staging folder by name and used journal.json.
    let tree = TempDir::new().unwrap();
    let inner = tree.path().join("_jbfiles");
    fs::create_dir_all(inner.join("images")).unwrap();
    fs::write(inner.join("images/0_0.gif"), b"GIF89a").unwrap();
    fs::write(
        inner.join("journal.json"),
        br#"{"version":5.1,"en":[{"entryDate":"2020-02-02T12:00:00.000Z","content":"hi","sentiment":"Sad","attachment":["./_jbfiles/images/0_0.gif"],"nsfw":false}]}"#,
    )
    .unwrap();
    let file = legacy_encrypt(&archive::pack(tree.path()).unwrap(), "pw");

    let scratch = TempDir::new().unwrap();
    let decoded = decode_container(&file, b"pw", Generation::Archive, scratch.path()).unwrap();
    assert_eq!(decoded.scheme, Scheme::Legacy);
    let entry = &decoded.journal.entries[0];
    assert_eq!(entry.sentiment, Some(Sentiment::Sad));
    assert_eq!(entry.attachment, vec!["data:image/gif;base64,R0lGODlh".to_string()]);
}

// ---------------------------------------------------------------------------
// Fallback ordering
// ---------------------------------------------------------------------------

#[test]
fn legacy_archive_opens_and_reports_legacy() {
    let tree = TempDir::new().unwrap();
    archive::stage(&journal_with_images(), tree.path()).unwrap();
    let file = legacy_encrypt(&archive::pack(tree.path()).unwrap(), "test1234");

    let scratch = TempDir::new().unwrap();
    let decoded = decode_container(&file, b"test1234", Generation::Archive, scratch.path()).unwrap();
    assert_eq!(decoded.scheme, Scheme::Legacy);
    assert_eq!(decoded.journal, journal_with_images());
}

#[test]
fn salted_archive_opens_after_legacy_is_rejected() {
    let scratch = TempDir::new().unwrap();
    let file = encode_container(&journal_with_images(), b"pw", Generation::Archive, scratch.path())
        .unwrap();
    let decoded = decode_container(&file, b"pw", Generation::Archive, scratch.path()).unwrap();
    assert_eq!(decoded.scheme, Scheme::Salted);
}

#[test]
fn when_both_candidates_look_valid_legacy_wins() {
    // A wrong-key legacy decryption that happens to look like gzip would
    // be accepted before the salted layout is ever tried.
    assert_eq!(ATTEMPT_ORDER, [Scheme::Legacy, Scheme::Salted]);

    let mut tried = Vec::new();
    let (winner, payload) = first_accepted(&ATTEMPT_ORDER, |scheme| {
        tried.push(scheme);
        Ok(Outcome::Accepted(format!("{scheme:?} payload")))
    })
    .unwrap();
    assert_eq!(winner, Scheme::Legacy);
    assert_eq!(payload, "Legacy payload");
    assert_eq!(tried, vec![Scheme::Legacy]);
}

#[test]
fn garbage_archive_is_wrong_password_not_corrupt() {
    let scratch = TempDir::new().unwrap();
    for garbage in [vec![], vec![0u8; 7], vec![0xAB; 48], vec![0x1f; 4096]] {
        let result = decode_container(&garbage, b"pw", Generation::Archive, scratch.path());
        assert!(
            matches!(result, Err(JournalError::WrongPasswordOrCorrupt)),
            "{} bytes: {result:?}",
            garbage.len()
        );
    }
}

// ---------------------------------------------------------------------------
// Routing and atomic saves
// ---------------------------------------------------------------------------

#[test]
fn unsupported_extension_is_rejected_before_decryption() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("diary.journal");
    fs::write(&path, b"anything").unwrap();

    let workspace = Workspace::new(Some(dir.path())).unwrap();
    assert!(matches!(
        workspace.open(&path, b"pw"),
        Err(JournalError::UnsupportedFormat(_))
    ));
}

#[test]
fn failed_save_leaves_previous_file_intact() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("diary.zjournal");
    let workspace = Workspace::new(Some(dir.path())).unwrap();
    workspace.save(&path, &journal_with_images(), b"pw").unwrap();
    let before = fs::read(&path).unwrap();

    // A read-only destination directory makes the temp file impossible.
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    let target = locked.join("diary.zjournal");
    fs::copy(&path, &target).unwrap();
    let mut perms = fs::metadata(&locked).unwrap().permissions();
    perms.set_readonly(true);
    fs::set_permissions(&locked, perms.clone()).unwrap();

    let result = workspace.save(&target, &JournalContainer::new(), b"pw");
    perms.set_readonly(false);
    fs::set_permissions(&locked, perms).unwrap();

    // Root may ignore directory permissions; only check the outcome when it applied.
    if result.is_err() {
        assert_eq!(fs::read(&target).unwrap(), before);
    }
    assert_eq!(fs::read(&path).unwrap(), before);
}
