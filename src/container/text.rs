//! The hex-text generation (`.ejournal`).
//!
//! Two layouts, told apart by counting `:` separators:
//!
//! ```text
//! legacy: <ciphertext hex>                      key+iv from MD5 chain
//! salted: <salt hex>:<iv hex>:<ciphertext hex>  key from PBKDF2(salt)
//! ```

use tracing::debug;

use super::Scheme;
use crate::crypto::{self, CipherError, IV_LEN, SALT_LEN};
use crate::errors::{JournalError, Result};

/// Encrypt `plaintext` with the salted scheme: `saltHex:ivHex:ciphertextHex`.
pub fn encode_text(plaintext: &str, password: &[u8]) -> String {
    let salt = crypto::generate_salt();
    let iv = crypto::generate_iv();
    let key = crypto::derive_salted_key(password, &salt);
    let ciphertext = crypto::encrypt(&key, &iv, plaintext.as_bytes());
    format!(
        "{}:{}:{}",
        hex::encode(salt),
        hex::encode(iv),
        hex::encode(ciphertext)
    )
}

/// Work out which layout `stored` uses without decrypting anything.
pub fn detect_scheme(stored: &str) -> Result<Scheme> {
    match stored.trim_end().split(':').count() {
        1 => Ok(Scheme::Legacy),
        3 => Ok(Scheme::Salted),
        n => Err(JournalError::CorruptFile(format!(
            "expected 1 or 3 ':'-separated segments, found {n}"
        ))),
    }
}

/// Decrypt a stored hex string back to the original text.
///
/// Returns the text and the layout it was found in.
pub fn decode_text(stored: &str, password: &[u8]) -> Result<(String, Scheme)> {
    let stored = stored.trim_end();
    let scheme = detect_scheme(stored)?;
    debug!(?scheme, len = stored.len(), "decoding text container");

    let result = match scheme {
        Scheme::Legacy => {
            let ciphertext = decode_hex(stored, "ciphertext")?;
            let (key, iv) = crypto::derive_legacy_key_and_iv(password);
            crypto::decrypt(&key, &iv, &ciphertext)
        }
        Scheme::Salted => {
            let mut parts = stored.split(':');
            let (Some(salt_hex), Some(iv_hex), Some(ct_hex)) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(JournalError::CorruptFile("missing segment".into()));
            };
            let salt: [u8; SALT_LEN] = fixed(decode_hex(salt_hex, "salt")?, "salt")?;
            let iv: [u8; IV_LEN] = fixed(decode_hex(iv_hex, "iv")?, "iv")?;
            let ciphertext = decode_hex(ct_hex, "ciphertext")?;
            let key = crypto::derive_salted_key(password, &salt);
            crypto::decrypt(&key, &iv, &ciphertext)
        }
    };

    let plaintext = result.map_err(|e: CipherError| {
        debug!(?scheme, error = %e, "text decryption rejected");
        JournalError::WrongPasswordOrCorrupt
    })?;
    let text = String::from_utf8(plaintext).map_err(|_| JournalError::WrongPasswordOrCorrupt)?;
    Ok((text, scheme))
}

fn decode_hex(segment: &str, what: &str) -> Result<Vec<u8>> {
    hex::decode(segment).map_err(|e| JournalError::CorruptFile(format!("{what} is not hex: {e}")))
}

fn fixed<const N: usize>(bytes: Vec<u8>, what: &str) -> Result<[u8; N]> {
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        JournalError::CorruptFile(format!("{what} must be {N} bytes, found {len}"))
    })
}
