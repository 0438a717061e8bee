//! Password-based key derivation.
//!
//! Two schemes coexist on disk and neither is tagged in the file:
//!
//! - **Salted** (every file written by this crate): PBKDF2-HMAC-SHA256
//!   over a random 16-byte salt, 100 000 iterations, 32-byte key.  The IV
//!   is random and stored next to the salt; it is never derived.
//! - **Legacy** (files from the first two releases): OpenSSL's
//!   `EVP_BytesToKey` with MD5, one round, no salt.  Key and IV both come
//!   from the password alone.  Only the decoders call this.
//!
//! Neither function can fail.  An empty password is legal input here;
//! strength is checked before a password is ever used to encrypt.

use md5::{Digest, Md5};
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of the AES-256 key in bytes.
pub const KEY_LEN: usize = 32;

/// Length of the CBC initialization vector in bytes.
pub const IV_LEN: usize = 16;

/// Length of the PBKDF2 salt in bytes.
pub const SALT_LEN: usize = 16;

/// PBKDF2 round count.  Encoder and decoder must agree exactly; a
/// mismatch only ever shows up as "wrong password".
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// A 32-byte AES key that is wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CipherKey([u8; KEY_LEN]);

impl CipherKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CipherKey([REDACTED])")
    }
}

/// Derive the key for the salted scheme.
pub fn derive_salted_key(password: &[u8], salt: &[u8; SALT_LEN]) -> CipherKey {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, &mut key);
    let derived = CipherKey(key);
    key.zeroize();
    derived
}

/// Derive key and IV with `EVP_BytesToKey(MD5, count = 1, no salt)`.
///
/// `D_1 = MD5(password)`, `D_i = MD5(D_{i-1} || password)`, concatenated
/// until 48 bytes exist; the first 32 are the key, the next 16 the IV.
pub fn derive_legacy_key_and_iv(password: &[u8]) -> (CipherKey, [u8; IV_LEN]) {
    let mut material: Vec<u8> = Vec::with_capacity(KEY_LEN + IV_LEN + 16);
    let mut prev: Option<[u8; 16]> = None;

    while material.len() < KEY_LEN + IV_LEN {
        let mut hasher = Md5::new();
        if let Some(digest) = prev {
            hasher.update(digest);
        }
        hasher.update(password);
        let digest: [u8; 16] = hasher.finalize().into();
        material.extend_from_slice(&digest);
        prev = Some(digest);
    }

    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&material[..KEY_LEN]);
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&material[KEY_LEN..KEY_LEN + IV_LEN]);
    material.zeroize();

    let derived = CipherKey(key);
    key.zeroize();
    (derived, iv)
}

/// Generate a random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

/// Generate a random 16-byte IV.
pub fn generate_iv() -> [u8; IV_LEN] {
    let mut iv = [0u8; IV_LEN];
    rand::rng().fill_bytes(&mut iv);
    iv
}
