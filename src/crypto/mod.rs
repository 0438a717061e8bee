//! Cryptographic primitives for JournalBear.
//!
//! This module provides:
//! - PBKDF2 and legacy MD5 key derivation (`kdf`)
//! - AES-256-CBC buffer and streaming codecs (`cipher`)
//! - Password strength rules for new passwords (`strength`)

pub mod cipher;
pub mod kdf;
pub mod strength;

pub use cipher::{decrypt, encrypt, CipherError, DecryptReader, EncryptWriter};
pub use kdf::{
    derive_legacy_key_and_iv, derive_salted_key, generate_iv, generate_salt, CipherKey, IV_LEN,
    KEY_LEN, SALT_LEN,
};
pub use strength::{check as check_password_strength, StrengthOptions};
