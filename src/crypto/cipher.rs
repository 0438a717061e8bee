//! AES-256-CBC with PKCS#7 padding.
//!
//! Offered two ways:
//! - whole-buffer [`encrypt`] / [`decrypt`] for the hex text format, and
//! - streaming [`EncryptWriter`] / [`DecryptReader`] adapters for archives,
//!   so an image-heavy journal never has to sit in memory as one plaintext
//!   buffer.  Backpressure is whatever the wrapped reader/writer imposes.
//!
//! CBC is unauthenticated.  A wrong key usually trips the padding check
//! ([`CipherError::BadPadding`]) but can also "succeed" and hand back
//! garbage; callers must validate the plaintext's structure themselves.

use std::io::{self, Read, Write};

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use thiserror::Error;

use super::kdf::{CipherKey, IV_LEN};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES block size in bytes.
pub const BLOCK_LEN: usize = 16;

/// How much ciphertext `DecryptReader` pulls from its source per refill.
const CHUNK_LEN: usize = 64 * 1024;

/// Low-level cipher failures.  These are *not* "wrong password" errors;
/// only the container layer may conclude that.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CipherError {
    #[error("ciphertext is not a whole number of AES blocks")]
    Truncated,

    #[error("invalid PKCS#7 padding")]
    BadPadding,
}

impl CipherError {
    /// Recover a `CipherError` that travelled through an `io::Error`.
    pub fn from_io(err: &io::Error) -> Option<Self> {
        err.get_ref()
            .and_then(|inner| inner.downcast_ref::<CipherError>())
            .copied()
    }
}

impl From<CipherError> for io::Error {
    fn from(err: CipherError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}

fn new_encryptor(key: &CipherKey, iv: &[u8; IV_LEN]) -> Aes256CbcEnc {
    Aes256CbcEnc::new(
        GenericArray::from_slice(key.as_bytes()),
        GenericArray::from_slice(iv),
    )
}

fn new_decryptor(key: &CipherKey, iv: &[u8; IV_LEN]) -> Aes256CbcDec {
    Aes256CbcDec::new(
        GenericArray::from_slice(key.as_bytes()),
        GenericArray::from_slice(iv),
    )
}

/// Encrypt a whole buffer.  Output is always 1..=16 bytes longer than the input.
pub fn encrypt(key: &CipherKey, iv: &[u8; IV_LEN], plaintext: &[u8]) -> Vec<u8> {
    new_encryptor(key, iv).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypt a whole buffer and strip its padding.
pub fn decrypt(
    key: &CipherKey,
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
) -> std::result::Result<Vec<u8>, CipherError> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CipherError::Truncated);
    }
    new_decryptor(key, iv)
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::BadPadding)
}

// ---------------------------------------------------------------------------
// Streaming
// ---------------------------------------------------------------------------

/// A `Write` adapter that encrypts everything written through it.
///
/// Full blocks are forwarded as soon as they are available.  The padded
/// final block is only emitted by [`EncryptWriter::finish`]; dropping the
/// writer without calling it leaves truncated ciphertext behind.
pub struct EncryptWriter<W: Write> {
    inner: W,
    cipher: Aes256CbcEnc,
    pending: Vec<u8>,
}

impl<W: Write> EncryptWriter<W> {
    pub fn new(inner: W, key: &CipherKey, iv: &[u8; IV_LEN]) -> Self {
        Self {
            inner,
            cipher: new_encryptor(key, iv),
            pending: Vec::with_capacity(BLOCK_LEN * 2),
        }
    }

    /// Pad and write the last block, flush, and hand back the inner writer.
    pub fn finish(self) -> io::Result<W> {
        let Self {
            mut inner,
            cipher,
            pending,
        } = self;
        let tail = cipher.encrypt_padded_vec_mut::<Pkcs7>(&pending);
        inner.write_all(&tail)?;
        inner.flush()?;
        Ok(inner)
    }
}

impl<W: Write> Write for EncryptWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);

        let whole = self.pending.len() - self.pending.len() % BLOCK_LEN;
        if whole > 0 {
            for block in self.pending[..whole].chunks_exact_mut(BLOCK_LEN) {
                self.cipher
                    .encrypt_block_mut(GenericArray::from_mut_slice(block));
            }
            self.inner.write_all(&self.pending[..whole])?;
            self.pending.drain(..whole);
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// A `Read` adapter that decrypts its source on the fly.
///
/// The last ciphertext block is held back until the source hits EOF so
/// its padding can be checked.  Cipher failures surface as
/// `io::ErrorKind::InvalidData` carrying a [`CipherError`].
pub struct DecryptReader<R: Read> {
    inner: R,
    cipher: Option<Aes256CbcDec>,
    held: Vec<u8>,
    out: Vec<u8>,
    out_pos: usize,
}

impl<R: Read> DecryptReader<R> {
    pub fn new(inner: R, key: &CipherKey, iv: &[u8; IV_LEN]) -> Self {
        Self {
            inner,
            cipher: Some(new_decryptor(key, iv)),
            held: Vec::with_capacity(CHUNK_LEN + BLOCK_LEN),
            out: Vec::new(),
            out_pos: 0,
        }
    }

    /// Pull one chunk from the source and decrypt as much as is safe.
    fn refill(&mut self) -> io::Result<()> {
        if self.cipher.is_none() {
            return Ok(());
        }

        let start = self.held.len();
        self.held.resize(start + CHUNK_LEN, 0);
        let n = loop {
            match self.inner.read(&mut self.held[start..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.held.truncate(start);
                    return Err(e);
                }
            }
        };
        self.held.truncate(start + n);

        if n == 0 {
            // Source exhausted: what is held must be the padded final block(s).
            if self.held.is_empty() || self.held.len() % BLOCK_LEN != 0 {
                self.cipher = None;
                return Err(CipherError::Truncated.into());
            }
            let Some(cipher) = self.cipher.take() else {
                return Ok(());
            };
            self.out = cipher
                .decrypt_padded_vec_mut::<Pkcs7>(&self.held)
                .map_err(|_| io::Error::from(CipherError::BadPadding))?;
            self.out_pos = 0;
            self.held.clear();
            return Ok(());
        }

        // Keep the trailing partial block, or the last whole block if the
        // buffer is aligned, because it might be the padded one.
        let keep = match self.held.len() % BLOCK_LEN {
            0 => BLOCK_LEN,
            partial => partial,
        };
        let ready = self.held.len().saturating_sub(keep);
        let Some(cipher) = self.cipher.as_mut() else {
            return Ok(());
        };
        for block in self.held[..ready].chunks_exact_mut(BLOCK_LEN) {
            cipher.decrypt_block_mut(GenericArray::from_mut_slice(block));
        }
        self.out.clear();
        self.out.extend(self.held.drain(..ready));
        self.out_pos = 0;
        Ok(())
    }
}

impl<R: Read> Read for DecryptReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.out_pos < self.out.len() {
                let n = buf.len().min(self.out.len() - self.out_pos);
                buf[..n].copy_from_slice(&self.out[self.out_pos..self.out_pos + n]);
                self.out_pos += n;
                return Ok(n);
            }
            if self.cipher.is_none() || buf.is_empty() {
                return Ok(0);
            }
            self.refill()?;
        }
    }
}

/// Encrypt everything from `input` into `output`; returns `output`.
pub fn encrypt_stream<R: Read, W: Write>(
    mut input: R,
    output: W,
    key: &CipherKey,
    iv: &[u8; IV_LEN],
) -> io::Result<W> {
    let mut writer = EncryptWriter::new(output, key, iv);
    io::copy(&mut input, &mut writer)?;
    writer.finish()
}

/// Decrypt everything from `input` into `output`; returns plaintext length.
pub fn decrypt_stream<R: Read, W: Write>(
    input: R,
    mut output: W,
    key: &CipherKey,
    iv: &[u8; IV_LEN],
) -> io::Result<u64> {
    let mut reader = DecryptReader::new(input, key, iv);
    let n = io::copy(&mut reader, &mut output)?;
    output.flush()?;
    Ok(n)
}
