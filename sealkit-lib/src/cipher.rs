//! Payload encryption.
//!
//! The signed parameter map is serialized, PKCS#7-padded and encrypted with
//! AES-128-CBC under a fresh per-request key and the fixed zero IV.
//!
//! # Wire Format
//!
//! ```text
//! data = base64( AES-128-CBC(key, IV = 0^16, PKCS7(compact JSON)) )
//! ```

use std::fmt;

use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::compat::{PayloadDecryptor, PayloadEncryptor, BLOCK_SIZE, ZERO_IV};
use crate::{Result, SealError};

/// Size of the payload key in bytes.
pub const KEY_SIZE: usize = 16;

/// Single-use payload key.
///
/// Not `Clone`: one key seals one envelope. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EphemeralKey([u8; KEY_SIZE]);

impl EphemeralKey {
    /// Generate a key from a cryptographically secure source.
    ///
    /// # Errors
    ///
    /// Returns `SealError::Randomness` if the source fails.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let mut bytes = [0u8; KEY_SIZE];
        rng.try_fill_bytes(&mut bytes)
            .map_err(|e| SealError::Randomness(e.to_string()))?;
        let key = Self(bytes);
        bytes.zeroize();
        Ok(key)
    }

    /// Use fixed key material. Meant for fixtures and interop checks.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for EphemeralKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EphemeralKey(<redacted>)")
    }
}

/// Append PKCS#7 padding.
///
/// Aligned input gets a full extra block, so the pad length is always
/// readable from the last byte.
pub fn pkcs7_pad(data: &[u8]) -> Vec<u8> {
    let pad = BLOCK_SIZE - data.len() % BLOCK_SIZE;
    let mut out = Vec::with_capacity(data.len() + pad);
    out.extend_from_slice(data);
    out.resize(data.len() + pad, pad as u8);
    out
}

/// Strip PKCS#7 padding.
///
/// # Errors
///
/// Returns `SealError::Crypto` if the input is not block-aligned or the
/// padding bytes are inconsistent.
pub fn pkcs7_unpad(data: &[u8]) -> Result<&[u8]> {
    if data.is_empty() || data.len() % BLOCK_SIZE != 0 {
        return Err(SealError::Crypto(format!(
            "padded length {} is not a positive multiple of {}",
            data.len(),
            BLOCK_SIZE
        )));
    }
    let pad = data[data.len() - 1] as usize;
    if pad == 0 || pad > BLOCK_SIZE {
        return Err(SealError::Crypto(format!("invalid padding byte {}", pad)));
    }
    let (body, padding) = data.split_at(data.len() - pad);
    if padding.iter().any(|b| *b as usize != pad) {
        return Err(SealError::Crypto("inconsistent padding".to_string()));
    }
    Ok(body)
}

/// Encrypt a plaintext payload.
///
/// The padded copy of the plaintext is wiped if encryption fails.
///
/// # Errors
///
/// Returns `SealError::Crypto` if the cipher rejects the key or buffer.
pub fn encrypt_payload(key: &EphemeralKey, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut buf = Zeroizing::new(pkcs7_pad(plaintext));
    let len = buf.len();
    PayloadEncryptor::new_from_slices(key.as_bytes(), &ZERO_IV)
        .map_err(|e| SealError::Crypto(e.to_string()))?
        .encrypt_padded_mut::<NoPadding>(&mut buf, len)
        .map_err(|e| SealError::Crypto(e.to_string()))?;
    Ok(std::mem::take(&mut *buf))
}

/// Decrypt a payload produced by [`encrypt_payload`].
///
/// # Errors
///
/// Returns `SealError::Crypto` on a malformed ciphertext or bad padding
/// (which usually means the wrong key). The decrypted buffer is wiped on
/// every path.
pub fn decrypt_payload(key: &EphemeralKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    let mut buf = Zeroizing::new(ciphertext.to_vec());
    PayloadDecryptor::new_from_slices(key.as_bytes(), &ZERO_IV)
        .map_err(|e| SealError::Crypto(e.to_string()))?
        .decrypt_padded_mut::<NoPadding>(&mut buf)
        .map_err(|e| SealError::Crypto(e.to_string()))?;
    let plaintext = pkcs7_unpad(&buf)?.to_vec();
    Ok(plaintext)
}
