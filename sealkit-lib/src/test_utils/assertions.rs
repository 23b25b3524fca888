//! Helpers that open envelopes with the test private key.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::RsaPrivateKey;
use serde_json::Value;

use crate::cipher::{decrypt_payload, EphemeralKey, KEY_SIZE};
use crate::compat::key_wrap_padding;
use crate::Envelope;

/// Decrypt a wrapped key.
///
/// # Panics
/// Panics if the ciphertext does not unwrap to a 16-byte key.
pub fn unwrap_key(private_key: &RsaPrivateKey, wrapped: &[u8]) -> EphemeralKey {
    let raw = private_key
        .decrypt(key_wrap_padding(), wrapped)
        .expect("wrapped key should decrypt with the test private key");
    let bytes: [u8; KEY_SIZE] = raw
        .as_slice()
        .try_into()
        .unwrap_or_else(|_| panic!("unwrapped key has {} bytes, expected {}", raw.len(), KEY_SIZE));
    EphemeralKey::from_bytes(bytes)
}

/// Unwrap the key, decrypt `data`, and parse the signed parameters.
///
/// Parameter order is preserved.
///
/// # Panics
/// Panics if any step fails.
pub fn open_envelope(private_key: &RsaPrivateKey, envelope: &Envelope) -> Value {
    open_parts(private_key, envelope.key(), envelope.data())
}

/// [`open_envelope`] for the raw `key` and `data` strings of a posted body.
///
/// # Panics
/// Panics if any step fails.
pub fn open_parts(private_key: &RsaPrivateKey, key: &str, data: &str) -> Value {
    let wrapped = STANDARD.decode(key).expect("envelope key should be base64");
    let key = unwrap_key(private_key, &wrapped);

    let ciphertext = STANDARD.decode(data).expect("envelope data should be base64");
    let plaintext = decrypt_payload(&key, &ciphertext).expect("payload should decrypt");
    serde_json::from_slice(&plaintext).expect("payload should be JSON")
}

/// Assert the wire shape: both fields base64, `key` one RSA block long and
/// `data` a whole number of AES blocks.
///
/// # Panics
/// Panics if the envelope is malformed.
pub fn assert_envelope_shape(envelope: &Envelope, modulus_len: usize) {
    let key = STANDARD
        .decode(envelope.key())
        .expect("envelope key should be base64");
    assert_eq!(key.len(), modulus_len, "wrapped key length");

    let data = STANDARD
        .decode(envelope.data())
        .expect("envelope data should be base64");
    assert!(!data.is_empty(), "data should not be empty");
    assert_eq!(data.len() % 16, 0, "data should be whole AES blocks");
}
