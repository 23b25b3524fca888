//! Request signatures.
//!
//! The signature is the lower-case hex HMAC of the canonical string, keyed
//! with the shared secret. It travels inside the encrypted payload only.

use hmac::Mac;

use crate::compat::SignatureMac;
use crate::config::SharedSecret;

/// Hex-encoded request signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(String);

impl Signature {
    /// Get the signature as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Signature {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signs canonical strings with a shared secret.
#[derive(Clone, Debug)]
pub struct Signer {
    secret: SharedSecret,
}

impl Signer {
    /// Create a signer.
    pub fn new(secret: SharedSecret) -> Self {
        Self { secret }
    }

    /// Sign a canonical string.
    pub fn sign(&self, canonical: &str) -> Signature {
        let mut mac = match <SignatureMac as Mac>::new_from_slice(self.secret.expose()) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC accepts keys of any length"),
        };
        mac.update(canonical.as_bytes());
        Signature(hex::encode(mac.finalize().into_bytes()))
    }
}
