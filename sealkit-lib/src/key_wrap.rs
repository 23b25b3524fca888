//! Wrapping of the payload key under the service's RSA public key.
//!
//! ```text
//! key = base64( RSA-OAEP-SHA1(public_key, ephemeral_key) )
//! ```

use rand::{CryptoRng, RngCore};
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::RsaPublicKey;

use crate::cipher::EphemeralKey;
use crate::compat::key_wrap_padding;
use crate::{Result, SealError};

/// Encrypts ephemeral keys for the remote service.
///
/// The PEM is parsed once, when the wrapper is created.
#[derive(Clone, Debug)]
pub struct KeyWrapper {
    public_key: RsaPublicKey,
}

impl KeyWrapper {
    /// Parse an SPKI (`BEGIN PUBLIC KEY`) or PKCS#1 (`BEGIN RSA PUBLIC KEY`) PEM.
    ///
    /// # Errors
    ///
    /// Returns `SealError::Configuration` if the PEM is not an RSA public key.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let pem = pem.trim();
        let public_key = RsaPublicKey::from_public_key_pem(pem)
            .or_else(|spki_err| RsaPublicKey::from_pkcs1_pem(pem).map_err(|_| spki_err))
            .map_err(|e| SealError::configuration("public_key_pem", e.to_string()))?;
        Ok(Self { public_key })
    }

    /// Use an already-parsed key.
    pub fn from_public_key(public_key: RsaPublicKey) -> Self {
        Self { public_key }
    }

    /// Modulus size in bytes; also the length of every wrapped key.
    pub fn modulus_len(&self) -> usize {
        self.public_key.size()
    }

    /// Encrypt the raw key bytes.
    ///
    /// OAEP is randomized: wrapping the same key twice gives different
    /// ciphertexts.
    ///
    /// # Errors
    ///
    /// Returns `SealError::Crypto` if encryption fails.
    pub fn wrap<R: RngCore + CryptoRng>(&self, key: &EphemeralKey, rng: &mut R) -> Result<Vec<u8>> {
        self.public_key
            .encrypt(rng, key_wrap_padding(), key.as_bytes())
            .map_err(|e| SealError::Crypto(format!("key wrap failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HRT_WEB_PUBLIC_KEY_PEM;
    use crate::test_utils::{test_private_key, unwrap_key};
    use rand::rngs::OsRng;
    use rsa::pkcs1::EncodeRsaPublicKey;
    use rsa::pkcs8::{EncodePublicKey, LineEnding};

    #[test]
    fn test_service_key_parses() {
        let wrapper = KeyWrapper::from_pem(HRT_WEB_PUBLIC_KEY_PEM).unwrap();
        assert_eq!(wrapper.modulus_len(), 128);
    }

    #[test]
    fn test_pkcs1_pem_accepted() {
        let pem = test_private_key()
            .to_public_key()
            .to_pkcs1_pem(LineEnding::LF)
            .unwrap();
        assert!(pem.starts_with("-----BEGIN RSA PUBLIC KEY-----"));
        assert!(KeyWrapper::from_pem(&pem).is_ok());
    }

    #[test]
    fn test_malformed_pem_is_configuration_error() {
        let err = KeyWrapper::from_pem("-----BEGIN PUBLIC KEY-----\nnope\n-----END PUBLIC KEY-----")
            .unwrap_err();
        assert!(matches!(err, SealError::Configuration { ref field, .. } if field == "public_key_pem"));

        assert!(KeyWrapper::from_pem("").is_err());
    }

    #[test]
    fn test_wrap_is_randomized_but_unwraps_to_same_key() {
        let private_key = test_private_key();
        let pem = private_key
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();
        let wrapper = KeyWrapper::from_pem(&pem).unwrap();
        let key = EphemeralKey::from_bytes([0x5A; 16]);

        let first = wrapper.wrap(&key, &mut OsRng).unwrap();
        let second = wrapper.wrap(&key, &mut OsRng).unwrap();

        assert_ne!(first, second);
        assert_eq!(first.len(), wrapper.modulus_len());
        assert_eq!(unwrap_key(private_key, &first).as_bytes(), key.as_bytes());
        assert_eq!(unwrap_key(private_key, &second).as_bytes(), key.as_bytes());
    }

    #[test]
    fn test_parsed_key_matches_pem() {
        let private_key = test_private_key();
        let pem = private_key
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .unwrap();
        let from_pem = KeyWrapper::from_pem(&pem).unwrap();
        let from_key = KeyWrapper::from_public_key(private_key.to_public_key());
        assert_eq!(from_key.modulus_len(), from_pem.modulus_len());

        let key = EphemeralKey::from_bytes([0x11; 16]);
        let wrapped = from_key.wrap(&key, &mut OsRng).unwrap();
        assert_eq!(unwrap_key(private_key, &wrapped).as_bytes(), key.as_bytes());
    }
}
