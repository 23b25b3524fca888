//! Envelope construction.
//!
//! Each stage is its own type and each transition consumes the previous
//! stage, so the order is fixed at compile time:
//!
//! ```text
//! RequestBuilder::assemble -> ParamsAssembled
//!     .sign()              -> Signed        (signature inserted)
//!     .encrypt(rng)        -> Encrypted     (payload sealed, key held)
//!     .wrap_key(rng)       -> KeyWrapped    (key consumed)
//!     .into_envelope()     -> Envelope
//! ```
//!
//! A failed transition returns the error and drops everything built so far.
//! The ephemeral key zeroizes itself on drop.
//!
//! # Example
//!
//! ```ignore
//! use sealkit_lib::{ProtocolConfig, RequestBuilder, RequestParameters, SharedSecret};
//!
//! let builder = RequestBuilder::new(ProtocolConfig::hrt_web(SharedSecret::new(secret)))?;
//!
//! let mut params = RequestParameters::new();
//! params.insert("channelId", "APP")?;
//!
//! let envelope = builder.seal(params, "/api/points/saveQuestionSignin")?;
//! println!("{}", envelope.to_json());
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde_json::Value;
use zeroize::Zeroizing;

use crate::canonical::canonicalize;
use crate::cipher::{encrypt_payload, EphemeralKey};
use crate::clock::{Clock, SystemClock};
use crate::compat::to_compact_json;
use crate::config::ProtocolConfig;
use crate::key_wrap::KeyWrapper;
use crate::signing::{Signature, Signer};
use crate::{Envelope, RequestParameters, Result};

/// Parameter name of the percent-encoded API path.
pub const FIELD_API_PATH: &str = "apiPath";
/// Parameter name of the application id.
pub const FIELD_APP_ID: &str = "appId";
/// Parameter name of the request timestamp.
pub const FIELD_TIMESTAMP: &str = "timestamp";
/// Parameter name of the request signature.
pub const FIELD_SIGNATURE: &str = "signature";

/// Builds envelopes for one protocol configuration.
///
/// Immutable once created; share it freely (`Send + Sync`).
#[derive(Clone, Debug)]
pub struct RequestBuilder {
    app_id: String,
    signer: Signer,
    wrapper: KeyWrapper,
}

impl RequestBuilder {
    /// Validate `config` and parse its public key.
    ///
    /// # Errors
    ///
    /// Returns `SealError::Configuration` for an empty app id or secret, or
    /// a public key that does not parse.
    pub fn new(config: ProtocolConfig) -> Result<Self> {
        config.validate()?;
        let wrapper = KeyWrapper::from_pem(&config.public_key_pem)?;
        Ok(Self {
            app_id: config.app_id.clone(),
            signer: Signer::new(config.shared_secret.clone()),
            wrapper,
        })
    }

    /// Application id injected into every request.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Seal `params` for `api_path` using the wall clock and the OS RNG.
    pub fn seal(&self, params: RequestParameters, api_path: &str) -> Result<Envelope> {
        self.seal_with(params, api_path, &SystemClock, &mut OsRng)
    }

    /// Seal with an explicit clock and random source.
    ///
    /// The clock is read exactly once. The RNG supplies the payload key and
    /// the OAEP seed; it must be cryptographically secure.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, fields(api_path = %api_path, app_id = %self.app_id)))]
    pub fn seal_with<C, R>(
        &self,
        params: RequestParameters,
        api_path: &str,
        clock: &C,
        rng: &mut R,
    ) -> Result<Envelope>
    where
        C: Clock + ?Sized,
        R: RngCore + CryptoRng,
    {
        let timestamp = clock.now_millis();
        let envelope = self
            .assemble(params, api_path, timestamp)
            .sign()?
            .encrypt(rng)?
            .wrap_key(rng)?
            .into_envelope();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            timestamp,
            data_len = envelope.data().len(),
            "sealed request envelope"
        );

        Ok(envelope)
    }

    /// First transition: inject `apiPath`, `appId` and `timestamp`.
    ///
    /// Keys already present in `params` are overwritten in place.
    pub fn assemble(
        &self,
        mut params: RequestParameters,
        api_path: &str,
        timestamp: u64,
    ) -> ParamsAssembled<'_> {
        params.insert_value(
            FIELD_API_PATH,
            Value::String(urlencoding::encode(api_path).into_owned()),
        );
        params.insert_value(FIELD_APP_ID, Value::String(self.app_id.clone()));
        params.insert_value(FIELD_TIMESTAMP, Value::from(timestamp));
        ParamsAssembled {
            builder: self,
            params,
            timestamp,
        }
    }
}

/// Parameters with the protocol fields injected, not yet signed.
#[derive(Debug)]
pub struct ParamsAssembled<'a> {
    builder: &'a RequestBuilder,
    params: RequestParameters,
    timestamp: u64,
}

impl<'a> ParamsAssembled<'a> {
    /// Assembled parameters.
    pub fn params(&self) -> &RequestParameters {
        &self.params
    }

    /// Timestamp captured for this request.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Canonicalize, sign, and insert `signature`.
    ///
    /// # Errors
    ///
    /// Returns `SealError::Serialization` if a composite value cannot be
    /// written as JSON.
    pub fn sign(self) -> Result<Signed<'a>> {
        let canonical = canonicalize(&self.params)?;
        let signature = self.builder.signer.sign(&canonical);

        let mut params = self.params;
        params.insert_value(FIELD_SIGNATURE, Value::String(signature.to_string()));

        Ok(Signed {
            builder: self.builder,
            params,
            canonical,
            signature,
            timestamp: self.timestamp,
        })
    }
}

/// Signed parameters, ready for encryption.
#[derive(Debug)]
pub struct Signed<'a> {
    builder: &'a RequestBuilder,
    params: RequestParameters,
    canonical: String,
    signature: Signature,
    timestamp: u64,
}

impl<'a> Signed<'a> {
    /// Parameters including `signature`.
    pub fn params(&self) -> &RequestParameters {
        &self.params
    }

    /// The string that was signed.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// The signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Timestamp captured for this request.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Serialize the payload, then generate a fresh key and encrypt.
    ///
    /// Serialization runs before the RNG is touched, so a bad value never
    /// costs a key.
    ///
    /// # Errors
    ///
    /// `Serialization`, `Randomness` or `Crypto`, in that order of checking.
    pub fn encrypt<R: RngCore + CryptoRng>(self, rng: &mut R) -> Result<Encrypted<'a>> {
        let plaintext = Zeroizing::new(to_compact_json(&self.params)?);
        let key = EphemeralKey::generate(rng)?;
        self.seal_payload(&plaintext, key)
    }

    /// Encrypt under a caller-chosen key (fixtures, interop checks).
    pub fn encrypt_with_key(self, key: EphemeralKey) -> Result<Encrypted<'a>> {
        let plaintext = Zeroizing::new(to_compact_json(&self.params)?);
        self.seal_payload(&plaintext, key)
    }

    fn seal_payload(self, plaintext: &str, key: EphemeralKey) -> Result<Encrypted<'a>> {
        let ciphertext = encrypt_payload(&key, plaintext.as_bytes())?;
        Ok(Encrypted {
            builder: self.builder,
            key,
            data: STANDARD.encode(ciphertext),
            timestamp: self.timestamp,
        })
    }
}

/// Encrypted payload; still holds the ephemeral key for wrapping.
#[derive(Debug)]
pub struct Encrypted<'a> {
    builder: &'a RequestBuilder,
    key: EphemeralKey,
    data: String,
    timestamp: u64,
}

impl<'a> Encrypted<'a> {
    /// Base64 ciphertext of the payload.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Timestamp captured for this request.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Wrap the ephemeral key. The key is dropped (and zeroized) here.
    ///
    /// # Errors
    ///
    /// Returns `SealError::Crypto` if RSA encryption fails.
    pub fn wrap_key<R: RngCore + CryptoRng>(self, rng: &mut R) -> Result<KeyWrapped> {
        let Encrypted {
            builder, key, data, ..
        } = self;
        let wrapped = builder.wrapper.wrap(&key, rng)?;
        drop(key);
        Ok(KeyWrapped {
            key: STANDARD.encode(wrapped),
            data,
        })
    }
}

/// Both halves of the envelope, encoded.
#[derive(Debug)]
pub struct KeyWrapped {
    key: String,
    data: String,
}

impl KeyWrapped {
    /// Final transition.
    pub fn into_envelope(self) -> Envelope {
        Envelope::new(self.key, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cipher::decrypt_payload;
    use crate::clock::FixedClock;
    use crate::config::SharedSecret;
    use crate::test_utils::{open_envelope, test_private_key, test_protocol_config, TestFixtures};
    use crate::SealError;
    use serde_json::json;

    fn builder() -> RequestBuilder {
        RequestBuilder::new(test_protocol_config()).unwrap()
    }

    fn golden_params() -> RequestParameters {
        RequestParameters::try_from(json!({"answerResult": 1, "channelId": "APP"})).unwrap()
    }

    #[test]
    fn test_builder_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RequestBuilder>();
    }

    #[test]
    fn test_assemble_injects_fields_in_order() {
        let b = builder();
        let assembled = b.assemble(golden_params(), TestFixtures::API_PATH, 1_700_000_000_000);

        let keys: Vec<&str> = assembled.params().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["answerResult", "channelId", "apiPath", "appId", "timestamp"]
        );
        assert_eq!(
            assembled.params().get("apiPath"),
            Some(&json!("%2Fapi%2Fpoints%2FsaveQuestionSignin"))
        );
        assert_eq!(assembled.params().get("timestamp"), Some(&json!(1_700_000_000_000u64)));
        assert_eq!(assembled.timestamp(), 1_700_000_000_000);
    }

    #[test]
    fn test_assemble_overwrites_caller_protocol_fields() {
        let params = RequestParameters::try_from(json!({
            "timestamp": 1,
            "appId": "spoofed",
            "x": "y",
        }))
        .unwrap();
        let b = builder();
        let assembled = b.assemble(params, "/p", 42);

        assert_eq!(assembled.params().get("timestamp"), Some(&json!(42)));
        assert_eq!(assembled.params().get("appId"), Some(&json!(TestFixtures::APP_ID)));
        let first = assembled.params().iter().next().map(|(k, _)| k.as_str());
        assert_eq!(first, Some("timestamp"));
    }

    #[test]
    fn test_golden_canonical_and_signature() {
        let b = builder();
        let signed = b
            .assemble(golden_params(), TestFixtures::API_PATH, TestFixtures::TIMESTAMP)
            .sign()
            .unwrap();

        assert_eq!(signed.timestamp(), TestFixtures::TIMESTAMP);
        assert_eq!(signed.canonical(), TestFixtures::CANONICAL);
        assert_eq!(signed.signature().as_str(), TestFixtures::SIGNATURE);
        assert_eq!(
            signed.params().get("signature"),
            Some(&json!(TestFixtures::SIGNATURE))
        );
    }

    #[test]
    fn test_golden_ciphertext() {
        let b = builder();
        let encrypted = b
            .assemble(golden_params(), TestFixtures::API_PATH, TestFixtures::TIMESTAMP)
            .sign()
            .unwrap()
            .encrypt_with_key(TestFixtures::ephemeral_key())
            .unwrap();

        assert_eq!(encrypted.data(), TestFixtures::DATA);
        assert_eq!(encrypted.timestamp(), TestFixtures::TIMESTAMP);
    }

    #[test]
    fn test_payload_decrypts_to_signed_json() {
        let b = builder();
        let encrypted = b
            .assemble(golden_params(), TestFixtures::API_PATH, TestFixtures::TIMESTAMP)
            .sign()
            .unwrap()
            .encrypt_with_key(TestFixtures::ephemeral_key())
            .unwrap();

        let ciphertext = STANDARD.decode(encrypted.data()).unwrap();
        let plaintext = decrypt_payload(&TestFixtures::ephemeral_key(), &ciphertext).unwrap();
        assert_eq!(String::from_utf8(plaintext).unwrap(), TestFixtures::PLAINTEXT);
    }

    #[test]
    fn test_null_values_signed_out_but_encrypted() {
        let params = RequestParameters::try_from(json!({"a": null, "b": "x"})).unwrap();
        let b = builder();
        let signed = b.assemble(params, "/p", 5).sign().unwrap();

        assert_eq!(signed.canonical(), "apiPath=%2Fp&appId=API_AUTH_WEB&b=x&timestamp=5");
        assert_eq!(signed.params().get("a"), Some(&Value::Null));
    }

    #[test]
    fn test_seal_roundtrip_with_private_key() {
        let b = builder();
        let envelope = b
            .seal_with(
                golden_params(),
                TestFixtures::API_PATH,
                &FixedClock(TestFixtures::TIMESTAMP),
                &mut OsRng,
            )
            .unwrap();

        let opened = open_envelope(test_private_key(), &envelope);
        assert_eq!(opened.to_string(), TestFixtures::PLAINTEXT);
    }

    #[test]
    fn test_each_seal_uses_fresh_key_and_timestamp() {
        let b = builder();
        let clock = FixedClock(TestFixtures::TIMESTAMP);
        let first = b
            .seal_with(golden_params(), TestFixtures::API_PATH, &clock, &mut OsRng)
            .unwrap();
        let second = b
            .seal_with(golden_params(), TestFixtures::API_PATH, &clock, &mut OsRng)
            .unwrap();

        // Same timestamp and parameters: only a fresh key changes `data`.
        assert_ne!(first.data(), second.data());
        assert_ne!(first.key(), second.key());
    }

    #[test]
    fn test_seal_uses_wall_clock() {
        let b = builder();
        let before = SystemClock.now_millis();
        let envelope = b.seal(golden_params(), "/p").unwrap();
        let after = SystemClock.now_millis();

        let opened = open_envelope(test_private_key(), &envelope);
        let ts = opened["timestamp"].as_u64().unwrap();
        assert!(before <= ts && ts <= after);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let mut config = test_protocol_config();
        config.public_key_pem = "not a key".to_string();
        assert!(matches!(
            RequestBuilder::new(config),
            Err(SealError::Configuration { .. })
        ));

        let config = test_protocol_config().with_shared_secret(SharedSecret::new(""));
        assert!(matches!(
            RequestBuilder::new(config),
            Err(SealError::Configuration { .. })
        ));
    }

    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new("entropy source unavailable"))
        }
    }

    impl CryptoRng for FailingRng {}

    #[test]
    fn test_rng_failure_aborts_without_envelope() {
        let b = builder();
        let result = b.seal_with(golden_params(), "/p", &FixedClock(1), &mut FailingRng);
        assert!(matches!(result, Err(SealError::Randomness(_))));
    }
}
