//! Test fixtures and the cached RSA test keypair.

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;

use crate::cipher::EphemeralKey;
use crate::config::{ProtocolConfig, SharedSecret};

/// Golden request: `{"answerResult": 1, "channelId": "APP"}` sealed for the
/// sign-in path with [`TestFixtures::SECRET`] and [`TestFixtures::ephemeral_key`].
pub struct TestFixtures;

impl TestFixtures {
    pub const SECRET: &'static str = "test-shared-secret";
    pub const APP_ID: &'static str = "API_AUTH_WEB";
    pub const API_PATH: &'static str = "/api/points/saveQuestionSignin";
    pub const TIMESTAMP: u64 = 1_700_000_000_000;

    /// String the signature is computed over.
    pub const CANONICAL: &'static str = "answerResult=1&apiPath=%2Fapi%2Fpoints%2FsaveQuestionSignin&appId=API_AUTH_WEB&channelId=APP&timestamp=1700000000000";

    /// HMAC-MD5 of [`Self::CANONICAL`] under [`Self::SECRET`].
    pub const SIGNATURE: &'static str = "934b41418dddead0c620e46ff9b4fcab";

    /// HMAC-MD5 of the empty string under [`Self::SECRET`].
    pub const EMPTY_SIGNATURE: &'static str = "ccf69f0c55ace9264da6b0b73113e5fc";

    /// Encrypted payload before base64.
    pub const PLAINTEXT: &'static str = r#"{"answerResult":1,"channelId":"APP","apiPath":"%2Fapi%2Fpoints%2FsaveQuestionSignin","appId":"API_AUTH_WEB","timestamp":1700000000000,"signature":"934b41418dddead0c620e46ff9b4fcab"}"#;

    /// `data` field under the fixture key.
    pub const DATA: &'static str = "y/eh8a1YZuK/PMwWV2AyWTNvwyURh0dKsEVnrjJ9LUuAgN+r38kOzWZxzbB/AdFcRwCI33TM2Gl0//aTk0bk1u1E4Sbvp3iPrBsMaw1RfTWbs/ouBwiIzEeQDsbd9jEESYQZxuEJ/huNSNAdCCL96pm9lLLBmiLeCNvo5JInbg5i1cYh87Pqqivl98oyX9BpB+HvImwPRgzwfpHu781J9+vL8Mc4luwQ1+hS86jiO+VEyHyuQiJpYcb5z5ncz0Ka";

    /// Key bytes `00 01 .. 0f`.
    pub fn ephemeral_key() -> EphemeralKey {
        let mut bytes = [0u8; 16];
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = i as u8;
        }
        EphemeralKey::from_bytes(bytes)
    }
}

/// 1024-bit RSA keypair, generated once per process from a fixed seed.
pub fn test_private_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(0x5EA1_C0DE);
        RsaPrivateKey::new(&mut rng, 1024).expect("test RSA key generation")
    })
}

/// Protocol constants matching [`TestFixtures`], with the public half of
/// [`test_private_key`].
pub fn test_protocol_config() -> ProtocolConfig {
    let pem = test_private_key()
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("test public key PEM");
    ProtocolConfig::new(
        TestFixtures::APP_ID,
        SharedSecret::new(TestFixtures::SECRET),
        pem,
    )
}
