//! Configuration types for envelope sealing and delivery.
//!
//! [`ProtocolConfig`] carries the three protocol constants (app id, shared
//! secret, RSA public key). It is loaded once, validated when a
//! [`RequestBuilder`](crate::RequestBuilder) is built from it, and never
//! mutated afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Result, SealError};

/// Application id sent as `appId` and in the `X-Hrt-Mid-Appid` header.
pub const HRT_WEB_APP_ID: &str = "API_AUTH_WEB";

/// RSA public key the HRT mid-platform unwraps envelope keys with.
pub const HRT_WEB_PUBLIC_KEY_PEM: &str = "-----BEGIN PUBLIC KEY-----
MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQDuAiqDmvn9Rf15o21qkDxN0rUf
ZsX6rVBrtfgY6tamN2Yn+1D3eHZJuKNlucyqeBr6nmfN2srYAX+oyCXr5vWwFclj
PuWh8aSASqyk7MfbAv5Q4VqYS7lsYUQRdw4plZG0NASDeBvHWi3lsHjGfNb7iUvg
rk312EDfBHtRgDvB0QIDAQAB
-----END PUBLIC KEY-----";

/// Base URL of the HRT mid-platform API.
pub const HRT_WEB_BASE_URL: &str = "https://mid.huaruntong.cn";

/// `Origin` the HRT web page sends.
pub const HRT_WEB_ORIGIN: &str = "https://cloud.huaruntong.cn";

/// `Referer` the HRT web page sends.
pub const HRT_WEB_REFERER: &str = "https://cloud.huaruntong.cn/";

/// Shared HMAC secret.
///
/// Zeroized on drop and never printed.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SharedSecret(String);

impl SharedSecret {
    /// Wrap a secret string.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Secret bytes, used as the HMAC key.
    pub fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Check if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// Protocol constants for one remote service.
#[derive(Clone, Debug, Deserialize)]
pub struct ProtocolConfig {
    /// Application id injected as `appId`.
    pub app_id: String,

    /// HMAC-MD5 key for the `signature` field.
    pub shared_secret: SharedSecret,

    /// RSA public key (SPKI or PKCS#1 PEM) used to wrap the payload key.
    pub public_key_pem: String,
}

impl ProtocolConfig {
    /// Create a protocol configuration.
    pub fn new(
        app_id: impl Into<String>,
        shared_secret: SharedSecret,
        public_key_pem: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            shared_secret,
            public_key_pem: public_key_pem.into(),
        }
    }

    /// Preset for the HRT web channel. The secret is not bundled.
    pub fn hrt_web(shared_secret: SharedSecret) -> Self {
        Self::new(HRT_WEB_APP_ID, shared_secret, HRT_WEB_PUBLIC_KEY_PEM)
    }

    /// Replace the shared secret.
    pub fn with_shared_secret(mut self, shared_secret: SharedSecret) -> Self {
        self.shared_secret = shared_secret;
        self
    }

    /// Check the fields that can be checked without parsing the key.
    ///
    /// The PEM itself is parsed by [`KeyWrapper::from_pem`](crate::KeyWrapper::from_pem).
    pub fn validate(&self) -> Result<()> {
        if self.app_id.trim().is_empty() {
            return Err(SealError::configuration("app_id", "must not be empty"));
        }
        if self.shared_secret.is_empty() {
            return Err(SealError::configuration(
                "shared_secret",
                "must not be empty",
            ));
        }
        if self.public_key_pem.trim().is_empty() {
            return Err(SealError::configuration(
                "public_key_pem",
                "must not be empty",
            ));
        }
        Ok(())
    }
}

/// Settings for the HTTP envelope transport.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Base URL; each API path is appended to it.
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// `User-Agent` header.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// `Origin` header. Defaults to the HRT web origin; `null` omits it.
    #[serde(default = "default_origin")]
    pub origin: Option<String>,

    /// `Referer` header. Defaults to the HRT web page; `null` omits it.
    #[serde(default = "default_referer")]
    pub referer: Option<String>,

    /// Additional headers sent with every request.
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
}

fn default_timeout() -> u64 {
    30
}

fn default_origin() -> Option<String> {
    Some(HRT_WEB_ORIGIN.to_string())
}

fn default_referer() -> Option<String> {
    Some(HRT_WEB_REFERER.to_string())
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (iPhone; CPU iPhone OS 16_6 like Mac OS X) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1"
        .to_string()
}

impl HttpConfig {
    /// Create an HTTP configuration.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            origin: default_origin(),
            referer: default_referer(),
            extra_headers: BTreeMap::new(),
        }
    }

    /// Preset for the HRT web channel.
    pub fn hrt_web() -> Self {
        Self::new(HRT_WEB_BASE_URL)
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the `Origin` header.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Set the `Referer` header.
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }
}

/// On-disk configuration: protocol constants plus transport settings.
#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfig {
    /// Protocol constants.
    pub protocol: ProtocolConfig,

    /// Transport settings; defaults to the HRT web preset.
    #[serde(default = "HttpConfig::hrt_web")]
    pub http: HttpConfig,
}

impl ClientConfig {
    /// Parse a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json).map_err(ConfigFileError::from)?)
    }

    /// Load a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            ConfigFileError::Read {
                path: path.as_ref().display().to_string(),
                source,
            }
        })?;
        Self::from_json_str(&contents)
    }
}

/// Failure loading a configuration file.
#[derive(Debug, thiserror::Error)]
enum ConfigFileError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl From<ConfigFileError> for SealError {
    fn from(err: ConfigFileError) -> Self {
        SealError::configuration("config_file", err.to_string())
    }
}
