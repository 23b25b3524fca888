//! Sealkit library.
//!
//! Builds the signed, hybrid-encrypted request envelopes the HRT
//! mid-platform API expects, and optionally posts them.
//!
//! # Pipeline
//!
//! ```text
//! params + apiPath + appId + timestamp
//!     -> canonical string -> HMAC-MD5 -> "signature"
//!     -> compact JSON -> AES-128-CBC (fresh key, zero IV) -> "data"
//!     -> RSA-OAEP(fresh key) -> "key"
//!     -> {"key": ..., "data": ...}
//! ```
//!
//! # Example
//!
//! ```ignore
//! use sealkit_lib::{ProtocolConfig, RequestBuilder, RequestParameters, SharedSecret};
//!
//! let builder = RequestBuilder::new(ProtocolConfig::hrt_web(SharedSecret::new(secret)))?;
//!
//! let mut params = RequestParameters::new();
//! params.insert("answerResult", &1)?;
//! params.insert("channelId", "APP")?;
//!
//! let envelope = builder.seal(params, "/api/points/saveQuestionSignin")?;
//! println!("{}", envelope.to_json());
//! ```
//!
//! # Features
//!
//! - `http-transport`: reqwest-backed [`HttpTransport`]
//! - `tracing`: spans and events around sealing and delivery
//! - `test-utils`: fixtures and a cached RSA test keypair

pub mod builder;
pub mod canonical;
pub mod cipher;
pub mod client;
pub mod clock;
pub mod compat;
pub mod config;
pub mod envelope;
pub mod errors;
pub mod key_wrap;
pub mod params;
pub mod prelude;
pub mod signing;
mod transport;

/// Fixtures and helpers for testing code that seals envelopes.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use builder::{Encrypted, KeyWrapped, ParamsAssembled, RequestBuilder, Signed};
pub use canonical::canonicalize;
pub use cipher::EphemeralKey;
pub use client::{SealedClient, SignInRequest, SIGN_IN_PATH};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ClientConfig, HttpConfig, ProtocolConfig, SharedSecret};
pub use envelope::Envelope;
pub use errors::{SealError, SealErrorCode};
pub use key_wrap::KeyWrapper;
pub use params::RequestParameters;
pub use signing::{Signature, Signer};
pub use transport::{EnvelopeTransport, HttpTransport};

/// Common result alias for sealing operations.
pub type Result<T> = std::result::Result<T, SealError>;
