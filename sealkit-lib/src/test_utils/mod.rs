//! Test utilities for envelope sealing.
//!
//! - Golden fixtures with their expected canonical string, signature and
//!   ciphertext
//! - A cached RSA test keypair, so sealed envelopes can be opened again
//! - A recording transport for client tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sealkit_lib::test_utils::{open_envelope, test_private_key, test_protocol_config};
//! use sealkit_lib::RequestBuilder;
//!
//! let builder = RequestBuilder::new(test_protocol_config())?;
//! let envelope = builder.seal(params, "/api/points/saveQuestionSignin")?;
//!
//! let payload = open_envelope(test_private_key(), &envelope);
//! assert_eq!(payload["appId"], "API_AUTH_WEB");
//! ```

mod assertions;
mod fixtures;
mod mock_transport;

pub use fixtures::{test_private_key, test_protocol_config, TestFixtures};

pub use assertions::{assert_envelope_shape, open_envelope, open_parts, unwrap_key};

pub use mock_transport::RecordingTransport;
