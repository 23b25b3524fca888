//! The sealed request body.

use serde::Serialize;

/// Encrypted request body: `{"key": ..., "data": ...}`.
///
/// `key` is the base64 RSA-OAEP ciphertext of the payload key, `data` the
/// base64 AES-CBC ciphertext of the signed parameters. Only
/// [`RequestBuilder`](crate::RequestBuilder) produces envelopes; once built
/// they are immutable and never parsed back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Envelope {
    key: String,
    data: String,
}

impl Envelope {
    pub(crate) fn new(key: String, data: String) -> Self {
        Self { key, data }
    }

    /// Base64 wrapped key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Base64 encrypted payload.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Serialize as the HTTP body.
    pub fn to_json(&self) -> String {
        serde_json::json!({ "key": self.key, "data": self.data }).to_string()
    }
}
