use async_trait::async_trait;
use serde_json::Value;

use crate::{Envelope, Result};

/// Sends a sealed envelope and returns the parsed response body.
///
/// Implementations must not retry on their own: a retry needs a freshly
/// sealed envelope, which only the caller can build.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait EnvelopeTransport {
    /// POST `envelope` to `api_path` (relative to the transport's base URL).
    async fn post_envelope(&self, api_path: &str, envelope: &Envelope) -> Result<Value>;
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<T: EnvelopeTransport + Send + Sync + ?Sized> EnvelopeTransport for std::sync::Arc<T> {
    async fn post_envelope(&self, api_path: &str, envelope: &Envelope) -> Result<Value> {
        (**self).post_envelope(api_path, envelope).await
    }
}
