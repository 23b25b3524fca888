//! In-memory transport for client tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::transport::EnvelopeTransport;
use crate::{Envelope, Result, SealError};

/// Records every posted envelope and answers with a canned response.
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, Envelope)>>,
    response: Value,
    failure: Mutex<Option<SealError>>,
}

impl RecordingTransport {
    /// Answer every post with `response`.
    pub fn responding(response: Value) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            response,
            failure: Mutex::new(None),
        }
    }

    /// Fail the first post with `error`; later posts succeed with `null`.
    pub fn failing(error: SealError) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            response: Value::Null,
            failure: Mutex::new(Some(error)),
        }
    }

    /// Envelopes posted so far, with their API paths.
    pub fn sent(&self) -> Vec<(String, Envelope)> {
        self.sent.lock().expect("lock poisoned").clone()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl EnvelopeTransport for RecordingTransport {
    async fn post_envelope(&self, api_path: &str, envelope: &Envelope) -> Result<Value> {
        self.sent
            .lock()
            .expect("lock poisoned")
            .push((api_path.to_string(), envelope.clone()));

        if let Some(error) = self.failure.lock().expect("lock poisoned").take() {
            return Err(error);
        }
        Ok(self.response.clone())
    }
}
