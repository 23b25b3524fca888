//! Sealed API client.
//!
//! Couples a [`RequestBuilder`] with an [`EnvelopeTransport`]: every call
//! seals its parameters into a fresh envelope and posts it.

use serde::Serialize;
use serde_json::Value;

use crate::transport::{EnvelopeTransport, HttpTransport};
use crate::{ClientConfig, RequestBuilder, RequestParameters, Result};

/// API path of the daily sign-in endpoint.
pub const SIGN_IN_PATH: &str = "/api/points/saveQuestionSignin";

/// Body of the daily sign-in call.
///
/// Defaults reproduce the values the HRT web page submits; only `token` is
/// user specific.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    /// Outcome of the daily question; the page always submits `1`.
    pub answer_result: u8,
    /// Calling channel, `APP` by default.
    pub channel_id: String,
    /// Merchant running the points campaign.
    pub merchant_code: String,
    /// Campaign store code.
    pub store_code: String,
    /// Points system id.
    pub sys_id: String,
    /// Client transaction id; empty lets the server assign one.
    pub transaction_uuid: String,
    /// Referral code, empty when none.
    pub invite_code: String,
    /// Session token of the signed-in member.
    pub token: String,
}

impl SignInRequest {
    /// Sign-in request for a session token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            answer_result: 1,
            channel_id: "APP".to_string(),
            merchant_code: "1641000001532".to_string(),
            store_code: "qiandaosonjifen".to_string(),
            sys_id: "T0000001".to_string(),
            transaction_uuid: String::new(),
            invite_code: String::new(),
            token: token.into(),
        }
    }

    /// Override the channel id.
    pub fn with_channel_id(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = channel_id.into();
        self
    }

    pub fn with_merchant_code(mut self, merchant_code: impl Into<String>) -> Self {
        self.merchant_code = merchant_code.into();
        self
    }

    pub fn with_store_code(mut self, store_code: impl Into<String>) -> Self {
        self.store_code = store_code.into();
        self
    }

    /// Attach a referral code.
    pub fn with_invite_code(mut self, invite_code: impl Into<String>) -> Self {
        self.invite_code = invite_code.into();
        self
    }
}

/// Seals requests and sends them through a transport.
pub struct SealedClient<T> {
    builder: RequestBuilder,
    transport: T,
}

impl SealedClient<HttpTransport> {
    /// HTTP client built from one configuration, so the app id header and
    /// the sealed `appId` come from the same place.
    ///
    /// # Errors
    ///
    /// Any error from [`RequestBuilder::new`] or [`HttpTransport::new`].
    pub fn http(config: &ClientConfig) -> Result<Self> {
        let builder = RequestBuilder::new(config.protocol.clone())?;
        let transport = HttpTransport::new(config.http.clone(), &builder)?;
        Ok(Self::new(builder, transport))
    }
}

impl<T: EnvelopeTransport> SealedClient<T> {
    /// Create a client.
    pub fn new(builder: RequestBuilder, transport: T) -> Self {
        Self { builder, transport }
    }

    /// The envelope builder.
    pub fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Seal `params` for `api_path` and post the envelope.
    ///
    /// `params` must serialize to a JSON object. Nothing is sent if sealing
    /// fails.
    ///
    /// # Errors
    ///
    /// Any sealing error, or the transport's error.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, params), fields(api_path = %api_path)))]
    pub async fn call<P: Serialize + ?Sized>(&self, api_path: &str, params: &P) -> Result<Value> {
        let params = RequestParameters::from_serializable(params)?;
        let envelope = self.builder.seal(params, api_path)?;
        let response = self.transport.post_envelope(api_path, &envelope).await?;

        #[cfg(feature = "tracing")]
        tracing::info!("sealed call completed");

        Ok(response)
    }

    /// Submit the daily sign-in.
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<Value> {
        self.call(SIGN_IN_PATH, request).await
    }
}
