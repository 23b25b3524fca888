//! HTTP envelope transport.
//!
//! Posts the envelope as the JSON body of `POST {base_url}{api_path}` with
//! the header set the HRT web client sends.
//!
//! # Feature Flags
//!
//! This module requires the `http-transport` feature flag for actual HTTP
//! requests. Without it, every post returns an `Unimplemented` error.
//!
//! ```toml
//! [dependencies]
//! sealkit-lib = { version = "1.0", features = ["http-transport"] }
//! ```

use async_trait::async_trait;
use serde_json::Value;
#[cfg(feature = "http-transport")]
use std::time::Duration;

use super::traits::EnvelopeTransport;
use crate::config::HttpConfig;
#[cfg(feature = "http-transport")]
use crate::SealError;
use crate::{Envelope, RequestBuilder, Result};

/// reqwest-backed [`EnvelopeTransport`].
///
/// No retries, no backoff: one call, one request.
pub struct HttpTransport {
    config: HttpConfig,
    app_id: String,
    #[cfg(feature = "http-transport")]
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for envelopes sealed by `builder`.
    ///
    /// The builder's app id is sent in the `X-Hrt-Mid-Appid` header, so the
    /// header always matches the sealed `appId`.
    ///
    /// # Errors
    ///
    /// Returns `SealError::Configuration` for a header that is not valid
    /// HTTP, or `SealError::Transport` if the client cannot be built.
    #[cfg(feature = "http-transport")]
    pub fn new(config: HttpConfig, builder: &RequestBuilder) -> Result<Self> {
        let app_id = builder.app_id().to_string();
        let headers = default_headers(&config, &app_id)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| SealError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            app_id,
            client,
        })
    }

    /// Create a transport (stub when feature disabled).
    #[cfg(not(feature = "http-transport"))]
    pub fn new(config: HttpConfig, builder: &RequestBuilder) -> Result<Self> {
        Ok(Self {
            config,
            app_id: builder.app_id().to_string(),
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Application id sent with every request.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Full URL for an API path.
    pub fn url(&self, api_path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if api_path.starts_with('/') {
            format!("{}{}", base, api_path)
        } else {
            format!("{}/{}", base, api_path)
        }
    }

    /// Configured timeout in milliseconds, saturating at `u64::MAX`.
    #[cfg(feature = "http-transport")]
    fn timeout_ms(&self) -> u64 {
        self.config.timeout_secs.saturating_mul(1000)
    }

    /// Map reqwest errors to SealError.
    #[cfg(feature = "http-transport")]
    fn map_reqwest_error(&self, e: reqwest::Error) -> SealError {
        if e.is_timeout() {
            SealError::ConnectionTimeout {
                operation: "envelope POST".to_string(),
                timeout_ms: self.timeout_ms(),
            }
        } else if e.is_connect() {
            SealError::ConnectionFailed {
                target: self.config.base_url.clone(),
                reason: e.to_string(),
            }
        } else {
            SealError::Transport(format!("envelope POST failed: {}", e))
        }
    }
}

#[cfg(feature = "http-transport")]
fn default_headers(config: &HttpConfig, app_id: &str) -> Result<reqwest::header::HeaderMap> {
    use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, ORIGIN, REFERER};

    fn value(field: &str, raw: &str) -> Result<HeaderValue> {
        HeaderValue::from_str(raw).map_err(|e| SealError::configuration(field, e.to_string()))
    }

    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json;charset=UTF-8"),
    );
    headers.insert(HeaderName::from_static("x-hrt-mid-appid"), value("app_id", app_id)?);
    headers.insert(
        HeaderName::from_static("x-hrt-mid-newrisk"),
        HeaderValue::from_static("newRisk"),
    );
    if let Some(origin) = &config.origin {
        headers.insert(ORIGIN, value("origin", origin)?);
    }
    if let Some(referer) = &config.referer {
        headers.insert(REFERER, value("referer", referer)?);
    }
    for (name, raw) in &config.extra_headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| SealError::configuration("extra_headers", e.to_string()))?;
        headers.insert(name, value("extra_headers", raw)?);
    }
    Ok(headers)
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl EnvelopeTransport for HttpTransport {
    #[cfg(feature = "http-transport")]
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, envelope), fields(api_path = %api_path)))]
    async fn post_envelope(&self, api_path: &str, envelope: &Envelope) -> Result<Value> {
        let response = self
            .client
            .post(self.url(api_path))
            .body(envelope.to_json())
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            #[cfg(feature = "tracing")]
            tracing::warn!(status = status.as_u16(), "envelope rejected");
            return Err(SealError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SealError::Serialization(format!("failed to parse response: {}", e)))
    }

    #[cfg(not(feature = "http-transport"))]
    async fn post_envelope(&self, _api_path: &str, _envelope: &Envelope) -> Result<Value> {
        Err(crate::SealError::Unimplemented(
            "HTTP transport not compiled - enable the 'http-transport' feature",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_protocol_config;

    fn builder() -> RequestBuilder {
        RequestBuilder::new(test_protocol_config()).unwrap()
    }

    #[test]
    fn test_url_joining() {
        let transport =
            HttpTransport::new(HttpConfig::new("https://mid.example.cn/"), &builder()).unwrap();
        assert_eq!(
            transport.url("/api/points/saveQuestionSignin"),
            "https://mid.example.cn/api/points/saveQuestionSignin"
        );
        assert_eq!(transport.url("api/x"), "https://mid.example.cn/api/x");
    }

    #[test]
    fn test_app_id_follows_builder() {
        let b = builder();
        let config = HttpConfig::new("http://localhost").with_timeout(7);
        let transport = HttpTransport::new(config, &b).unwrap();
        assert_eq!(transport.app_id(), b.app_id());
        assert_eq!(transport.config().timeout_secs, 7);
    }

    #[cfg(feature = "http-transport")]
    #[test]
    fn test_fixed_headers_without_preset() {
        let headers = default_headers(&HttpConfig::new("http://localhost"), "APP").unwrap();
        assert_eq!(headers["x-hrt-mid-newrisk"], "newRisk");
        assert_eq!(headers["x-hrt-mid-appid"], "APP");
        assert_eq!(headers["origin"], crate::config::HRT_WEB_ORIGIN);
        assert_eq!(headers["referer"], crate::config::HRT_WEB_REFERER);
    }

    #[cfg(feature = "http-transport")]
    #[test]
    fn test_huge_timeout_does_not_overflow() {
        let config = HttpConfig::new("http://localhost").with_timeout(u64::MAX / 10);
        let transport = HttpTransport::new(config, &builder()).unwrap();
        assert_eq!(transport.timeout_ms(), u64::MAX);

        let transport = HttpTransport::new(HttpConfig::new("http://localhost"), &builder()).unwrap();
        assert_eq!(transport.timeout_ms(), transport.config().timeout_secs * 1000);
    }

    #[cfg(feature = "http-transport")]
    #[test]
    fn test_invalid_header_is_configuration_error() {
        let config = HttpConfig::new("http://localhost").with_header("X-Bad", "line\nbreak");
        let err = HttpTransport::new(config, &builder()).err().unwrap();
        assert!(matches!(err, SealError::Configuration { .. }));
    }

    #[cfg(not(feature = "http-transport"))]
    #[tokio::test]
    async fn test_stub_is_unimplemented() {
        let transport = HttpTransport::new(HttpConfig::hrt_web(), &builder()).unwrap();
        let envelope = Envelope::new("k".to_string(), "d".to_string());
        let err = transport.post_envelope("/x", &envelope).await.unwrap_err();
        assert_eq!(err.code(), crate::SealErrorCode::Unimplemented);
    }
}
