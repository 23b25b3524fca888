//! CLI command implementations

pub mod canonical;
pub mod seal;
pub mod send;
pub mod sign_in;

use std::path::Path;

use anyhow::{Context, Result};
use sealkit_lib::{
    ClientConfig, Clock, FixedClock, HttpConfig, ProtocolConfig, RequestBuilder,
    RequestParameters, SharedSecret, SystemClock,
};

/// Environment variable overriding the shared secret.
pub const SECRET_ENV: &str = "SEALKIT_SHARED_SECRET";

/// Load the client configuration.
///
/// Without a file the HRT web preset is used; `SEALKIT_SHARED_SECRET`
/// overrides the secret either way.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    let secret = std::env::var(SECRET_ENV).ok().filter(|s| !s.is_empty());

    let mut config = match path {
        Some(path) => ClientConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            let secret = secret
                .clone()
                .with_context(|| format!("No --config given and {} is not set", SECRET_ENV))?;
            ClientConfig {
                protocol: ProtocolConfig::hrt_web(SharedSecret::new(secret)),
                http: HttpConfig::hrt_web(),
            }
        }
    };

    if let Some(secret) = secret {
        tracing::debug!("Shared secret taken from {}", SECRET_ENV);
        config.protocol = config.protocol.with_shared_secret(SharedSecret::new(secret));
    }

    Ok(config)
}

/// Build the envelope builder from the loaded configuration.
pub fn request_builder(config: &ClientConfig) -> Result<RequestBuilder> {
    RequestBuilder::new(config.protocol.clone()).context("Invalid protocol configuration")
}

/// Parse a JSON object given on the command line.
pub fn parse_params(raw: &str) -> Result<RequestParameters> {
    let value: serde_json::Value =
        serde_json::from_str(raw).context("Parameters must be valid JSON")?;
    RequestParameters::try_from(value).context("Parameters must be a JSON object")
}

/// Fixed clock when a timestamp is given, wall clock otherwise.
pub fn clock(timestamp: Option<u64>) -> Box<dyn Clock> {
    match timestamp {
        Some(ts) => Box::new(FixedClock(ts)),
        None => Box::new(SystemClock),
    }
}
