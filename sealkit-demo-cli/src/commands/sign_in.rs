//! Sign-in command - submit the daily question sign-in

use anyhow::{Context, Result};
use sealkit_lib::{ClientConfig, SealedClient, SignInRequest, SIGN_IN_PATH};

use crate::ui;

#[tracing::instrument(skip(config, token))]
pub async fn run(
    config: &ClientConfig,
    token: &str,
    invite_code: Option<String>,
    verbose: bool,
) -> Result<()> {
    ui::header("Daily Sign-in");

    let client = SealedClient::http(config).context("Invalid client configuration")?;

    if verbose {
        ui::key_value("URL", &client.transport().url(SIGN_IN_PATH));
    }

    let mut request = SignInRequest::new(token);
    if let Some(code) = invite_code {
        request = request.with_invite_code(code);
    }

    let response = client.sign_in(&request).await.map_err(|e| {
        ui::error(&format!("Sign-in failed: {}", e));
        e
    })?;

    ui::success("Sign-in submitted");
    ui::json(&response);
    Ok(())
}
