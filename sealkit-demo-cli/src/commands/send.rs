//! Send command - seal parameters and POST them

use anyhow::{Context, Result};
use sealkit_lib::{ClientConfig, SealedClient};

use crate::ui;

#[tracing::instrument(skip(config, params))]
pub async fn run(config: &ClientConfig, params: &str, api_path: &str, verbose: bool) -> Result<()> {
    ui::header("Send Sealed Request");

    let params = super::parse_params(params)?;
    let client = SealedClient::http(config).context("Invalid client configuration")?;

    if verbose {
        ui::key_value("URL", &client.transport().url(api_path));
        ui::key_value("App ID", client.builder().app_id());
    }

    match client.call(api_path, &params).await {
        Ok(response) => {
            ui::success("Request accepted");
            ui::json(&response);
            Ok(())
        }
        Err(e) => {
            ui::error(&format!("Request failed: {}", e));
            if e.is_retryable() {
                ui::info("The failure is transient; running the command again builds a fresh envelope");
            }
            Err(e.into())
        }
    }
}
