//! Canonical command - show the signed string and its signature

use anyhow::Result;
use sealkit_lib::ClientConfig;

use crate::ui;

#[tracing::instrument(skip(config, params))]
pub fn run(
    config: &ClientConfig,
    params: &str,
    api_path: &str,
    timestamp: Option<u64>,
    verbose: bool,
) -> Result<()> {
    ui::header("Canonical String");

    let builder = super::request_builder(config)?;
    let params = super::parse_params(params)?;
    let timestamp = super::clock(timestamp).now_millis();

    let signed = builder.assemble(params, api_path, timestamp).sign()?;

    ui::key_value("App ID", builder.app_id());
    ui::key_value("Timestamp", &signed.timestamp().to_string());
    ui::separator();
    println!("{}", signed.canonical());
    ui::separator();
    ui::key_value("Signature", signed.signature().as_str());

    if verbose {
        ui::info("Signed parameters:");
        ui::json(&serde_json::to_value(signed.params())?);
    }

    Ok(())
}
