//! Seal command - build an envelope without sending it

use anyhow::Result;
use rand::rngs::OsRng;
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
    let builder = super::request_builder(config)?;
    let params = super::parse_params(params)?;
    let clock = super::clock(timestamp);

    tracing::debug!("Sealing {} parameters", params.len());
    let envelope = builder.seal_with(params, api_path, clock.as_ref(), &mut OsRng)?;

    if verbose {
        ui::header("Sealed Envelope");
        ui::key_value("API path", api_path);
        ui::key_value("Key (base64)", envelope.key());
        ui::key_value("Data length", &envelope.data().len().to_string());
        ui::separator();
    }

    // Body only, so the output can be piped.
    println!("{}", envelope.to_json());
    Ok(())
}
