//! Sealkit Demo CLI
//!
//! Command-line interface for inspecting and sending sealed request envelopes.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod ui;

#[derive(Parser)]
#[command(name = "sealkit-demo")]
#[command(about = "Sealkit Demo CLI - Build, inspect and send sealed request envelopes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file (protocol constants and HTTP settings)
    #[arg(long, global = true, env = "SEALKIT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the canonical string and signature for a set of parameters
    Canonical {
        /// Request parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,

        /// API path the request is for
        #[arg(long, default_value = sealkit_lib::SIGN_IN_PATH)]
        api_path: String,

        /// Timestamp in milliseconds (defaults to now)
        #[arg(long)]
        timestamp: Option<u64>,
    },

    /// Seal parameters and print the envelope body
    Seal {
        /// Request parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,

        /// API path the request is for
        #[arg(long, default_value = sealkit_lib::SIGN_IN_PATH)]
        api_path: String,

        /// Timestamp in milliseconds (defaults to now)
        #[arg(long)]
        timestamp: Option<u64>,
    },

    /// Seal parameters and POST the envelope
    Send {
        /// Request parameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,

        /// API path to post to
        #[arg(long)]
        api_path: String,
    },

    /// Submit the daily question sign-in
    SignIn {
        /// Session token
        #[arg(long, env = "SEALKIT_TOKEN")]
        token: String,

        /// Invite code (optional)
        #[arg(long)]
        invite_code: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("sealkit_demo_cli=debug,sealkit_lib=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("sealkit_demo_cli=info,sealkit_lib=warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let config = commands::load_config(cli.config.as_deref())?;

    // Dispatch commands
    match cli.command {
        Commands::Canonical {
            params,
            api_path,
            timestamp,
        } => {
            commands::canonical::run(&config, &params, &api_path, timestamp, cli.verbose)?;
        }
        Commands::Seal {
            params,
            api_path,
            timestamp,
        } => {
            commands::seal::run(&config, &params, &api_path, timestamp, cli.verbose)?;
        }
        Commands::Send { params, api_path } => {
            commands::send::run(&config, &params, &api_path, cli.verbose).await?;
        }
        Commands::SignIn { token, invite_code } => {
            commands::sign_in::run(&config, &token, invite_code, cli.verbose).await?;
        }
    }

    Ok(())
}
