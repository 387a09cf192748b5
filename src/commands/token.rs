//! Push token CLI commands.

use std::time::Duration;

use clap::{Args, Subcommand};
use serde_json::{Map, Value};

use crate::output::{self, OutputFormat};
use pushrelay_auth::TokenCodec;
use pushrelay_core::config::AppConfig;
use pushrelay_core::error::AppError;

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Issue a token
    Issue {
        /// User info as a JSON object
        #[arg(short, long, default_value = r#"{"guest":true}"#)]
        info: String,
        /// Comma-separated rooms the bearer may join
        #[arg(short, long, value_delimiter = ',')]
        rooms: Option<Vec<String>>,
    },
    /// Verify a token and print its claims
    Verify {
        /// The token
        token: String,
        /// Maximum age in seconds (defaults to the configured value)
        #[arg(short, long)]
        max_age: Option<u64>,
    },
}

/// Execute token commands
pub fn execute(args: &TokenArgs, config: AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let secret = config
        .push
        .secret()
        .ok_or_else(|| AppError::configuration("push.secret is not set"))?;
    let codec = TokenCodec::new(secret)?;

    match &args.command {
        TokenCommand::Issue { info, rooms } => {
            let info: Map<String, Value> = serde_json::from_str(info)
                .map_err(|e| AppError::serialization(format!("--info must be a JSON object: {e}")))?;
            println!("{}", codec.issue(info, rooms.clone())?);
        }
        TokenCommand::Verify { token, max_age } => {
            let max_age = max_age.unwrap_or(config.push.token_max_age_seconds);
            let claims = codec.verify(token, Duration::from_secs(max_age))?;
            output::print_item(&claims, format);
        }
    }

    Ok(())
}
