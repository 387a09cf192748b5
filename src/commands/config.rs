//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use pushrelay_core::config::AppConfig;
use pushrelay_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (the secret is masked)
    Show,
    /// Check that the configuration can publish to a user and issue tokens
    Validate,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, mut config: AppConfig, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            if config.push.secret().is_some() {
                config.push.secret = Some("****".to_string());
            }
            output::print_item(&config, format);
        }
        ConfigCommand::Validate => {
            if config.push.secret().is_none() {
                return Err(AppError::configuration(
                    "push.secret is not set; tokens and per-user events are unavailable",
                ));
            }
            output::print_success("Configuration is valid");
            output::print_kv("Channel", &config.push.channel);
            output::print_kv("Server URL", &config.push.server_url());
            output::print_kv(
                "Room prefix",
                if config.push.prefix_event_with_room { "on" } else { "off" },
            );
        }
    }

    Ok(())
}
