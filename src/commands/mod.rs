//! CLI command definitions and dispatch.

pub mod config;
pub mod emit;
pub mod server;
pub mod token;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use pushrelay_core::config::AppConfig;
use pushrelay_core::error::AppError;
use pushrelay_realtime::PushService;

/// PushRelay: publish application events to the push server
#[derive(Debug, Parser)]
#[command(name = "pushrelay", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (loads config/<env>.toml over config/default.toml)
    #[arg(short, long, default_value = "development", env = "PUSHRELAY_ENV")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Issue or verify push tokens
    Token(token::TokenArgs),
    /// Publish one event on the push channel
    Emit(emit::EmitArgs),
    /// Print the event name targeting one user
    UserEvent(server::UserEventArgs),
    /// Print the command line that starts the push server
    ServerCommand(server::ServerCommandArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Token(args) => token::execute(args, config, self.format),
            Commands::Emit(args) => emit::execute(args, config).await,
            Commands::UserEvent(args) => server::user_event(args, config),
            Commands::ServerCommand(args) => server::server_command(args, config),
            Commands::Config(args) => config::execute(args, config, self.format),
        }
    }
}

/// Helper: connect the push service to the configured Redis server
pub async fn connect(config: AppConfig) -> Result<Arc<PushService>, AppError> {
    Ok(Arc::new(PushService::connect(config.push).await?))
}
