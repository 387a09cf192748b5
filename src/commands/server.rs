//! Push server helper commands.

use clap::Args;

use crate::output;
use pushrelay_auth::UserEventNamer;
use pushrelay_core::config::AppConfig;
use pushrelay_core::error::AppError;

/// Arguments for the server-command command
#[derive(Debug, Args)]
pub struct ServerCommandArgs {
    /// Pass --debug to the push server
    #[arg(long)]
    pub debug: bool,
    /// Pass --access-logs to the push server
    #[arg(long)]
    pub access_logs: bool,
}

/// Arguments for the user-event command
#[derive(Debug, Args)]
pub struct UserEventArgs {
    /// User id
    pub user_id: String,
}

/// Print the push server command line
pub fn server_command(args: &ServerCommandArgs, config: AppConfig) -> Result<(), AppError> {
    let argv = config.push.server_command(args.debug, args.access_logs);
    println!("{}", argv.join(" "));
    output::print_kv("Clients connect to", &config.push.server_url());
    Ok(())
}

/// Print the per-user event name
pub fn user_event(args: &UserEventArgs, config: AppConfig) -> Result<(), AppError> {
    let namer = UserEventNamer::new(config.push.secret(), config.push.user_event_hash);
    println!("{}", namer.event_name(&args.user_id)?);
    Ok(())
}
