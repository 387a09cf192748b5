//! Publish a single event from the command line.

use clap::Args;
use serde_json::Value;

use crate::output;
use pushrelay_core::config::AppConfig;
use pushrelay_core::error::AppError;
use pushrelay_realtime::{EmitOutcome, EmitRequest, PushContext};

/// Arguments for the emit command
#[derive(Debug, Args)]
pub struct EmitArgs {
    /// Event name
    pub event: String,
    /// Payload as JSON
    #[arg(short, long, default_value = "null")]
    pub data: String,
    /// Deliver to this room only
    #[arg(short, long)]
    pub room: Option<String>,
    /// Socket.IO namespace
    #[arg(short, long)]
    pub namespace: Option<String>,
    /// Deliver to this user only (the event name is then derived from the id)
    #[arg(short, long, conflicts_with = "room")]
    pub user: Option<String>,
}

/// Execute the emit command
pub async fn execute(args: &EmitArgs, config: AppConfig) -> Result<(), AppError> {
    let data: Value = serde_json::from_str(&args.data)
        .map_err(|e| AppError::serialization(format!("--data must be JSON: {e}")))?;

    let mut request = EmitRequest::new(&args.event).data(data);
    request.room = args.room.clone();
    request.namespace = args.namespace.clone();

    let service = super::connect(config).await?;
    let ctx = PushContext::new();
    let outcome = match &args.user {
        Some(user_id) => service.publish_to_user(&ctx, user_id, request).await?,
        None => service.publish(&ctx, request).await?,
    };

    if let EmitOutcome::Published { receivers } = outcome {
        output::print_success(&format!(
            "Published '{}' on '{}' ({} subscriber(s))",
            args.event,
            service.config().channel,
            receivers
        ));
    }

    Ok(())
}
