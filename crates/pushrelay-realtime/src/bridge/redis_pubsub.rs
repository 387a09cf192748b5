//! Redis pub/sub transport.

use async_trait::async_trait;
use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use pushrelay_core::error::{AppError, ErrorKind};
use pushrelay_core::result::AppResult;
use pushrelay_core::traits::PubSubBackend;

/// Publishes to Redis through a shared, reconnecting connection.
#[derive(Clone)]
pub struct RedisPubSub {
    /// Redis connection manager (multiplexed, reconnecting).
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisPubSub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPubSub").finish_non_exhaustive()
    }
}

impl RedisPubSub {
    /// Connects to the Redis server at `url`.
    pub async fn connect(url: &str) -> AppResult<Self> {
        info!(url = %mask_redis_url(url), "Connecting to Redis");

        let client = Client::open(url).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid Redis URL", e)
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::with_source(ErrorKind::Transport, "Failed to connect to Redis", e)
        })?;

        info!("Successfully connected to Redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl PubSubBackend for RedisPubSub {
    async fn publish(&self, channel: &str, payload: &[u8]) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        let receivers = redis::cmd("PUBLISH")
            .arg(channel)
            .arg(payload)
            .query_async::<i64>(&mut conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Transport, "Redis PUBLISH failed", e))?;

        Ok(receivers.max(0) as u64)
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// Mask password in Redis URL for safe logging.
pub fn mask_redis_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
            if colon_pos > scheme_end {
                return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
            }
        }
    }
    url.to_string()
}
