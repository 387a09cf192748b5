//! Pub/sub backend trait for pluggable transports.

use async_trait::async_trait;

use crate::result::AppResult;

/// A broadcast transport that push events are written to.
///
/// Implementations must be safe to share between concurrent requests;
/// no locking is added around calls.
#[async_trait]
pub trait PubSubBackend: Send + Sync + std::fmt::Debug + 'static {
    /// Publish a payload on a channel.
    ///
    /// Returns the number of subscribers that received the message, as
    /// reported by the backend.
    async fn publish(&self, channel: &str, payload: &[u8]) -> AppResult<u64>;

    /// Short name of the backend, for logging.
    fn backend_name(&self) -> &'static str;
}
