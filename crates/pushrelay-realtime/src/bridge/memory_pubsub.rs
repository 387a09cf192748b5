//! In-memory pub/sub for single-node deployments and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::sync::broadcast;

use pushrelay_core::result::AppResult;
use pushrelay_core::traits::PubSubBackend;

/// In-memory pub/sub implementation.
#[derive(Debug)]
pub struct MemoryPubSub {
    /// Channel name → broadcast sender
    channels: RwLock<HashMap<String, broadcast::Sender<Vec<u8>>>>,
    /// Buffer size for channels
    buffer_size: usize,
}

impl MemoryPubSub {
    /// Create a new in-memory pub/sub
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            buffer_size,
        }
    }

    /// Subscribe to a channel, returns a receiver
    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<Vec<u8>> {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0);
        tx.subscribe()
    }
}

impl Default for MemoryPubSub {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl PubSubBackend for MemoryPubSub {
    async fn publish(&self, channel: &str, payload: &[u8]) -> AppResult<u64> {
        let channels = self.channels.read().await;
        let delivered = channels
            .get(channel)
            .and_then(|tx| tx.send(payload.to_vec()).ok())
            .unwrap_or(0);
        Ok(delivered as u64)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
