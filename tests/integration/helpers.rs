//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::TryRecvError;

use pushrelay_core::config::PushConfig;
use pushrelay_realtime::message::formatter::EmitRecord;
use pushrelay_realtime::{MemoryPubSub, PushService, PushUser};

/// Test relay wired to an in-memory channel
pub struct TestRelay {
    /// The service under test
    pub service: Arc<PushService>,
    /// Subscriber on the configured channel
    pub rx: Receiver<Vec<u8>>,
}

impl TestRelay {
    /// Create a relay with a secret configured
    pub async fn new() -> Self {
        Self::with_config(PushConfig {
            secret: Some("integration-secret".to_string()),
            ..Default::default()
        })
        .await
    }

    /// Create a relay from an explicit configuration
    pub async fn with_config(config: PushConfig) -> Self {
        let pubsub = Arc::new(MemoryPubSub::default());
        let rx = pubsub.subscribe(&config.channel).await;
        let service = PushService::builder(config)
            .backend(pubsub)
            .build()
            .expect("Failed to build push service");

        Self {
            service: Arc::new(service),
            rx,
        }
    }

    /// Next record on the channel, if one is waiting
    pub fn try_next(&mut self) -> Option<EmitRecord> {
        match self.rx.try_recv() {
            Ok(payload) => Some(EmitRecord::decode(&payload).expect("Undecodable record")),
            Err(TryRecvError::Empty) => None,
            Err(e) => panic!("Channel error: {e}"),
        }
    }

    /// Drain every waiting record
    pub fn drain(&mut self) -> Vec<EmitRecord> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

/// A signed-in user
pub struct TestUser {
    pub id: u64,
    pub rooms: Option<Vec<String>>,
}

impl PushUser for TestUser {
    fn id(&self) -> String {
        self.id.to_string()
    }

    fn email(&self) -> String {
        format!("user{}@example.com", self.id)
    }

    fn avatar_url(&self) -> Option<String> {
        Some(format!("https://cdn.example.com/avatars/{}.png", self.id))
    }

    fn allowed_push_rooms(&self) -> Option<Vec<String>> {
        self.rooms.clone()
    }
}

/// Payload used in tests
pub fn payload(n: u64) -> Value {
    json!({ "n": n })
}
