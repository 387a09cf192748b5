//! Pub/sub transports the publisher writes to.

pub mod memory_pubsub;
#[cfg(feature = "redis-pubsub")]
pub mod redis_pubsub;

pub use memory_pubsub::MemoryPubSub;
#[cfg(feature = "redis-pubsub")]
pub use redis_pubsub::RedisPubSub;
