//! # pushrelay-realtime
//!
//! Relays application events to an external Socket.IO push server. Provides:
//!
//! - Emit record formatting in the push server's pub/sub schema
//! - Redis and in-memory pub/sub backends
//! - Per-request context with stackable suppression flags
//! - Deferral of emissions until the enclosing transaction commits
//! - Pluggable current-user loading and client token bootstrap

pub mod bridge;
pub mod context;
pub mod message;
pub mod publisher;
pub mod service;
pub mod tx;
pub mod user;

pub use bridge::MemoryPubSub;
#[cfg(feature = "redis-pubsub")]
pub use bridge::RedisPubSub;
pub use context::PushContext;
pub use message::{EmitRequest, EventFormatter, PushEvent};
pub use publisher::{EmitOutcome, Publisher};
pub use service::{ClientBootstrap, PushService, PushServiceBuilder};
pub use tx::{DeferredCalls, TransactionScope, in_transaction};
pub use user::{CurrentUserLoader, DefaultUserLoader, LoadedUser, PushUser};
