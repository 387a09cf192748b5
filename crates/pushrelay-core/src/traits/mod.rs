//! Core traits defined in `pushrelay-core` and implemented by other crates.

pub mod pubsub;

pub use pubsub::PubSubBackend;
