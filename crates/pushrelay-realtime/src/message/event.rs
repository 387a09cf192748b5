//! Emission requests and resolved push events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arguments of a single `publish` call.
///
/// Built with chained setters:
///
/// ```
/// # use pushrelay_realtime::EmitRequest;
/// let request = EmitRequest::new("msg")
///     .data(serde_json::json!({"text": "hi"}))
///     .room("lobby");
/// assert_eq!(request.room.as_deref(), Some("lobby"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmitRequest {
    /// Event name as seen by clients.
    pub event: String,
    /// Event payload.
    pub data: Value,
    /// Explicit self-echo policy. `None` follows the context default.
    pub skip_self: Option<bool>,
    /// Room to deliver to.
    pub room: Option<String>,
    /// Socket.IO namespace.
    pub namespace: Option<String>,
}

impl EmitRequest {
    /// Create a request for `event` with a null payload.
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            ..Default::default()
        }
    }

    /// Set the payload.
    pub fn data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Set the self-echo policy explicitly.
    pub fn skip_self(mut self, skip_self: bool) -> Self {
        self.skip_self = Some(skip_self);
        self
    }

    /// Deliver to a room only.
    pub fn room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    /// Deliver within a namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// An emission with every policy resolved, ready to be formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushEvent {
    /// Final event name, room prefix included.
    pub event_name: String,
    /// Event payload.
    pub data: Value,
    /// Namespace; `None` means the default `/`.
    pub namespace: Option<String>,
    /// Target room.
    pub room: Option<String>,
    /// Connection that must not receive the event.
    pub skip_connection_id: Option<String>,
    /// Identifier of the emitting process.
    pub host_id: String,
}
