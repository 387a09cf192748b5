//! Emit record formatting.
//!
//! The push server's pub/sub listener expects one JSON object per message
//! with the fields `method`, `event`, `data`, `namespace`, `room`,
//! `skip_sid`, `callback` and `host_id`. This layout is a fixed contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use pushrelay_core::result::AppResult;

use super::event::{EmitRequest, PushEvent};

/// Namespace used when none is given.
pub const DEFAULT_NAMESPACE: &str = "/";

/// One message on the pub/sub channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitRecord {
    /// Always `"emit"`.
    pub method: String,
    /// Event name.
    pub event: String,
    /// Event payload.
    pub data: Value,
    /// Socket.IO namespace.
    pub namespace: String,
    /// Target room.
    pub room: Option<String>,
    /// Connection excluded from delivery.
    pub skip_sid: Option<String>,
    /// Always null; acknowledgements are not relayed.
    pub callback: Option<Value>,
    /// Emitting process.
    pub host_id: String,
}

impl EmitRecord {
    /// Decode a record read from the channel.
    pub fn decode(payload: &[u8]) -> AppResult<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}

/// Turns emission requests into channel payloads.
#[derive(Debug, Clone)]
pub struct EventFormatter {
    host_id: String,
    prefix_event_with_room: bool,
}

impl EventFormatter {
    /// Create a formatter stamping records with `host_id`.
    pub fn new(host_id: impl Into<String>, prefix_event_with_room: bool) -> Self {
        Self {
            host_id: host_id.into(),
            prefix_event_with_room,
        }
    }

    /// Identifier of the emitting process.
    pub fn host_id(&self) -> &str {
        &self.host_id
    }

    /// Event name after applying the room prefix policy.
    pub fn event_name(&self, event: &str, room: Option<&str>) -> String {
        match room {
            Some(room) if self.prefix_event_with_room && !room.is_empty() => {
                format!("{room}:{event}")
            }
            _ => event.to_string(),
        }
    }

    /// Resolve a request into a push event.
    pub fn resolve(&self, request: EmitRequest, skip_connection_id: Option<String>) -> PushEvent {
        PushEvent {
            event_name: self.event_name(&request.event, request.room.as_deref()),
            data: request.data,
            namespace: request.namespace,
            room: request.room,
            skip_connection_id,
            host_id: self.host_id.clone(),
        }
    }

    /// Encode a resolved event as a channel payload.
    pub fn encode(&self, event: &PushEvent) -> AppResult<Vec<u8>> {
        let record = EmitRecord {
            method: "emit".to_string(),
            event: event.event_name.clone(),
            data: event.data.clone(),
            namespace: event
                .namespace
                .clone()
                .filter(|ns| !ns.is_empty())
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            room: event.room.clone(),
            skip_sid: event.skip_connection_id.clone(),
            callback: None,
            host_id: event.host_id.clone(),
        };
        Ok(serde_json::to_vec(&record)?)
    }

    /// Format an emission in one step, prefix policy included.
    pub fn format(
        &self,
        event: &str,
        data: Value,
        namespace: Option<&str>,
        room: Option<&str>,
        skip_connection_id: Option<&str>,
    ) -> AppResult<Vec<u8>> {
        let mut request = EmitRequest::new(event).data(data);
        request.namespace = namespace.map(str::to_string);
        request.room = room.map(str::to_string);
        self.encode(&self.resolve(request, skip_connection_id.map(str::to_string)))
    }
}
