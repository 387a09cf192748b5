//! Push relay configuration.

use serde::{Deserialize, Serialize};

/// Algorithm used to derive per-user event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserEventHash {
    /// Hex SHA-1 of the user id immediately followed by the secret.
    /// Compatible with existing push servers.
    #[default]
    Sha1Concat,
    /// Hex HMAC-SHA256 of the user id keyed with the secret.
    HmacSha256,
}

/// Settings for publishing events to the push server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Redis connection URL used for pub/sub.
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Pub/sub channel the push server listens on.
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Shared secret for tokens and per-user event names.
    #[serde(default)]
    pub secret: Option<String>,
    /// Rewrite room events as `"{room}:{event}"`.
    #[serde(default = "default_true")]
    pub prefix_event_with_room: bool,
    /// Public URL of the push server. Derived from the fields below when unset.
    #[serde(default)]
    pub server_url: Option<String>,
    /// Host name of the push server (a `:port` suffix is ignored).
    #[serde(default)]
    pub server_name: Option<String>,
    /// Port the push server listens on.
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    /// Whether the push server is reached over TLS.
    #[serde(default)]
    pub server_secured: bool,
    /// Default maximum token age in seconds when verifying.
    #[serde(default = "default_token_max_age")]
    pub token_max_age_seconds: u64,
    /// Request header carrying the caller's socket connection id.
    #[serde(default = "default_connection_id_header")]
    pub connection_id_header: String,
    /// Per-user event name derivation.
    #[serde(default)]
    pub user_event_hash: UserEventHash,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            redis_url: default_redis_url(),
            channel: default_channel(),
            secret: None,
            prefix_event_with_room: true,
            server_url: None,
            server_name: None,
            server_port: default_server_port(),
            server_secured: false,
            token_max_age_seconds: default_token_max_age(),
            connection_id_header: default_connection_id_header(),
            user_event_hash: UserEventHash::default(),
        }
    }
}

impl PushConfig {
    /// The configured secret, treating an empty string as absent.
    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref().filter(|s| !s.is_empty())
    }

    /// Public URL clients use to reach the push server.
    pub fn server_url(&self) -> String {
        if let Some(url) = self.server_url.as_deref().filter(|u| !u.is_empty()) {
            return url.to_string();
        }
        let name = self.server_name.as_deref().unwrap_or("localhost");
        let host = name.split(':').next().unwrap_or(name);
        let scheme = if self.server_secured { "https" } else { "http" };
        format!("{scheme}://{host}:{}", self.server_port)
    }

    /// Command line that launches the companion push server.
    pub fn server_command(&self, debug: bool, access_logs: bool) -> Vec<String> {
        let mut args: Vec<String> = ["python", "-m", "frasco.push.server", "--channel"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        args.push(self.channel.clone());
        args.push("--redis".to_string());
        args.push(self.redis_url.clone());
        args.push("--port".to_string());
        args.push(self.server_port.to_string());
        if let Some(secret) = self.secret() {
            args.push("--secret".to_string());
            args.push(secret.to_string());
        }
        if debug {
            args.push("--debug".to_string());
        }
        if access_logs {
            args.push("--access-logs".to_string());
        }
        args
    }
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_channel() -> String {
    "socketio".to_string()
}

fn default_true() -> bool {
    true
}

fn default_server_port() -> u16 {
    8888
}

fn default_token_max_age() -> u64 {
    86400
}

fn default_connection_id_header() -> String {
    "x-socketio-sid".to_string()
}
