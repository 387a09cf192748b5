//! Per-user event names.
//!
//! The push server subscribes each authenticated socket to an event named
//! after a digest of its user id and the shared secret, so raw user ids
//! never appear on the channel.

use hmac::{Hmac, Mac};
use sha1::{Digest, Sha1};
use sha2::Sha256;

use pushrelay_core::config::UserEventHash;
use pushrelay_core::error::AppError;
use pushrelay_core::result::AppResult;

type HmacSha256 = Hmac<Sha256>;

/// Derives the event name targeting a single user.
#[derive(Clone)]
pub struct UserEventNamer {
    secret: Option<String>,
    algorithm: UserEventHash,
}

impl std::fmt::Debug for UserEventNamer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserEventNamer")
            .field("has_secret", &self.secret.is_some())
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl UserEventNamer {
    /// Creates a namer. An empty secret counts as missing.
    pub fn new(secret: Option<&str>, algorithm: UserEventHash) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()).map(str::to_string),
            algorithm,
        }
    }

    /// Returns the hex event name for `user_id`.
    ///
    /// Fails with a configuration error when no secret is set.
    pub fn event_name(&self, user_id: &str) -> AppResult<String> {
        let secret = self.secret.as_deref().ok_or_else(|| {
            AppError::configuration("A secret must be set to emit events to a user")
        })?;

        match self.algorithm {
            UserEventHash::Sha1Concat => {
                let mut hasher = Sha1::new();
                hasher.update(user_id.as_bytes());
                hasher.update(secret.as_bytes());
                Ok(hex::encode(hasher.finalize()))
            }
            UserEventHash::HmacSha256 => {
                let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
                    .map_err(|e| AppError::internal(format!("Invalid HMAC key: {e}")))?;
                mac.update(user_id.as_bytes());
                Ok(hex::encode(mac.finalize().into_bytes()))
            }
        }
    }
}
