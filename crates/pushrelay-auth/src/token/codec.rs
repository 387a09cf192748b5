//! Signed, timestamped push tokens.
//!
//! Tokens use the URL-safe timed serializer layout understood by the push
//! server: `base64(json) "." base64(timestamp) "." base64(hmac)`, where the
//! HMAC-SHA1 key is `sha1(salt + "signer" + secret)` and every base64 part is
//! URL-safe without padding.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha1::{Digest, Sha1};
use tracing::debug;

use pushrelay_core::error::AppError;
use pushrelay_core::result::AppResult;

use super::claims::PushClaims;

type HmacSha1 = Hmac<Sha1>;

/// Salt shared with the push server.
const SALT: &[u8] = b"itsdangerous";

const SEPARATOR: char = '.';

/// Issues and verifies push tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenCodec {
    /// Derived signing key.
    key: Vec<u8>,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Creates a codec from the shared secret. The secret must not be empty.
    pub fn new(secret: &str) -> AppResult<Self> {
        if secret.is_empty() {
            return Err(AppError::configuration(
                "A secret must be configured to issue push tokens",
            ));
        }

        let mut hasher = Sha1::new();
        hasher.update(SALT);
        hasher.update(b"signer");
        hasher.update(secret.as_bytes());

        Ok(Self {
            key: hasher.finalize().to_vec(),
        })
    }

    /// Issues a token for the given user info and rooms, stamped now.
    pub fn issue(
        &self,
        user_info: Map<String, Value>,
        allowed_rooms: Option<Vec<String>>,
    ) -> AppResult<String> {
        self.issue_at(
            &PushClaims::new(user_info, allowed_rooms),
            Utc::now().timestamp(),
        )
    }

    /// Issues a token with an explicit issuance timestamp (seconds since epoch).
    pub fn issue_at(&self, claims: &PushClaims, timestamp: i64) -> AppResult<String> {
        let timestamp = u64::try_from(timestamp)
            .map_err(|_| AppError::internal("Token timestamp must not be negative"))?;

        let json = serde_json::to_vec(claims)?;
        let value = format!(
            "{}{SEPARATOR}{}",
            URL_SAFE_NO_PAD.encode(json),
            URL_SAFE_NO_PAD.encode(int_to_bytes(timestamp))
        );
        let signature = URL_SAFE_NO_PAD.encode(self.mac(value.as_bytes())?.finalize().into_bytes());

        Ok(format!("{value}{SEPARATOR}{signature}"))
    }

    /// Verifies a token and returns its claims.
    ///
    /// Fails with `TokenInvalid` on any signature or format problem and with
    /// `TokenExpired` once more than `max_age` has elapsed since issuance.
    pub fn verify(&self, token: &str, max_age: Duration) -> AppResult<PushClaims> {
        self.verify_at(token, max_age, Utc::now().timestamp())
    }

    /// Verifies a token against an explicit current time.
    pub fn verify_at(&self, token: &str, max_age: Duration, now: i64) -> AppResult<PushClaims> {
        let (value, signature) = token
            .rsplit_once(SEPARATOR)
            .ok_or_else(|| AppError::token_invalid("No separator found in token"))?;

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AppError::token_invalid("Malformed token signature"))?;
        self.mac(value.as_bytes())?
            .verify_slice(&signature)
            .map_err(|_| AppError::token_invalid("Token signature does not match"))?;

        let (payload, timestamp) = value
            .rsplit_once(SEPARATOR)
            .ok_or_else(|| AppError::token_invalid("Timestamp missing from token"))?;
        let issued_at = URL_SAFE_NO_PAD
            .decode(timestamp)
            .ok()
            .and_then(|bytes| bytes_to_int(&bytes))
            .and_then(|n| i64::try_from(n).ok())
            .ok_or_else(|| AppError::token_invalid("Malformed token timestamp"))?;

        let age = now
            .checked_sub(issued_at)
            .ok_or_else(|| AppError::token_invalid("Token timestamp out of range"))?;
        if age < 0 {
            return Err(AppError::token_expired(format!(
                "Token age {age} < 0 seconds"
            )));
        }
        if age as u64 > max_age.as_secs() {
            return Err(AppError::token_expired(format!(
                "Token age {age} > {} seconds",
                max_age.as_secs()
            )));
        }

        if payload.starts_with(SEPARATOR) {
            return Err(AppError::token_invalid(
                "Compressed token payloads are not supported",
            ));
        }
        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AppError::token_invalid("Malformed token payload"))?;
        let claims: PushClaims = serde_json::from_slice(&json)
            .map_err(|e| AppError::token_invalid(format!("Undecodable token payload: {e}")))?;

        debug!(age, guest = claims.is_guest(), "Verified push token");
        Ok(claims)
    }

    fn mac(&self, value: &[u8]) -> AppResult<HmacSha1> {
        let mut mac = HmacSha1::new_from_slice(&self.key)
            .map_err(|e| AppError::internal(format!("Invalid signing key: {e}")))?;
        mac.update(value);
        Ok(mac)
    }
}

/// Big-endian bytes with leading zeros stripped.
fn int_to_bytes(n: u64) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[start..].to_vec()
}

fn bytes_to_int(bytes: &[u8]) -> Option<u64> {
    if bytes.len() > 8 {
        return None;
    }
    Some(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}
