//! Claims carried by a push token.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity and room membership embedded in a push token.
///
/// On the wire the claims are the two-element array
/// `[user_info, allowed_rooms]`, which is what the push server unpacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ClaimsTuple", into = "ClaimsTuple")]
pub struct PushClaims {
    /// Free-form user description (`guest`, `username`, ...).
    pub user_info: Map<String, Value>,
    /// Rooms the bearer may join. `None` leaves the decision to the server.
    pub allowed_rooms: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize)]
struct ClaimsTuple(Option<Map<String, Value>>, Option<Vec<String>>);

impl From<ClaimsTuple> for PushClaims {
    fn from(ClaimsTuple(user_info, allowed_rooms): ClaimsTuple) -> Self {
        Self {
            user_info: user_info.unwrap_or_default(),
            allowed_rooms,
        }
    }
}

impl From<PushClaims> for ClaimsTuple {
    fn from(claims: PushClaims) -> Self {
        ClaimsTuple(Some(claims.user_info), claims.allowed_rooms)
    }
}

impl PushClaims {
    /// Create claims from user info and an optional room list.
    pub fn new(user_info: Map<String, Value>, allowed_rooms: Option<Vec<String>>) -> Self {
        Self {
            user_info,
            allowed_rooms,
        }
    }

    /// Whether the claims describe an anonymous visitor.
    pub fn is_guest(&self) -> bool {
        self.user_info
            .get("guest")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }
}
