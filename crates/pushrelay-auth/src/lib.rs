//! # pushrelay-auth
//!
//! Credentials shared with the push server:
//!
//! - `token`: signed, timestamped push tokens carrying user info and rooms
//! - `user_event`: per-user event names derived from the shared secret

pub mod token;
pub mod user_event;

pub use token::{PushClaims, TokenCodec};
pub use user_event::UserEventNamer;
