//! Per-request state threaded through publish calls.

pub mod flags;
pub mod request;

pub use flags::{FlagGuard, FlagStack};
pub use request::PushContext;
