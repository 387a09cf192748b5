//! Push events and their pub/sub wire format.

pub mod event;
pub mod formatter;

pub use event::{EmitRequest, PushEvent};
pub use formatter::{EmitRecord, EventFormatter};
