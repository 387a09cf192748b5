//! Transaction boundaries and the calls deferred until they commit.

pub mod deferred;
pub mod scope;

pub use deferred::DeferredCalls;
pub use scope::{TransactionScope, in_transaction};
