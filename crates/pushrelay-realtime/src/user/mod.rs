//! Current-user resolution for client bootstrap.

pub mod loader;

pub use loader::{CurrentUserLoader, DefaultUserLoader, LoadedUser, PushUser};
