//! The per-request (or per-job) push context.

use std::sync::Arc;

use crate::tx::DeferredCalls;
use crate::user::PushUser;

use super::flags::{FlagGuard, FlagStack};

/// State owned by one logical call context: a web request or a background job.
///
/// Create one per request, pass it by reference to every publish call, and
/// drop it when the request ends. Contexts are never shared between
/// requests, so flags and queued emissions cannot leak across them.
#[derive(Default)]
pub struct PushContext {
    /// Socket.IO connection that originated the request, if any.
    connection_id: Option<String>,
    /// Authenticated user, if any.
    user: Option<Arc<dyn PushUser>>,
    /// "Suppress all push events" flag.
    suppress: FlagStack,
    /// "Don't skip self" flag.
    dont_skip_self: FlagStack,
    /// Emissions waiting for the enclosing transaction.
    deferred: DeferredCalls,
}

impl std::fmt::Debug for PushContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushContext")
            .field("connection_id", &self.connection_id)
            .field("user_id", &self.user.as_ref().map(|u| u.id()))
            .field("suppress", &self.suppress)
            .field("dont_skip_self", &self.dont_skip_self)
            .field("deferred", &self.deferred)
            .finish()
    }
}

impl PushContext {
    /// Context with no originating connection and no user (e.g. a background job).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the originating connection id.
    pub fn with_connection_id(mut self, connection_id: impl Into<String>) -> Self {
        self.connection_id = Some(connection_id.into());
        self
    }

    /// Read the originating connection id from request headers.
    ///
    /// Header names are compared case-insensitively; empty values are ignored.
    pub fn with_headers<'h, I>(mut self, headers: I, header_name: &str) -> Self
    where
        I: IntoIterator<Item = (&'h str, &'h str)>,
    {
        self.connection_id = headers
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(header_name))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        self
    }

    /// Attach the authenticated user.
    pub fn with_user(mut self, user: Arc<dyn PushUser>) -> Self {
        self.user = Some(user);
        self
    }

    /// Originating connection id.
    pub fn connection_id(&self) -> Option<&str> {
        self.connection_id.as_deref()
    }

    /// Authenticated user.
    pub fn user(&self) -> Option<&Arc<dyn PushUser>> {
        self.user.as_ref()
    }

    /// Whether push events are currently suppressed.
    pub fn is_suppressed(&self) -> bool {
        self.suppress.top()
    }

    /// Whether the originating connection should receive its own events by default.
    pub fn is_dont_skip_self(&self) -> bool {
        self.dont_skip_self.top()
    }

    /// Suppress every push event until the guard is dropped.
    pub fn suppress_push_events(&self) -> FlagGuard<'_> {
        self.suppress.push(true)
    }

    /// Set the suppression flag for a nested scope.
    pub fn scoped_suppression(&self, value: bool) -> FlagGuard<'_> {
        self.suppress.push(value)
    }

    /// Echo events back to the originating connection until the guard is dropped.
    pub fn dont_skip_self(&self) -> FlagGuard<'_> {
        self.dont_skip_self.push(true)
    }

    /// Set the "don't skip self" flag for a nested scope.
    pub fn scoped_dont_skip_self(&self, value: bool) -> FlagGuard<'_> {
        self.dont_skip_self.push(value)
    }

    /// Deferred calls of this context.
    pub fn deferred(&self) -> &DeferredCalls {
        &self.deferred
    }
}
