//! Current-user loader strategy.

use serde_json::{Map, Value};

use crate::context::PushContext;

/// An authenticated user as seen by the push relay.
pub trait PushUser: Send + Sync {
    /// Stable user identifier.
    fn id(&self) -> String;

    /// Email address, used as the display name when there is no username.
    fn email(&self) -> String;

    /// Display name.
    fn username(&self) -> Option<String> {
        None
    }

    /// Avatar image URL.
    fn avatar_url(&self) -> Option<String> {
        None
    }

    /// Rooms this user may join. `None` leaves room checks to the push server.
    fn allowed_push_rooms(&self) -> Option<Vec<String>> {
        None
    }
}

/// Result of loading the current user.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedUser {
    /// User id, `None` for guests.
    pub user_id: Option<String>,
    /// Info embedded in the push token.
    pub user_info: Map<String, Value>,
    /// Rooms embedded in the push token.
    pub allowed_rooms: Option<Vec<String>>,
}

impl LoadedUser {
    /// An anonymous visitor.
    pub fn guest() -> Self {
        let mut user_info = Map::new();
        user_info.insert("guest".to_string(), Value::Bool(true));
        Self {
            user_id: None,
            user_info,
            allowed_rooms: None,
        }
    }
}

/// Resolves who is making the current request.
///
/// One loader is registered per service at startup; see
/// [`PushServiceBuilder::user_loader`](crate::service::PushServiceBuilder::user_loader).
pub trait CurrentUserLoader: Send + Sync {
    /// Load the user of `ctx`.
    fn load(&self, ctx: &PushContext) -> LoadedUser;
}

/// Loader reading the user attached to the context.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultUserLoader;

impl CurrentUserLoader for DefaultUserLoader {
    fn load(&self, ctx: &PushContext) -> LoadedUser {
        let Some(user) = ctx.user() else {
            return LoadedUser::guest();
        };

        let mut user_info = Map::new();
        user_info.insert("guest".to_string(), Value::Bool(false));
        user_info.insert(
            "username".to_string(),
            Value::String(user.username().unwrap_or_else(|| user.email())),
        );
        if let Some(avatar_url) = user.avatar_url() {
            user_info.insert("avatar_url".to_string(), Value::String(avatar_url));
        }

        LoadedUser {
            user_id: Some(user.id()),
            user_info,
            allowed_rooms: user.allowed_push_rooms(),
        }
    }
}

impl<F> CurrentUserLoader for F
where
    F: Fn(&PushContext) -> LoadedUser + Send + Sync,
{
    fn load(&self, ctx: &PushContext) -> LoadedUser {
        self(ctx)
    }
}
