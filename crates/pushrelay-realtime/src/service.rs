//! The push service: one per process, shared by every request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use pushrelay_auth::{PushClaims, TokenCodec, UserEventNamer};
use pushrelay_core::config::PushConfig;
use pushrelay_core::error::AppError;
use pushrelay_core::result::AppResult;
use pushrelay_core::traits::PubSubBackend;

use crate::context::PushContext;
use crate::message::{EmitRequest, EventFormatter};
use crate::publisher::{EmitOutcome, Publisher};
use crate::user::{CurrentUserLoader, DefaultUserLoader};

/// What a page needs to open its push connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientBootstrap {
    /// Push token for the current user.
    pub token: String,
    /// Event name carrying messages addressed to this user only.
    pub user_event: Option<String>,
    /// Where the push server is reached.
    pub server_url: String,
}

/// Process-wide push relay.
///
/// Holds the host identifier, the shared pub/sub client, the token codec
/// and the registered current-user loader. Build it once at startup and
/// share it as `Arc<PushService>`.
pub struct PushService {
    config: PushConfig,
    publisher: Publisher,
    codec: Option<TokenCodec>,
    loader: Arc<dyn CurrentUserLoader>,
}

impl std::fmt::Debug for PushService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushService")
            .field("channel", &self.config.channel)
            .field("host_id", &self.host_id())
            .field("publisher", &self.publisher)
            .finish_non_exhaustive()
    }
}

impl PushService {
    /// Start building a service from configuration.
    pub fn builder(config: PushConfig) -> PushServiceBuilder {
        PushServiceBuilder {
            config,
            backend: None,
            loader: None,
            host_id: None,
        }
    }

    /// Connect to the configured Redis server with the default user loader.
    #[cfg(feature = "redis-pubsub")]
    pub async fn connect(config: PushConfig) -> AppResult<Self> {
        let backend = crate::bridge::RedisPubSub::connect(&config.redis_url).await?;
        Self::builder(config).backend(Arc::new(backend)).build()
    }

    /// Configuration the service was built with.
    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    /// Random identifier of this process, stamped on every event.
    pub fn host_id(&self) -> &str {
        self.publisher.formatter().host_id()
    }

    /// The underlying publisher.
    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Publish an event; see [`Publisher::publish`].
    pub async fn publish(&self, ctx: &PushContext, request: EmitRequest) -> AppResult<EmitOutcome> {
        self.publisher.publish(ctx, request).await
    }

    /// Publish an event to one user; see [`Publisher::publish_to_user`].
    pub async fn publish_to_user(
        &self,
        ctx: &PushContext,
        user_id: &str,
        request: EmitRequest,
    ) -> AppResult<EmitOutcome> {
        self.publisher.publish_to_user(ctx, user_id, request).await
    }

    /// Event name targeting one user.
    pub fn user_event_name(&self, user_id: &str) -> AppResult<String> {
        self.publisher.user_event_name(user_id)
    }

    /// Run `callback` once the context's outermost transaction commits,
    /// or immediately outside a transaction.
    pub async fn after_commit<F>(&self, ctx: &PushContext, label: &str, callback: F) -> AppResult<()>
    where
        F: Future<Output = AppResult<()>> + Send + 'static,
    {
        ctx.deferred().call(label, callback).await.map(|_| ())
    }

    /// Issue a push token.
    pub fn issue_token(
        &self,
        user_info: Map<String, Value>,
        allowed_rooms: Option<Vec<String>>,
    ) -> AppResult<String> {
        self.codec()?.issue(user_info, allowed_rooms)
    }

    /// Verify a push token against the configured maximum age.
    pub fn verify_token(&self, token: &str) -> AppResult<PushClaims> {
        self.verify_token_with_max_age(
            token,
            Duration::from_secs(self.config.token_max_age_seconds),
        )
    }

    /// Verify a push token against an explicit maximum age.
    pub fn verify_token_with_max_age(&self, token: &str, max_age: Duration) -> AppResult<PushClaims> {
        self.codec()?.verify(token, max_age)
    }

    /// Token, user event and server URL for the current request.
    ///
    /// Returns `None` when no secret is configured, since no token can be
    /// issued then.
    pub fn bootstrap(&self, ctx: &PushContext) -> AppResult<Option<ClientBootstrap>> {
        if self.codec.is_none() {
            return Ok(None);
        }

        let loaded = self.loader.load(ctx);
        let token = self.issue_token(loaded.user_info, loaded.allowed_rooms)?;
        let user_event = loaded
            .user_id
            .as_deref()
            .map(|id| self.user_event_name(id))
            .transpose()?;

        Ok(Some(ClientBootstrap {
            token,
            user_event,
            server_url: self.config.server_url(),
        }))
    }

    fn codec(&self) -> AppResult<&TokenCodec> {
        self.codec.as_ref().ok_or_else(|| {
            AppError::configuration("A secret must be configured to use push tokens")
        })
    }
}

/// Builder for [`PushService`].
pub struct PushServiceBuilder {
    config: PushConfig,
    backend: Option<Arc<dyn PubSubBackend>>,
    loader: Option<Arc<dyn CurrentUserLoader>>,
    host_id: Option<String>,
}

impl PushServiceBuilder {
    /// Pub/sub backend to publish on.
    pub fn backend(mut self, backend: Arc<dyn PubSubBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Register the current-user loader. The last registration wins.
    pub fn user_loader(mut self, loader: Arc<dyn CurrentUserLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Fix the host identifier instead of generating one.
    pub fn host_id(mut self, host_id: impl Into<String>) -> Self {
        self.host_id = Some(host_id.into());
        self
    }

    /// Build the service.
    pub fn build(self) -> AppResult<PushService> {
        let backend = self
            .backend
            .ok_or_else(|| AppError::configuration("A pub/sub backend is required"))?;
        let secret = self.config.secret();
        let codec = secret.map(TokenCodec::new).transpose()?;
        let host_id = self
            .host_id
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

        info!(
            backend = backend.backend_name(),
            channel = %self.config.channel,
            host_id = %host_id,
            tokens = codec.is_some(),
            "Push service ready"
        );

        let publisher = Publisher::new(
            backend,
            self.config.channel.clone(),
            EventFormatter::new(host_id, self.config.prefix_event_with_room),
            UserEventNamer::new(secret, self.config.user_event_hash),
        );

        Ok(PushService {
            publisher,
            codec,
            loader: self.loader.unwrap_or_else(|| Arc::new(DefaultUserLoader)),
            config: self.config,
        })
    }
}
