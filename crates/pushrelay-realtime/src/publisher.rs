//! Publishing push events to the pub/sub channel.

use std::sync::Arc;

use tracing::debug;

use pushrelay_auth::UserEventNamer;
use pushrelay_core::result::AppResult;
use pushrelay_core::traits::PubSubBackend;

use crate::context::PushContext;
use crate::message::{EmitRequest, EventFormatter};

/// What happened to a publish call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// Push events are suppressed in this context; nothing was sent.
    Suppressed,
    /// Queued until the enclosing transaction commits.
    Deferred,
    /// Written to the channel.
    Published {
        /// Subscribers reached, as reported by the backend.
        receivers: u64,
    },
}

/// Writes formatted events to the configured channel.
#[derive(Debug, Clone)]
pub struct Publisher {
    backend: Arc<dyn PubSubBackend>,
    channel: String,
    formatter: EventFormatter,
    namer: UserEventNamer,
}

impl Publisher {
    /// Create a publisher on `channel`.
    pub fn new(
        backend: Arc<dyn PubSubBackend>,
        channel: impl Into<String>,
        formatter: EventFormatter,
        namer: UserEventNamer,
    ) -> Self {
        Self {
            backend,
            channel: channel.into(),
            formatter,
            namer,
        }
    }

    /// Channel events are published on.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Formatter used for every event.
    pub fn formatter(&self) -> &EventFormatter {
        &self.formatter
    }

    /// Publish an event.
    ///
    /// Suppression, the room prefix and the self-echo policy are resolved
    /// from `ctx` at call time. Inside a transaction scope the write is
    /// queued until the outermost scope commits.
    pub async fn publish(&self, ctx: &PushContext, request: EmitRequest) -> AppResult<EmitOutcome> {
        if ctx.is_suppressed() {
            debug!(event = %request.event, "Push event suppressed");
            return Ok(EmitOutcome::Suppressed);
        }

        let skip_self = request.skip_self.unwrap_or(!ctx.is_dont_skip_self());
        let skip_connection_id = if skip_self {
            ctx.connection_id().map(str::to_string)
        } else {
            None
        };

        let event = self.formatter.resolve(request, skip_connection_id);
        debug!(
            event = %event.event_name,
            namespace = ?event.namespace,
            room = ?event.room,
            skip_sid = ?event.skip_connection_id,
            data = %event.data,
            "Push event"
        );
        let payload = self.formatter.encode(&event)?;

        let backend = self.backend.clone();
        let channel = self.channel.clone();
        if ctx.deferred().is_active() {
            ctx.deferred().enqueue(event.event_name, async move {
                backend.publish(&channel, &payload).await.map(|_| ())
            })?;
            return Ok(EmitOutcome::Deferred);
        }

        let receivers = backend.publish(&channel, &payload).await?;
        Ok(EmitOutcome::Published { receivers })
    }

    /// Publish an event to every connection of one user.
    ///
    /// The event name is derived from the user id and the shared secret;
    /// fails with a configuration error when no secret is set.
    pub async fn publish_to_user(
        &self,
        ctx: &PushContext,
        user_id: &str,
        mut request: EmitRequest,
    ) -> AppResult<EmitOutcome> {
        request.event = self.namer.event_name(user_id)?;
        self.publish(ctx, request).await
    }

    /// Event name targeting one user.
    pub fn user_event_name(&self, user_id: &str) -> AppResult<String> {
        self.namer.event_name(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::MemoryPubSub;
    use crate::message::formatter::EmitRecord;
    use crate::tx::TransactionScope;
    use pushrelay_core::config::UserEventHash;
    use serde_json::json;
    use tokio::sync::broadcast::Receiver;
    use tokio::sync::broadcast::error::TryRecvError;

    async fn setup(secret: Option<&str>) -> (Publisher, Receiver<Vec<u8>>) {
        let pubsub = Arc::new(MemoryPubSub::default());
        let rx = pubsub.subscribe("socketio").await;
        let publisher = Publisher::new(
            pubsub,
            "socketio",
            EventFormatter::new("host-1", true),
            UserEventNamer::new(secret, UserEventHash::Sha1Concat),
        );
        (publisher, rx)
    }

    fn next(rx: &mut Receiver<Vec<u8>>) -> EmitRecord {
        EmitRecord::decode(&rx.try_recv().expect("a message")).unwrap()
    }

    #[tokio::test]
    async fn test_publish_immediately() {
        let (publisher, mut rx) = setup(None).await;
        let outcome = publisher
            .publish(
                &PushContext::new(),
                EmitRequest::new("msg").data(json!({"text": "hi"})).room("lobby"),
            )
            .await
            .unwrap();
        assert_eq!(outcome, EmitOutcome::Published { receivers: 1 });

        let record = next(&mut rx);
        assert_eq!(record.event, "lobby:msg");
        assert_eq!(record.data, json!({"text": "hi"}));
        assert_eq!(record.host_id, "host-1");
    }

    #[tokio::test]
    async fn test_suppressed() {
        let (publisher, mut rx) = setup(None).await;
        let ctx = PushContext::new().with_connection_id("sid-1");
        let _guard = ctx.suppress_push_events();
        for request in [
            EmitRequest::new("a"),
            EmitRequest::new("b").room("r").skip_self(false),
        ] {
            let outcome = publisher.publish(&ctx, request).await.unwrap();
            assert_eq!(outcome, EmitOutcome::Suppressed);
        }
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_skip_self_defaults() {
        let (publisher, mut rx) = setup(None).await;
        let ctx = PushContext::new().with_connection_id("sid-1");

        publisher.publish(&ctx, EmitRequest::new("a")).await.unwrap();
        assert_eq!(next(&mut rx).skip_sid.as_deref(), Some("sid-1"));

        publisher
            .publish(&ctx, EmitRequest::new("b").skip_self(false))
            .await
            .unwrap();
        assert_eq!(next(&mut rx).skip_sid, None);

        {
            let _echo = ctx.dont_skip_self();
            publisher.publish(&ctx, EmitRequest::new("c")).await.unwrap();
            assert_eq!(next(&mut rx).skip_sid, None);

            publisher
                .publish(&ctx, EmitRequest::new("d").skip_self(true))
                .await
                .unwrap();
            assert_eq!(next(&mut rx).skip_sid.as_deref(), Some("sid-1"));
        }

        publisher
            .publish(&PushContext::new(), EmitRequest::new("e"))
            .await
            .unwrap();
        assert_eq!(next(&mut rx).skip_sid, None);
    }

    #[tokio::test]
    async fn test_deferred_until_commit() {
        let (publisher, mut rx) = setup(None).await;
        let ctx = PushContext::new();
        let scope = TransactionScope::begin(&ctx);
        let outcome = publisher.publish(&ctx, EmitRequest::new("a")).await.unwrap();
        assert_eq!(outcome, EmitOutcome::Deferred);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        scope.commit().await.unwrap();
        assert_eq!(next(&mut rx).event, "a");
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_publish_to_user() {
        let (publisher, mut rx) = setup(Some("s3cret")).await;
        publisher
            .publish_to_user(&PushContext::new(), "42", EmitRequest::new("ignored"))
            .await
            .unwrap();
        assert_eq!(
            next(&mut rx).event,
            "1895d65571b046e0e2fc206ed3e7684c5e85d0c9"
        );
    }

    #[tokio::test]
    async fn test_publish_to_user_without_secret() {
        let (publisher, mut rx) = setup(None).await;
        let err = publisher
            .publish_to_user(&PushContext::new(), "42", EmitRequest::default())
            .await
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
