//! Integration tests for publishing and transaction-deferred emission.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use pushrelay_core::config::PushConfig;
use pushrelay_core::error::AppError;
use pushrelay_core::result::AppResult;
use pushrelay_core::traits::PubSubBackend;
use pushrelay_realtime::{
    EmitOutcome, EmitRequest, PushContext, PushService, TransactionScope, in_transaction,
};

#[tokio::test]
async fn test_publish_outside_transaction() {
    let mut relay = helpers::TestRelay::new().await;
    let ctx = PushContext::new();

    let outcome = relay
        .service
        .publish(&ctx, EmitRequest::new("created").data(helpers::payload(1)))
        .await
        .unwrap();

    assert_eq!(outcome, EmitOutcome::Published { receivers: 1 });
    let records = relay.drain();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].method, "emit");
    assert_eq!(records[0].event, "created");
    assert_eq!(records[0].namespace, "/");
    assert_eq!(records[0].host_id, relay.service.host_id());
}

#[tokio::test]
async fn test_commit_publishes_after_commit() {
    let mut relay = helpers::TestRelay::new().await;
    let ctx = PushContext::new();

    let scope = TransactionScope::begin(&ctx);
    let outcome = relay
        .service
        .publish(&ctx, EmitRequest::new("msg").room("lobby"))
        .await
        .unwrap();
    assert_eq!(outcome, EmitOutcome::Deferred);
    assert!(relay.try_next().is_none());

    scope.commit().await.unwrap();
    let records = relay.drain();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].event, "lobby:msg");
    assert_eq!(records[0].room.as_deref(), Some("lobby"));
}

#[tokio::test]
async fn test_rollback_publishes_nothing() {
    let mut relay = helpers::TestRelay::new().await;
    let ctx = PushContext::new();
    let service = relay.service.clone();

    let result: Result<(), AppError> = in_transaction(&ctx, async {
        service.publish(&ctx, EmitRequest::new("a")).await?;
        service.publish(&ctx, EmitRequest::new("b")).await?;
        Err(AppError::internal("unique constraint violated"))
    })
    .await;

    assert!(result.is_err());
    assert!(relay.drain().is_empty());

    // The context is usable again after the rollback.
    service.publish(&ctx, EmitRequest::new("c")).await.unwrap();
    assert_eq!(relay.drain().len(), 1);
}

#[tokio::test]
async fn test_nested_scopes_flush_on_outermost_commit_in_order() {
    let mut relay = helpers::TestRelay::new().await;
    let ctx = PushContext::new();
    let service = relay.service.clone();

    let outer = TransactionScope::begin(&ctx);
    service.publish(&ctx, EmitRequest::new("first")).await.unwrap();
    {
        let inner = TransactionScope::begin(&ctx);
        service.publish(&ctx, EmitRequest::new("second")).await.unwrap();
        inner.commit().await.unwrap();
    }
    assert!(relay.try_next().is_none());
    service.publish(&ctx, EmitRequest::new("third")).await.unwrap();

    outer.commit().await.unwrap();
    let events: Vec<String> = relay.drain().into_iter().map(|r| r.event).collect();
    assert_eq!(events, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_suppression_is_scoped_to_context() {
    let mut relay = helpers::TestRelay::new().await;
    let quiet = PushContext::new();
    let loud = PushContext::new();
    let service = relay.service.clone();

    let _guard = quiet.suppress_push_events();
    let (a, b) = tokio::join!(
        service.publish(&quiet, EmitRequest::new("quiet").room("r").skip_self(false)),
        service.publish(&loud, EmitRequest::new("loud")),
    );

    assert_eq!(a.unwrap(), EmitOutcome::Suppressed);
    assert!(matches!(b.unwrap(), EmitOutcome::Published { .. }));
    let events: Vec<String> = relay.drain().into_iter().map(|r| r.event).collect();
    assert_eq!(events, vec!["loud"]);
}

#[tokio::test]
async fn test_skip_self_uses_request_header() {
    let mut relay = helpers::TestRelay::new().await;
    let header = relay.service.config().connection_id_header.clone();
    let ctx = PushContext::new().with_headers([("X-SocketIO-SID", "sid-42")], &header);

    relay
        .service
        .publish(&ctx, EmitRequest::new("echoed"))
        .await
        .unwrap();
    relay
        .service
        .publish(&ctx, EmitRequest::new("everyone").skip_self(false))
        .await
        .unwrap();

    let records = relay.drain();
    assert_eq!(records[0].skip_sid.as_deref(), Some("sid-42"));
    assert_eq!(records[1].skip_sid, None);
}

#[tokio::test]
async fn test_publish_to_user() {
    let mut relay = helpers::TestRelay::new().await;
    let ctx = PushContext::new();

    relay
        .service
        .publish_to_user(&ctx, "7", EmitRequest::default().data(helpers::payload(7)))
        .await
        .unwrap();
    relay
        .service
        .publish_to_user(&ctx, "8", EmitRequest::default())
        .await
        .unwrap();

    let records = relay.drain();
    assert_eq!(records[0].event, relay.service.user_event_name("7").unwrap());
    assert_eq!(records[0].data, helpers::payload(7));
    assert_ne!(records[0].event, records[1].event);
}

#[tokio::test]
async fn test_publish_to_user_requires_secret() {
    let mut relay = helpers::TestRelay::with_config(PushConfig::default()).await;
    let err = relay
        .service
        .publish_to_user(&PushContext::new(), "7", EmitRequest::default())
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert!(relay.drain().is_empty());
}

#[tokio::test]
async fn test_failing_callback_does_not_block_other_emissions() {
    let mut relay = helpers::TestRelay::new().await;
    let ctx = PushContext::new();
    let service = relay.service.clone();

    let scope = TransactionScope::begin(&ctx);
    service
        .after_commit(&ctx, "reindex", async { Err(AppError::internal("search index down")) })
        .await
        .unwrap();
    service.publish(&ctx, EmitRequest::new("saved")).await.unwrap();

    let err = scope.commit().await.unwrap_err();
    assert_eq!(err.message, "search index down");
    let events: Vec<String> = relay.drain().into_iter().map(|r| r.event).collect();
    assert_eq!(events, vec!["saved"]);
}

#[tokio::test]
async fn test_after_commit_runs_immediately_outside_transaction() {
    let relay = helpers::TestRelay::new().await;
    let ran = Arc::new(AtomicBool::new(false));
    let flag = ran.clone();

    relay
        .service
        .after_commit(&PushContext::new(), "mark", async move {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        })
        .await
        .unwrap();

    assert!(ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_transport_errors_propagate() {
    let service = PushService::builder(PushConfig::default())
        .backend(Arc::new(FailingBackend))
        .build()
        .unwrap();

    let err = service
        .publish(&PushContext::new(), EmitRequest::new("lost"))
        .await
        .unwrap_err();
    assert!(err.is_transport());
}

/// Backend whose every write fails
#[derive(Debug)]
struct FailingBackend;

#[async_trait]
impl PubSubBackend for FailingBackend {
    async fn publish(&self, channel: &str, _payload: &[u8]) -> AppResult<u64> {
        Err(AppError::transport(format!("{channel}: connection refused")))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}
