//! Integration tests for client bootstrap and push tokens.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};

use pushrelay_core::config::PushConfig;
use pushrelay_realtime::{EmitRequest, PushContext};

#[tokio::test]
async fn test_authenticated_bootstrap() {
    let mut relay = helpers::TestRelay::new().await;
    let ctx = PushContext::new().with_user(Arc::new(helpers::TestUser {
        id: 7,
        rooms: Some(vec!["project-1".to_string(), "project-2".to_string()]),
    }));

    let boot = relay.service.bootstrap(&ctx).unwrap().expect("a secret is configured");
    let claims = relay.service.verify_token(&boot.token).unwrap();

    assert_eq!(
        Value::Object(claims.user_info),
        json!({
            "guest": false,
            "username": "user7@example.com",
            "avatar_url": "https://cdn.example.com/avatars/7.png"
        })
    );
    assert_eq!(
        claims.allowed_rooms,
        Some(vec!["project-1".to_string(), "project-2".to_string()])
    );

    // The announced user event is the one per-user emissions are sent under.
    relay
        .service
        .publish_to_user(&ctx, "7", EmitRequest::default())
        .await
        .unwrap();
    let record = relay.try_next().expect("a record");
    assert_eq!(Some(record.event), boot.user_event);
}

#[tokio::test]
async fn test_guest_bootstrap() {
    let relay = helpers::TestRelay::new().await;
    let boot = relay
        .service
        .bootstrap(&PushContext::new())
        .unwrap()
        .expect("a secret is configured");

    assert!(boot.user_event.is_none());
    let claims = relay.service.verify_token(&boot.token).unwrap();
    assert!(claims.is_guest());
    assert!(claims.allowed_rooms.is_none());
}

#[tokio::test]
async fn test_no_secret_disables_tokens() {
    let relay = helpers::TestRelay::with_config(PushConfig::default()).await;

    assert!(relay.service.bootstrap(&PushContext::new()).unwrap().is_none());
    assert!(relay.service.verify_token("a.b.c").unwrap_err().is_configuration());
}

#[tokio::test]
async fn test_token_from_other_secret_is_invalid() {
    let relay = helpers::TestRelay::new().await;
    let other = helpers::TestRelay::with_config(PushConfig {
        secret: Some("another-secret".to_string()),
        ..Default::default()
    })
    .await;

    let boot = other.service.bootstrap(&PushContext::new()).unwrap().unwrap();
    let err = relay
        .service
        .verify_token_with_max_age(&boot.token, Duration::from_secs(60))
        .unwrap_err();
    assert!(err.is_token_invalid());
}

#[tokio::test]
async fn test_bootstrap_server_url() {
    let relay = helpers::TestRelay::with_config(PushConfig {
        secret: Some("s".to_string()),
        server_name: Some("app.example.com:443".to_string()),
        server_port: 9000,
        server_secured: true,
        ..Default::default()
    })
    .await;

    let boot = relay.service.bootstrap(&PushContext::new()).unwrap().unwrap();
    assert_eq!(boot.server_url, "https://app.example.com:9000");
}
