// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request pipeline tests.
//!
//! These tests verify that:
//! 1. The bearer token is attached exactly when one is persisted
//! 2. A 401 from a protected endpoint clears storage, broadcasts and
//!    drives the session store to anonymous
//! 3. Other failures are categorised without touching the session

use driverxp_client::error::ClientError;
use driverxp_client::events::AuthEvent;
use driverxp_client::session::SessionPhase;
use driverxp_client::storage::MemoryStorage;
use driverxp_client::AppState;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

mod common;

use common::{seed_session, test_app, test_config, user_json, wait_for_state, StubBackend};

fn empty_bookings() -> serde_json::Value {
    json!({"status": "success", "results": 0, "data": {"bookings": []}})
}

#[tokio::test]
async fn test_bearer_attached_when_token_persisted() {
    let stub = StubBackend::start().await;
    stub.respond("GET", "/bookings/my-bookings", 200, empty_bookings());
    let storage = MemoryStorage::new();
    seed_session(&storage, "abc", user_json("1", "student"));
    let app = test_app(&stub.base_url, &storage);
    app.session.init();

    let bookings = app.bookings.my_bookings().await.unwrap();
    assert!(bookings.is_empty());

    let request = stub.last_request("GET", "/bookings/my-bookings").unwrap();
    assert_eq!(request.authorization.as_deref(), Some("Bearer abc"));
}

#[tokio::test]
async fn test_no_bearer_without_token() {
    let stub = StubBackend::start().await;
    stub.respond("GET", "/cars/available", 200, json!({"data": {"cars": []}}));
    let storage = MemoryStorage::new();
    let app = test_app(&stub.base_url, &storage);

    app.cars.available().await.unwrap();

    let request = stub.last_request("GET", "/cars/available").unwrap();
    assert_eq!(request.authorization, None);
}

#[tokio::test]
async fn test_protected_401_invalidates_session() {
    let stub = StubBackend::start().await;
    stub.respond(
        "GET",
        "/bookings/my-bookings",
        401,
        json!({"status": "fail", "message": "Token expired"}),
    );
    let storage = MemoryStorage::new();
    seed_session(&storage, "abc", user_json("1", "student"));
    let app = test_app(&stub.base_url, &storage);
    app.session.init();
    assert_eq!(app.session.phase(), SessionPhase::Authenticated);
    let mut events = app.events.subscribe();

    let err = app.bookings.my_bookings().await.unwrap_err();
    assert!(matches!(err, ClientError::SessionInvalidated));
    assert!(!err.is_local());

    // Storage is gone before the caller sees the error.
    assert!(storage.is_empty());
    assert_eq!(events.recv().await.unwrap(), AuthEvent::SessionInvalidated);

    wait_for_state(&app, |s| s.is_initialized && !s.is_authenticated).await;
    let state = app.session.snapshot();
    assert_eq!(state.phase(), SessionPhase::Anonymous);
    assert!(state.current_user.is_none());
    assert!(state.token.is_none());
}

#[tokio::test]
async fn test_401_on_forgot_password_does_not_invalidate() {
    let stub = StubBackend::start().await;
    stub.respond(
        "POST",
        "/auth/forgot-password",
        401,
        json!({"status": "fail", "message": "Not allowed"}),
    );
    let storage = MemoryStorage::new();
    seed_session(&storage, "abc", user_json("1", "student"));
    let app = test_app(&stub.base_url, &storage);
    app.session.init();
    let mut events = app.events.subscribe();

    let err = app.auth.forgot_password("a@x.com").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidCredentials(_)));
    assert!(!storage.is_empty());
    assert!(events.try_recv().is_err());
    assert_eq!(app.session.phase(), SessionPhase::Authenticated);
}

#[tokio::test]
async fn test_server_error_keeps_session() {
    let stub = StubBackend::start().await;
    stub.respond(
        "GET",
        "/bookings/my-bookings",
        500,
        json!({"status": "error", "message": "Internal server error"}),
    );
    let storage = MemoryStorage::new();
    seed_session(&storage, "abc", user_json("1", "student"));
    let app = test_app(&stub.base_url, &storage);
    app.session.init();

    let err = app.bookings.my_bookings().await.unwrap_err();
    match err {
        ClientError::Http { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Internal server error");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
    assert_eq!(storage.len(), 2);
    assert_eq!(app.session.phase(), SessionPhase::Authenticated);
}

#[tokio::test]
async fn test_bad_request_is_validation_error() {
    let stub = StubBackend::start().await;
    stub.respond(
        "PATCH",
        "/bookings/b1/cancel",
        400,
        json!({"status": "fail", "message": "Cannot cancel within 24 hours of the lesson"}),
    );
    let storage = MemoryStorage::new();
    seed_session(&storage, "abc", user_json("1", "student"));
    let app = test_app(&stub.base_url, &storage);
    app.session.init();

    let err = app.bookings.cancel("b1", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(
        err.user_message(),
        "Cannot cancel within 24 hours of the lesson"
    );
}

#[tokio::test]
async fn test_unparseable_success_body_is_malformed() {
    let stub = StubBackend::start().await;
    stub.respond(
        "GET",
        "/bookings/my-bookings",
        200,
        json!({"status": "success", "data": {"bookings": "nope"}}),
    );
    let storage = MemoryStorage::new();
    let app = test_app(&stub.base_url, &storage);

    let err = app.bookings.my_bookings().await.unwrap_err();
    assert!(matches!(err, ClientError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let storage = MemoryStorage::new();
    let app = test_app("http://127.0.0.1:1/api", &storage);
    app.session.init();

    let err = app.session.login("a@x.com", "pw").await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(err.user_message(), ClientError::REQUEST_FAILED);
    assert_eq!(app.session.phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let stub = StubBackend::start().await;
    stub.respond("GET", "/users/instructors", 200, json!({"data": {"instructors": []}}));
    stub.delay("GET", "/users/instructors", Duration::from_secs(2));

    let storage = MemoryStorage::new();
    let mut config = test_config(&stub.base_url);
    config.request_timeout = Duration::from_millis(200);
    let app = AppState::new(config, Arc::new(storage)).unwrap();

    let err = app.users.instructors().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}
