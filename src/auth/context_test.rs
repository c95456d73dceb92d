use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::*;
use crate::mock::{MockTransport, client, seed_session};
use crate::net::{Method, TOKEN_REFRESH_PATH};
use crate::services::accounts::{LOGIN_PATH, LOGOUT_PATH};
use crate::session::{ACCESS_TOKEN_KEY, FileStore, SessionStore, USER_KEY};

fn context(mock: &Arc<MockTransport>) -> (AuthContext, Arc<crate::session::MemoryStore>) {
    let (client, store) = client(mock);
    (AuthContext::new(Arc::new(client)), store)
}

// =============================================================================
// restore
// =============================================================================

#[test]
fn starts_loading() {
    let mock = MockTransport::new();
    let (auth, _store) = context(&mock);
    assert_eq!(auth.state().status, AuthStatus::Loading);
}

#[test]
fn restore_with_token_and_user_is_authenticated() {
    let mock = MockTransport::new();
    let (auth, store) = context(&mock);
    seed_session(store.as_ref(), "T1", "R1");

    let state = auth.restore_session();

    assert_eq!(state.status, AuthStatus::Authenticated);
    assert_eq!(state.user.unwrap().email, "a@b.com");
}

#[test]
fn restore_without_user_is_unauthenticated() {
    let mock = MockTransport::new();
    let (auth, store) = context(&mock);
    store.set(ACCESS_TOKEN_KEY, "T1").unwrap();

    assert_eq!(auth.restore_session().status, AuthStatus::Unauthenticated);
}

#[test]
fn restore_with_user_but_no_access_token_is_unauthenticated() {
    let mock = MockTransport::new();
    let (auth, store) = context(&mock);
    seed_session(store.as_ref(), "T1", "R1");
    store.remove(ACCESS_TOKEN_KEY).unwrap();

    assert_eq!(auth.restore_session().status, AuthStatus::Unauthenticated);
}

#[test]
fn restore_with_corrupt_user_is_unauthenticated() {
    let mock = MockTransport::new();
    let (auth, store) = context(&mock);
    seed_session(store.as_ref(), "T1", "R1");
    store.set(USER_KEY, "{not json").unwrap();

    assert_eq!(auth.restore_session().status, AuthStatus::Unauthenticated);
}

// =============================================================================
// login / register
// =============================================================================

#[tokio::test]
async fn login_persists_exact_session() {
    let mock = MockTransport::new();
    mock.respond(
        Method::Post,
        LOGIN_PATH,
        200,
        json!({ "access": "T1", "refresh": "R1", "user": { "email": "a@b.com" } }),
    );
    let (auth, store) = context(&mock);
    auth.restore_session();

    let response = auth.login(&Credentials::new("a@b.com", "secret123")).await.unwrap();

    assert_eq!(response.access, "T1");
    assert_eq!(mock.last_request().json_body(), Some(&json!({ "email": "a@b.com", "password": "secret123" })));
    assert_eq!(auth.state().status, AuthStatus::Authenticated);
    assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("T1"));
    assert_eq!(store.get(crate::session::REFRESH_TOKEN_KEY).as_deref(), Some("R1"));
    assert_eq!(store.get(USER_KEY).as_deref(), Some(r#"{"email":"a@b.com"}"#));
}

#[tokio::test]
async fn failed_login_leaves_state_alone() {
    let mock = MockTransport::new();
    mock.respond(Method::Post, LOGIN_PATH, 401, json!({ "detail": "No active account found" }));
    let (auth, store) = context(&mock);
    auth.restore_session();

    let err = auth.login(&Credentials::new("a@b.com", "wrong-pass")).await.unwrap_err();

    assert_eq!(err.detail().as_deref(), Some("No active account found"));
    assert_eq!(auth.state().status, AuthStatus::Unauthenticated);
    assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
    assert!(mock.requests_to(TOKEN_REFRESH_PATH).is_empty());
}

#[tokio::test]
async fn invalid_login_form_never_hits_network() {
    let mock = MockTransport::new();
    let (auth, _store) = context(&mock);

    let err = auth.login(&Credentials::new("", "")).await.unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn register_does_not_change_state() {
    let mock = MockTransport::new();
    mock.respond(Method::Post, "/accounts/register/", 201, json!({ "message": "Check your email" }));
    let (auth, store) = context(&mock);
    auth.restore_session();
    let form = Registration {
        full_name: "Ada".into(),
        email: "ada@example.com".into(),
        password: "secret123".into(),
        confirm_password: "secret123".into(),
        education: "BSc".into(),
        preferred_track: "Data".into(),
        ..Registration::default()
    };

    let reply = auth.register(&form).await.unwrap();

    assert_eq!(reply["message"], "Check your email");
    assert_eq!(auth.state().status, AuthStatus::Unauthenticated);
    assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
}

// =============================================================================
// logout
// =============================================================================

#[tokio::test]
async fn logout_notifies_server_and_clears() {
    let mock = MockTransport::new();
    mock.respond(Method::Post, LOGOUT_PATH, 205, json!({}));
    let (auth, store) = context(&mock);
    seed_session(store.as_ref(), "T1", "R1");
    auth.restore_session();

    auth.logout().await;

    assert_eq!(mock.last_request().json_body(), Some(&json!({ "refresh": "R1" })));
    assert_eq!(Session::load(store.as_ref()), Session::default());
    assert_eq!(auth.state(), AuthState::unauthenticated());
}

#[tokio::test]
async fn logout_clears_even_when_server_fails() {
    let mock = MockTransport::new();
    mock.respond(Method::Post, LOGOUT_PATH, 500, json!({ "detail": "boom" }));
    let (auth, store) = context(&mock);
    seed_session(store.as_ref(), "T1", "R1");
    auth.restore_session();

    auth.logout().await;

    assert_eq!(Session::load(store.as_ref()), Session::default());
    assert_eq!(auth.state().status, AuthStatus::Unauthenticated);
}

#[tokio::test]
async fn logout_clears_even_on_timeout() {
    let mock = MockTransport::new();
    mock.fail(Method::Post, LOGOUT_PATH, ApiError::Timeout);
    let (auth, store) = context(&mock);
    seed_session(store.as_ref(), "T1", "R1");

    auth.logout().await;

    assert_eq!(Session::load(store.as_ref()), Session::default());
}

#[tokio::test]
async fn logout_without_refresh_token_skips_server() {
    let mock = MockTransport::new();
    let (auth, store) = context(&mock);
    store.set(ACCESS_TOKEN_KEY, "T1").unwrap();

    auth.logout().await;

    assert!(mock.requests().is_empty());
    assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
}

// =============================================================================
// update_user
// =============================================================================

#[test]
fn update_user_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let mock = MockTransport::new();

    let store = Arc::new(FileStore::open(&path).unwrap());
    let auth = AuthContext::new(Arc::new(crate::net::HttpClient::with_transport(mock.clone(), store.clone())));
    seed_session(store.as_ref(), "T1", "R1");
    auth.restore_session();

    let mut user = UserSummary::new("a@b.com");
    user.full_name = Some("Ada Lovelace".into());
    user.extra.insert("preferred_track".into(), json!("Backend"));
    auth.update_user(user.clone()).unwrap();
    assert_eq!(auth.state().user.as_ref(), Some(&user));
    drop(auth);

    let reopened = Arc::new(FileStore::open(&path).unwrap());
    let reloaded = AuthContext::new(Arc::new(crate::net::HttpClient::with_transport(mock, reopened.clone())));
    let state = reloaded.restore_session();
    assert_eq!(state.user, Some(user));
    assert_eq!(reopened.get(ACCESS_TOKEN_KEY).as_deref(), Some("T1"));
}

// =============================================================================
// session events
// =============================================================================

#[test]
fn expired_event_logs_out_and_refreshed_is_ignored() {
    let mock = MockTransport::new();
    let (auth, store) = context(&mock);
    seed_session(store.as_ref(), "T1", "R1");
    auth.restore_session();

    auth.apply_event(SessionEvent::Refreshed);
    assert_eq!(auth.state().status, AuthStatus::Authenticated);

    auth.apply_event(SessionEvent::Expired);
    assert_eq!(auth.state(), AuthState::unauthenticated());
}

#[tokio::test]
async fn watcher_follows_interceptor_expiry() {
    let mock = MockTransport::new();
    mock.respond(Method::Get, "/jobs/", 401, json!({}))
        .respond(Method::Post, TOKEN_REFRESH_PATH, 401, json!({ "detail": "Token is blacklisted" }));
    let (auth, store) = context(&mock);
    seed_session(store.as_ref(), "T1", "R1");
    auth.restore_session();
    auth.watch_session();
    let mut states = auth.subscribe();

    let err = auth.client().get::<serde_json::Value>("/jobs/").await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired { .. }));

    let signed_out = states.wait_for(|s| s.status == AuthStatus::Unauthenticated);
    let state = tokio::time::timeout(Duration::from_secs(1), signed_out)
        .await
        .unwrap()
        .unwrap()
        .clone();
    assert_eq!(state.user, None);
    auth.teardown();
}
