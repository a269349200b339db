//! Registration, login, and session gate behavior.

use std::sync::Arc;

use salvo::http::StatusCode;
use serde_json::json;

use chronos_test::component::store::DataStore;
use chronos_test::component::store::memory::MemoryStore;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn registration_creates_a_default_calendar() {
    let service = create_test_service();

    let user = register(&service, "alice", None).await;

    assert_eq!(user["login"], "alice");
    assert_eq!(user["emailConfirmed"], false);
    assert_eq!(
        user["calendars"].as_array().map(Vec::len),
        Some(1),
        "exactly one calendar is created at registration"
    );
    assert!(
        user.get("password_hash").is_none() && user.get("passwordHash").is_none(),
        "the credential hash never leaves the server"
    );
}

#[test_log::test(tokio::test)]
async fn short_login_is_rejected_with_the_legacy_envelope() {
    let service = create_test_service();

    let body = TestRequest::post("/api/auth/register")
        .json_body(&json!({
            "login": "ab",
            "username": "ab person",
            "email": "ab@example.com",
            "password": TEST_PASSWORD,
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .body_json();

    assert!(body["error"].is_string(), "field errors use the error key");
    assert!(body.get("success").is_none());
}

#[test_log::test(tokio::test)]
async fn malformed_email_is_rejected() {
    let service = create_test_service();

    TestRequest::post("/api/auth/register")
        .json_body(&json!({
            "login": "carol",
            "username": "carol person",
            "email": "not-an-email",
            "password": TEST_PASSWORD,
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn unsupported_region_is_rejected() {
    let service = create_test_service();

    let body = TestRequest::post("/api/auth/register")
        .json_body(&json!({
            "login": "dave",
            "username": "dave person",
            "email": "dave@example.com",
            "password": TEST_PASSWORD,
            "region": "atlantis",
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .body_json();

    assert_eq!(body["message"], "Country \"atlantis\" is not supported");
}

#[test_log::test(tokio::test)]
async fn duplicate_email_is_a_conflict() {
    let service = create_test_service();
    register(&service, "alice", None).await;

    let body = TestRequest::post("/api/auth/register")
        .json_body(&json!({
            "login": "alice2",
            "username": "other person",
            "email": "alice@example.com",
            "password": TEST_PASSWORD,
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::CONFLICT)
        .body_json();

    assert_eq!(body["message"], "email is already in use");
}

#[test_log::test(tokio::test)]
async fn login_accepts_login_or_email() {
    let service = create_test_service();
    register(&service, "alice", None).await;

    let by_login = login(&service, "alice").await;
    let by_email = login(&service, "alice@example.com").await;

    assert_ne!(by_login, by_email, "each login issues a fresh session");
}

#[test_log::test(tokio::test)]
async fn wrong_password_is_unauthorized() {
    let service = create_test_service();
    register(&service, "alice", None).await;

    let body = TestRequest::post("/api/auth/login")
        .json_body(&json!({ "identifier": "alice", "password": "wrong-pass-1" }))
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .body_json();

    assert_eq!(body["error"], "Not authenticated. Please log in");
}

#[test_log::test(tokio::test)]
async fn protected_routes_require_a_session() {
    let service = create_test_service();

    let body = TestRequest::get("/api/users/me")
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .body_json();

    assert_eq!(body["error"], "Not authenticated. Please log in");
}

#[test_log::test(tokio::test)]
async fn logout_revokes_the_session() {
    let service = create_test_service();
    let user = signup(&service, "alice").await;

    TestRequest::get("/api/users/me")
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success();

    TestRequest::post("/api/auth/logout")
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success();

    TestRequest::get("/api/users/me")
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[test_log::test(tokio::test)]
async fn deleted_account_sessions_stop_working() {
    let service = create_test_service();
    let user = signup(&service, "alice").await;

    TestRequest::delete("/api/users/me")
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success();

    TestRequest::get("/api/users/me")
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

/// Reads the pending confirmation token straight off the store, standing in
/// for the link mail delivery would carry.
async fn pending_token(store: &MemoryStore, login: &str) -> Option<String> {
    store
        .find_user_by_identifier(login)
        .await
        .expect("query")
        .expect("account exists")
        .email_confirmation_token
}

#[test_log::test(tokio::test)]
async fn the_emailed_token_confirms_the_address_once() {
    let store = Arc::new(MemoryStore::new());
    let service = create_service_on(Arc::clone(&store) as Arc<dyn DataStore>);
    register(&service, "alice", None).await;
    let token = pending_token(&store, "alice").await.expect("token pending");

    let body = TestRequest::get(&format!("/api/auth/confirm-email?token={token}"))
        .send(&service)
        .await
        .assert_success()
        .body_json();
    assert_eq!(body["message"], "Email confirmed successfully");

    let user = store
        .find_user_by_identifier("alice")
        .await
        .expect("query")
        .expect("account exists");
    assert!(user.email_confirmed);
    assert!(user.email_confirmation_token.is_none());

    // The link is single use.
    let replay = TestRequest::get(&format!("/api/auth/confirm-email?token={token}"))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .body_json();
    assert_eq!(
        replay["message"],
        "Invalid token or this email already confirmed"
    );
}

#[test_log::test(tokio::test)]
async fn resending_rotates_the_pending_token() {
    let store = Arc::new(MemoryStore::new());
    let service = create_service_on(Arc::clone(&store) as Arc<dyn DataStore>);
    register(&service, "bob", None).await;
    let first = pending_token(&store, "bob").await.expect("token pending");

    TestRequest::post("/api/auth/resend-confirmation")
        .json_body(&json!({ "email": "bob@example.com" }))
        .send(&service)
        .await
        .assert_success();

    let rotated = pending_token(&store, "bob").await.expect("token reissued");
    assert_ne!(rotated, first);

    // The stale link is dead, the fresh one works.
    TestRequest::get(&format!("/api/auth/confirm-email?token={first}"))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    TestRequest::get(&format!("/api/auth/confirm-email?token={rotated}"))
        .send(&service)
        .await
        .assert_success();

    // Once confirmed there is nothing left to resend.
    let done = TestRequest::post("/api/auth/resend-confirmation")
        .json_body(&json!({ "email": "bob@example.com" }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .body_json();
    assert_eq!(done["message"], "Email already confirmed");

    TestRequest::post("/api/auth/resend-confirmation")
        .json_body(&json!({ "email": "nobody@example.com" }))
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn confirming_without_a_token_is_a_client_error() {
    let service = create_test_service();

    let body = TestRequest::get("/api/auth/confirm-email")
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST)
        .body_json();
    assert_eq!(body["error"], "Confirmation token is required");
}
