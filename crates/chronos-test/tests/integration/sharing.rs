//! Calendar sharing semantics over HTTP.

use salvo::http::StatusCode;
use serde_json::{Value, json};

use super::helpers::*;

async fn create_calendar(service: &salvo::Service, token: &str, name: &str) -> String {
    let created = TestRequest::post("/api/calendars/create")
        .bearer(token)
        .json_body(&json!({ "name": name }))
        .send(service)
        .await
        .assert_status(StatusCode::CREATED)
        .body_json();
    created["id"].as_str().expect("calendar id").to_string()
}

#[test_log::test(tokio::test)]
async fn sharing_grants_read_access() {
    let service = create_test_service();
    let alice = signup(&service, "alice").await;
    let bob = signup(&service, "bob").await;
    let team = create_calendar(&service, &alice.token, "Team").await;

    TestRequest::post(&format!("/api/calendars/{team}/share"))
        .bearer(&alice.token)
        .json_body(&json!({ "userId": bob.id }))
        .send(&service)
        .await
        .assert_success();

    // Bob sees the calendar in his listing and can open it directly.
    let listing = TestRequest::get("/api/calendars/my")
        .bearer(&bob.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();
    let names: Vec<&str> = listing
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|entry| entry["name"].as_str())
        .collect();
    assert!(names.contains(&"Team"));

    TestRequest::get(&format!("/api/calendars/{team}"))
        .bearer(&bob.token)
        .send(&service)
        .await
        .assert_success();

    let shared = TestRequest::get("/api/users/me/shared")
        .bearer(&bob.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();
    assert_eq!(shared.as_array().map(Vec::len), Some(1));
}

#[test_log::test(tokio::test)]
async fn a_sharer_cannot_modify_the_calendar() {
    let service = create_test_service();
    let alice = signup(&service, "alice").await;
    let bob = signup(&service, "bob").await;
    let team = create_calendar(&service, &alice.token, "Team").await;

    TestRequest::post(&format!("/api/calendars/{team}/share"))
        .bearer(&alice.token)
        .json_body(&json!({ "userId": bob.id }))
        .send(&service)
        .await
        .assert_success();

    let body = TestRequest::patch(&format!("/api/calendars/{team}"))
        .bearer(&bob.token)
        .json_body(&json!({ "name": "Hijacked" }))
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .body_json();
    assert_eq!(body["message"], "Only the owner can modify this calendar");
}

#[test_log::test(tokio::test)]
async fn a_stranger_cannot_read_the_calendar() {
    let service = create_test_service();
    let alice = signup(&service, "alice").await;
    let mallory = signup(&service, "mallory").await;
    let team = create_calendar(&service, &alice.token, "Team").await;

    let body = TestRequest::get(&format!("/api/calendars/{team}"))
        .bearer(&mallory.token)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .body_json();
    assert_eq!(body["message"], "You do not have access to this calendar");
}

#[test_log::test(tokio::test)]
async fn the_default_calendar_cannot_be_shared() {
    let service = create_test_service();
    let alice = signup(&service, "alice").await;
    let bob = signup(&service, "bob").await;

    let body = TestRequest::post(&format!(
        "/api/calendars/{}/share",
        alice.default_calendar
    ))
    .bearer(&alice.token)
    .json_body(&json!({ "userId": bob.id }))
    .send(&service)
    .await
    .assert_status(StatusCode::BAD_REQUEST)
    .body_json();
    assert_eq!(body["message"], "Default calendar cannot be shared");
}

#[test_log::test(tokio::test)]
async fn sharing_twice_is_a_conflict() {
    let service = create_test_service();
    let alice = signup(&service, "alice").await;
    let bob = signup(&service, "bob").await;
    let team = create_calendar(&service, &alice.token, "Team").await;

    TestRequest::post(&format!("/api/calendars/{team}/share"))
        .bearer(&alice.token)
        .json_body(&json!({ "userId": bob.id }))
        .send(&service)
        .await
        .assert_success();

    TestRequest::post(&format!("/api/calendars/{team}/share"))
        .bearer(&alice.token)
        .json_body(&json!({ "userId": bob.id }))
        .send(&service)
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[test_log::test(tokio::test)]
async fn unshare_revokes_access() {
    let service = create_test_service();
    let alice = signup(&service, "alice").await;
    let bob = signup(&service, "bob").await;
    let team = create_calendar(&service, &alice.token, "Team").await;

    TestRequest::post(&format!("/api/calendars/{team}/share"))
        .bearer(&alice.token)
        .json_body(&json!({ "userId": bob.id }))
        .send(&service)
        .await
        .assert_success();

    TestRequest::post(&format!("/api/calendars/{team}/unshare"))
        .bearer(&alice.token)
        .json_body(&json!({ "userId": bob.id }))
        .send(&service)
        .await
        .assert_success();

    TestRequest::get(&format!("/api/calendars/{team}"))
        .bearer(&bob.token)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let listing = TestRequest::get("/api/calendars/my")
        .bearer(&bob.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();
    assert_eq!(listing.as_array().map(Vec::len), Some(1), "only his default");
}

#[test_log::test(tokio::test)]
async fn a_sharer_can_remove_themself() {
    let service = create_test_service();
    let alice = signup(&service, "alice").await;
    let bob = signup(&service, "bob").await;
    let team = create_calendar(&service, &alice.token, "Team").await;

    TestRequest::post(&format!("/api/calendars/{team}/share"))
        .bearer(&alice.token)
        .json_body(&json!({ "userId": bob.id }))
        .send(&service)
        .await
        .assert_success();

    TestRequest::post(&format!("/api/calendars/{team}/unshare"))
        .bearer(&bob.token)
        .json_body(&json!({ "userId": bob.id }))
        .send(&service)
        .await
        .assert_success();

    TestRequest::get(&format!("/api/calendars/{team}"))
        .bearer(&bob.token)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn members_lists_owner_then_sharers() {
    let service = create_test_service();
    let alice = signup(&service, "alice").await;
    let bob = signup(&service, "bob").await;
    let team = create_calendar(&service, &alice.token, "Team").await;

    TestRequest::post(&format!("/api/calendars/{team}/share"))
        .bearer(&alice.token)
        .json_body(&json!({ "userId": bob.id }))
        .send(&service)
        .await
        .assert_success();

    let members: Value = TestRequest::get(&format!("/api/calendars/{team}/members"))
        .bearer(&bob.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();

    let logins: Vec<&str> = members
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|m| m["login"].as_str())
        .collect();
    assert_eq!(logins, vec!["alice", "bob"]);
}
