//! Event lifecycle, invitations, and the regional immutability gate.

use salvo::http::StatusCode;
use serde_json::json;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn created_event_appears_in_the_calendar_listing() {
    let service = create_test_service();
    let user = signup(&service, "alice").await;
    let calendar = user.default_calendar.to_string();

    let created = TestRequest::post("/api/events/create")
        .bearer(&user.token)
        .json_body(&json!({
            "title": "Standup",
            "type": "arrangement",
            "startDate": "2025-03-03T09:00:00Z",
            "endDate": "2025-03-03T09:15:00Z",
            "calendar": calendar,
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .body_json();
    assert_eq!(created["title"], "Standup");
    assert_eq!(created["status"], "pending");

    let events = TestRequest::get(&format!("/api/events/calendar/{calendar}"))
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();
    assert_eq!(events.as_array().map(Vec::len), Some(1));
    assert_eq!(events[0]["title"], "Standup");
}

#[test_log::test(tokio::test)]
async fn an_arrangement_needs_both_dates() {
    let service = create_test_service();
    let user = signup(&service, "alice").await;

    TestRequest::post("/api/events/create")
        .bearer(&user.token)
        .json_body(&json!({
            "title": "Standup",
            "type": "arrangement",
            "startDate": "2025-03-03T09:00:00Z",
            "calendar": user.default_calendar.to_string(),
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn a_task_needs_no_dates() {
    let service = create_test_service();
    let user = signup(&service, "alice").await;

    TestRequest::post("/api/events/create")
        .bearer(&user.token)
        .json_body(&json!({
            "title": "Water the plants",
            "type": "task",
            "calendar": user.default_calendar.to_string(),
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED);
}

#[test_log::test(tokio::test)]
async fn strangers_cannot_read_an_event() {
    let service = create_test_service();
    let alice = signup(&service, "alice").await;
    let mallory = signup(&service, "mallory").await;

    let created = TestRequest::post("/api/events/create")
        .bearer(&alice.token)
        .json_body(&json!({
            "title": "Private",
            "type": "task",
            "calendar": alice.default_calendar.to_string(),
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .body_json();
    let id = created["id"].as_str().expect("event id").to_string();

    let body = TestRequest::get(&format!("/api/events/{id}"))
        .bearer(&mallory.token)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .body_json();
    assert_eq!(body["message"], "You do not have access to this event");
}

#[test_log::test(tokio::test)]
async fn invitation_reaches_the_invitee() {
    let service = create_test_service();
    let alice = signup(&service, "alice").await;
    let bob = signup(&service, "bob").await;

    let created = TestRequest::post("/api/events/create")
        .bearer(&alice.token)
        .json_body(&json!({
            "title": "Planning",
            "type": "arrangement",
            "startDate": "2025-03-03T09:00:00Z",
            "endDate": "2025-03-03T10:00:00Z",
            "calendar": alice.default_calendar.to_string(),
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .body_json();
    let id = created["id"].as_str().expect("event id").to_string();

    TestRequest::post(&format!("/api/events/{id}/invite"))
        .bearer(&alice.token)
        .json_body(&json!({ "userId": bob.id }))
        .send(&service)
        .await
        .assert_success();

    // Bob now sees it under his invitations and can open it.
    let invited = TestRequest::get("/api/events/invited")
        .bearer(&bob.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();
    assert_eq!(invited.as_array().map(Vec::len), Some(1));
    assert_eq!(invited[0]["title"], "Planning");

    TestRequest::get(&format!("/api/events/{id}"))
        .bearer(&bob.token)
        .send(&service)
        .await
        .assert_success();

    let notifications = TestRequest::get("/api/notifications")
        .bearer(&bob.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();
    assert_eq!(notifications.as_array().map(Vec::len), Some(1));
    assert_eq!(
        notifications[0]["message"],
        "You have been invited to \"Planning\""
    );
}

#[test_log::test(tokio::test)]
async fn inviting_the_creator_is_rejected() {
    let service = create_test_service();
    let alice = signup(&service, "alice").await;

    let created = TestRequest::post("/api/events/create")
        .bearer(&alice.token)
        .json_body(&json!({
            "title": "Solo",
            "type": "task",
            "calendar": alice.default_calendar.to_string(),
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .body_json();
    let id = created["id"].as_str().expect("event id").to_string();

    TestRequest::post(&format!("/api/events/{id}/invite"))
        .bearer(&alice.token)
        .json_body(&json!({ "userId": alice.id }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn only_the_creator_can_modify_an_event() {
    let service = create_test_service();
    let alice = signup(&service, "alice").await;
    let bob = signup(&service, "bob").await;

    let created = TestRequest::post("/api/events/create")
        .bearer(&alice.token)
        .json_body(&json!({
            "title": "Planning",
            "type": "task",
            "calendar": alice.default_calendar.to_string(),
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .body_json();
    let id = created["id"].as_str().expect("event id").to_string();

    TestRequest::post(&format!("/api/events/{id}/invite"))
        .bearer(&alice.token)
        .json_body(&json!({ "userId": bob.id }))
        .send(&service)
        .await
        .assert_success();

    let body = TestRequest::put(&format!("/api/events/{id}"))
        .bearer(&bob.token)
        .json_body(&json!({ "title": "Hijacked" }))
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .body_json();
    assert_eq!(body["message"], "Only the creator can modify this event");
}

#[test_log::test(tokio::test)]
async fn status_updates_round_trip() {
    let service = create_test_service();
    let user = signup(&service, "alice").await;

    let created = TestRequest::post("/api/events/create")
        .bearer(&user.token)
        .json_body(&json!({
            "title": "Chore",
            "type": "task",
            "calendar": user.default_calendar.to_string(),
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .body_json();
    let id = created["id"].as_str().expect("event id").to_string();

    let updated = TestRequest::patch(&format!("/api/events/{id}/status"))
        .bearer(&user.token)
        .json_body(&json!({ "status": "done" }))
        .send(&service)
        .await
        .assert_success()
        .body_json();
    assert_eq!(updated["status"], "done");

    TestRequest::patch(&format!("/api/events/{id}/status"))
        .bearer(&user.token)
        .json_body(&json!({ "status": "postponed" }))
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn delete_removes_the_event_everywhere() {
    let service = create_test_service();
    let user = signup(&service, "alice").await;
    let calendar = user.default_calendar.to_string();

    let created = TestRequest::post("/api/events/create")
        .bearer(&user.token)
        .json_body(&json!({
            "title": "Doomed",
            "type": "task",
            "calendar": calendar,
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .body_json();
    let id = created["id"].as_str().expect("event id").to_string();

    TestRequest::delete(&format!("/api/events/{id}"))
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success();

    TestRequest::get(&format!("/api/events/{id}"))
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let events = TestRequest::get(&format!("/api/events/calendar/{calendar}"))
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();
    assert_eq!(events.as_array().map(Vec::len), Some(0));
}

#[test_log::test(tokio::test)]
async fn regional_event_mutations_are_forbidden() {
    let service = create_test_service();
    let user = signup(&service, "alice").await;

    for request in [
        TestRequest::put("/api/events/system_holiday_ua_abc123")
            .json_body(&json!({ "title": "nope" })),
        TestRequest::delete("/api/events/system_holiday_ua_abc123"),
        TestRequest::post("/api/events/system_holiday_ua_abc123/invite")
            .json_body(&json!({ "userId": user.id })),
    ] {
        let body = request
            .bearer(&user.token)
            .send(&service)
            .await
            .assert_status(StatusCode::FORBIDDEN)
            .body_json();
        assert_eq!(body["message"], "cannot modify regional event");
        assert_eq!(body["success"], false);
    }
}

#[test_log::test(tokio::test)]
async fn creating_into_a_regional_calendar_is_forbidden() {
    let service = create_test_service();
    let user = signup(&service, "alice").await;

    let body = TestRequest::post("/api/events/create")
        .bearer(&user.token)
        .json_body(&json!({
            "title": "Sneaky",
            "type": "task",
            "calendar": "google_ua_2025",
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .body_json();
    assert_eq!(body["message"], "cannot modify regional calendar");
}

#[test_log::test(tokio::test)]
async fn malformed_regional_event_id_is_a_client_error() {
    let service = create_test_service();
    let user = signup(&service, "alice").await;

    // Fewer than four underscore-separated parts.
    TestRequest::get("/api/events/system_holiday_ua")
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
