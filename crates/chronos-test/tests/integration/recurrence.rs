//! Recurrence materialization as observed through the API.

use chrono::{DateTime, TimeZone, Utc};
use salvo::http::StatusCode;
use serde_json::{Value, json};

use super::helpers::*;

fn sorted_starts(events: &Value) -> Vec<DateTime<Utc>> {
    let mut starts: Vec<DateTime<Utc>> = events
        .as_array()
        .expect("listing is an array")
        .iter()
        .filter_map(|e| e["startDate"].as_str())
        .map(|s| {
            DateTime::parse_from_rfc3339(s)
                .expect("start dates are RFC 3339")
                .with_timezone(&Utc)
        })
        .collect();
    starts.sort();
    starts
}

#[test_log::test(tokio::test)]
async fn a_weekly_event_materializes_the_full_horizon() {
    let service = create_test_service();
    let user = signup(&service, "alice").await;
    let calendar = user.default_calendar.to_string();

    TestRequest::post("/api/events/create")
        .bearer(&user.token)
        .json_body(&json!({
            "title": "Standup",
            "type": "arrangement",
            "startDate": "2025-01-06T10:00:00Z",
            "endDate": "2025-01-06T10:30:00Z",
            "calendar": calendar,
            "repeat": "weekly",
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED);

    let events = TestRequest::get(&format!("/api/events/calendar/{calendar}"))
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();

    // One template plus thirty occurrences.
    assert_eq!(events.as_array().map(Vec::len), Some(31));

    let starts = sorted_starts(&events);
    assert_eq!(
        starts[0],
        Utc.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).single().expect("valid")
    );
    assert_eq!(
        starts[4],
        Utc.with_ymd_and_hms(2025, 2, 3, 10, 0, 0).single().expect("valid"),
        "the fourth occurrence lands four weeks out"
    );
    assert_eq!(
        starts[30],
        Utc.with_ymd_and_hms(2025, 8, 4, 10, 0, 0).single().expect("valid"),
        "the horizon ends thirty weeks out"
    );
}

#[test_log::test(tokio::test)]
async fn a_daily_event_shifts_by_days() {
    let service = create_test_service();
    let user = signup(&service, "alice").await;
    let calendar = user.default_calendar.to_string();

    TestRequest::post("/api/events/create")
        .bearer(&user.token)
        .json_body(&json!({
            "title": "Journal",
            "type": "reminder",
            "startDate": "2025-01-01T08:00:00Z",
            "calendar": calendar,
            "repeat": "daily",
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED);

    let events = TestRequest::get(&format!("/api/events/calendar/{calendar}"))
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();

    assert_eq!(events.as_array().map(Vec::len), Some(31));
    let starts = sorted_starts(&events);
    assert_eq!(
        starts[30],
        Utc.with_ymd_and_hms(2025, 1, 31, 8, 0, 0).single().expect("valid")
    );
}

#[test_log::test(tokio::test)]
async fn monthly_occurrences_clamp_to_shorter_months() {
    let service = create_test_service();
    let user = signup(&service, "alice").await;
    let calendar = user.default_calendar.to_string();

    TestRequest::post("/api/events/create")
        .bearer(&user.token)
        .json_body(&json!({
            "title": "Rent",
            "type": "reminder",
            "startDate": "2025-01-31T09:00:00Z",
            "calendar": calendar,
            "repeat": "monthly",
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED);

    let events = TestRequest::get(&format!("/api/events/calendar/{calendar}"))
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();

    let starts = sorted_starts(&events);
    assert_eq!(
        starts[1],
        Utc.with_ymd_and_hms(2025, 2, 28, 9, 0, 0).single().expect("valid"),
        "January 31st clamps to the end of February"
    );
    assert_eq!(
        starts[2],
        Utc.with_ymd_and_hms(2025, 3, 31, 9, 0, 0).single().expect("valid")
    );
}

#[test_log::test(tokio::test)]
async fn a_reminder_template_records_one_notification() {
    let service = create_test_service();
    let user = signup(&service, "alice").await;

    TestRequest::post("/api/events/create")
        .bearer(&user.token)
        .json_body(&json!({
            "title": "Pay rent",
            "type": "reminder",
            "startDate": "2025-03-01T09:00:00Z",
            "calendar": user.default_calendar.to_string(),
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED);

    let notifications = TestRequest::get("/api/notifications")
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();

    assert_eq!(notifications.as_array().map(Vec::len), Some(1));
    assert_eq!(notifications[0]["message"], "Reminder: Pay rent");
}

#[test_log::test(tokio::test)]
async fn changing_the_repeat_tag_does_not_regenerate_occurrences() {
    let service = create_test_service();
    let user = signup(&service, "alice").await;
    let calendar = user.default_calendar.to_string();

    let created = TestRequest::post("/api/events/create")
        .bearer(&user.token)
        .json_body(&json!({
            "title": "One-off",
            "type": "task",
            "calendar": calendar,
        }))
        .send(&service)
        .await
        .assert_status(StatusCode::CREATED)
        .body_json();
    let id = created["id"].as_str().expect("event id").to_string();

    let updated = TestRequest::post(&format!("/api/events/{id}/repeat"))
        .bearer(&user.token)
        .json_body(&json!({ "repeat": "daily" }))
        .send(&service)
        .await
        .assert_success()
        .body_json();
    assert_eq!(updated["repeat"], "daily");

    let events = TestRequest::get(&format!("/api/events/calendar/{calendar}"))
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();
    assert_eq!(
        events.as_array().map(Vec::len),
        Some(1),
        "only the tag changes after creation"
    );
}
