//! Regional holiday overlay behavior against a mocked upstream feed.

use std::sync::Arc;

use chrono::{Datelike, Utc};
use salvo::http::StatusCode;
use serde_json::{Value, json};
use wiremock::matchers::{method, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chronos_test::component::store::DataStore;

use super::helpers::*;

fn feed_items(year: i32, event_id: &str, summary: &str) -> Value {
    json!({
        "items": [{
            "id": event_id,
            "summary": summary,
            "start": { "date": format!("{year}-01-01") },
            "end": { "date": format!("{year}-01-02") },
        }]
    })
}

/// Mounts one mock per fetched year, each expecting a single upstream call.
async fn mount_two_years(server: &MockServer, year: i32) {
    Mock::given(method("GET"))
        .and(path_regex(r"/events$"))
        .and(query_param("timeMin", format!("{year}-01-01T00:00:00Z")))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_items(year, "evt1", "New Year")))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"/events$"))
        .and(query_param(
            "timeMin",
            format!("{}-01-01T00:00:00Z", year + 1),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(feed_items(
            year + 1,
            "evt9",
            "New Year",
        )))
        .expect(1)
        .mount(server)
        .await;
}

#[test_log::test(tokio::test)]
async fn the_overlay_appears_once_per_cache_window() {
    let server = MockServer::start().await;
    let year = Utc::now().year();
    mount_two_years(&server, year).await;

    let service = create_service_with(feed_config(&server.uri()));
    // "Ukraine" normalizes to the "ua" code at registration.
    let user = signup_with_region(&service, "alice", Some("Ukraine")).await;

    for _ in 0..2 {
        let listing = TestRequest::get("/api/calendars/my")
            .bearer(&user.token)
            .send(&service)
            .await
            .assert_success()
            .body_json();

        let entries = listing.as_array().expect("array");
        assert_eq!(entries.len(), 2, "default calendar plus the overlay");

        let overlay = entries
            .iter()
            .find(|e| e["isRegional"] == true)
            .expect("overlay entry present");
        assert_eq!(overlay["id"], format!("google_ua_{year}"));
        assert_eq!(overlay["name"], "Ukraine Holidays");
        assert_eq!(
            overlay["events"].as_array().map(Vec::len),
            Some(2),
            "current and next year concatenated"
        );
    }

    // The mock expectations verify each year was fetched exactly once.
    drop(server);
}

#[test_log::test(tokio::test)]
async fn regional_calendar_and_event_resolve_by_id() {
    let server = MockServer::start().await;
    let year = Utc::now().year();
    mount_two_years(&server, year).await;

    let service = create_service_with(feed_config(&server.uri()));
    let user = signup_with_region(&service, "alice", Some("ua")).await;

    let calendar = TestRequest::get(&format!("/api/calendars/google_ua_{year}"))
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();
    assert_eq!(calendar["name"], "Ukraine Holidays");

    let event_id = calendar["events"][0]["id"]
        .as_str()
        .expect("synthesized event id")
        .to_string();
    assert_eq!(event_id, "system_holiday_ua_evt1");

    let event = TestRequest::get(&format!("/api/events/{event_id}"))
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();
    assert_eq!(event["title"], "New Year");
    assert_eq!(event["allDay"], true);
}

#[test_log::test(tokio::test)]
async fn a_feed_outage_degrades_to_persisted_calendars() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let service = create_service_with(feed_config(&server.uri()));
    let user = signup_with_region(&service, "alice", Some("ua")).await;

    let listing = TestRequest::get("/api/calendars/my")
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();

    let entries = listing.as_array().expect("array");
    assert_eq!(entries.len(), 1, "only the default calendar survives");
    assert_eq!(entries[0]["name"], "Main");
}

#[test_log::test(tokio::test)]
async fn a_missing_api_key_disables_the_overlay() {
    // Default test config carries no key and an unreachable feed.
    let service = create_test_service();
    let user = signup_with_region(&service, "alice", Some("ua")).await;

    let listing = TestRequest::get("/api/calendars/my")
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();
    assert_eq!(listing.as_array().map(Vec::len), Some(1));
}

#[test_log::test(tokio::test)]
async fn users_without_a_region_get_no_overlay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let service = create_service_with(feed_config(&server.uri()));
    let user = signup(&service, "alice").await;

    let listing = TestRequest::get("/api/calendars/my")
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_success()
        .body_json();
    assert_eq!(listing.as_array().map(Vec::len), Some(1));

    drop(server);
}

#[test_log::test(tokio::test)]
async fn a_foreign_region_calendar_is_forbidden() {
    let server = MockServer::start().await;
    let service = create_service_with(feed_config(&server.uri()));
    let user = signup_with_region(&service, "alice", Some("ua")).await;

    TestRequest::get("/api/calendars/google_de_2025")
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    TestRequest::get("/api/events/system_holiday_de_someid")
        .bearer(&user.token)
        .send(&service)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[test_log::test(tokio::test)]
async fn rejected_regional_mutations_never_reach_the_store() {
    let store = Arc::new(CountingStore::new());
    let service = create_service_on(Arc::clone(&store) as Arc<dyn DataStore>);
    let user = signup(&service, "alice").await;

    // Fixtures are in place; from here every repository call is a leak.
    store.reset();

    for (request, message) in [
        (
            TestRequest::patch("/api/calendars/google_ua_2025")
                .json_body(&json!({ "name": "nope" })),
            "cannot modify regional calendar",
        ),
        (
            TestRequest::delete("/api/calendars/google_ua_2025"),
            "cannot modify regional calendar",
        ),
        (
            TestRequest::post("/api/calendars/google_ua_2025/share")
                .json_body(&json!({ "userId": user.id })),
            "cannot modify regional calendar",
        ),
        (
            TestRequest::put("/api/events/system_holiday_ua_abc123")
                .json_body(&json!({ "title": "nope" })),
            "cannot modify regional event",
        ),
        (
            TestRequest::delete("/api/events/system_holiday_ua_abc123"),
            "cannot modify regional event",
        ),
        (
            TestRequest::post("/api/events/system_holiday_ua_abc123/invite")
                .json_body(&json!({ "userId": user.id })),
            "cannot modify regional event",
        ),
    ] {
        let body = request
            .bearer(&user.token)
            .send(&service)
            .await
            .assert_status(StatusCode::FORBIDDEN)
            .body_json();
        assert_eq!(body["message"], message);
    }

    assert_eq!(
        store.calls(),
        0,
        "regional mutations must be rejected before any store access"
    );
}
