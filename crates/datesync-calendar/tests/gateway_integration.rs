//! Integration tests for GoogleCalendarGateway using wiremock.
//!
//! These drive the reconciler against a mock Calendar API.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use anyhow::Result;
use datesync_calendar::{CalendarClient, GoogleCalendarGateway};
use datesync_core::retry::RetryConfig;
use datesync_core::sync::{self, SourceSpec};
use datesync_core::{CalendarGateway, Entry, EntrySource, EventKind};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct StaticSheets(HashMap<String, Vec<Entry>>);

impl EntrySource for StaticSheets {
    async fn read_entries(&self, source_name: &str) -> Result<Option<Vec<Entry>>> {
        Ok(self.0.get(source_name).cloned())
    }
}

fn gateway(server: &MockServer) -> GoogleCalendarGateway {
    let client = CalendarClient::with_base_url("test_token", &server.uri())
        .unwrap()
        .with_retry_config(RetryConfig::none());
    GoogleCalendarGateway::new(client, "primary")
}

fn birthday(id: &str, summary: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "summary": summary,
        "eventType": "birthday",
        "start": {"date": "2025-01-01"}
    })
}

async fn mount_listing(server: &MockServer, items: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": items })),
        )
        .mount(server)
        .await;
}

async fn mount_create_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "created",
            "htmlLink": "https://calendar.google.com/event?eid=created"
        })))
        .mount(server)
        .await;
}

fn birthdays_only(entries: Vec<Entry>) -> (StaticSheets, Vec<SourceSpec>) {
    (
        StaticSheets(HashMap::from([("Birthdays".to_string(), entries)])),
        vec![
            SourceSpec::new("Birthdays", EventKind::Birthday),
            SourceSpec::new("Anniversaries", EventKind::Anniversary),
        ],
    )
}

#[tokio::test]
async fn test_listing_follows_pages_and_last_title_wins() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(query_param("pageToken", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [birthday("dup2", "Alice's birthday"), birthday("c", "Carol's birthday")]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [birthday("dup1", "Alice's birthday"), {"id": "untitled"}],
            "nextPageToken": "p2"
        })))
        .mount(&mock_server)
        .await;

    let index = gateway(&mock_server).list_existing(2025).await.unwrap();

    assert_eq!(index.len(), 2);
    assert_eq!(index.get("Alice's birthday"), Some("dup2"));
    assert!(index.contains("Carol's birthday"));
}

#[tokio::test]
async fn test_existing_title_gets_no_post() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, vec![birthday("id1", "Bob's birthday")]).await;

    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "x"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (sheets, sources) = birthdays_only(vec![Entry::new("Bob", "01/01")]);
    let report = sync::run(&sheets, &gateway(&mock_server), &sources, 2025)
        .await
        .unwrap();

    assert_eq!(report.total().skipped, 1);
    assert_eq!(report.total().created, 0);
}

#[tokio::test]
async fn test_creates_missing_with_derived_dates() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, vec![]).await;

    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .and(body_partial_json(serde_json::json!({
            "summary": "Alice's birthday",
            "start": {"date": "2025-12-05"},
            "end": {"date": "2025-12-06"},
            "transparency": "transparent",
            "visibility": "private"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "a1"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (sheets, sources) = birthdays_only(vec![Entry::new("Alice", "05/12")]);
    let report = sync::run(&sheets, &gateway(&mock_server), &sources, 2025)
        .await
        .unwrap();

    assert_eq!(report.total().created, 1);
}

#[tokio::test]
async fn test_one_failed_creation_does_not_stop_the_rest() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, vec![]).await;

    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .and(body_partial_json(serde_json::json!({"summary": "Bob's birthday"})))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_create_ok(&mock_server).await;

    let (sheets, sources) = birthdays_only(vec![
        Entry::new("Alice", "05/12"),
        Entry::new("Bob", "01/01"),
        Entry::new("Carol", "31/10"),
    ]);
    let report = sync::run(&sheets, &gateway(&mock_server), &sources, 2025)
        .await
        .unwrap();

    let total = report.total();
    assert_eq!(total.created, 2);
    assert_eq!(total.failed, 1);

    let posts = mock_server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .count();
    assert_eq!(posts, 3);
}

#[tokio::test]
async fn test_listing_failure_recreates_everything() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "n"})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let (sheets, sources) =
        birthdays_only(vec![Entry::new("Alice", "05/12"), Entry::new("Bob", "01/01")]);
    let report = sync::run(&sheets, &gateway(&mock_server), &sources, 2025)
        .await
        .unwrap();

    assert_eq!(report.existing, 0);
    assert_eq!(report.total().created, 2);
}

#[tokio::test]
async fn test_failed_create_is_not_resent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_create_ok(&mock_server).await;

    // Retries enabled, as in a real run
    let client = CalendarClient::with_base_url("test_token", &mock_server.uri())
        .unwrap()
        .with_retry_config(RetryConfig::new(3, 1, 1));
    let gateway = GoogleCalendarGateway::new(client, "primary");

    let event = datesync_core::CalendarEvent {
        title: "Dana's birthday".into(),
        start: chrono::NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
        end: chrono::NaiveDate::from_ymd_opt(2025, 2, 4).unwrap(),
    };
    assert!(gateway.create_event(&event).await.is_err());

    let posts = mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.method.as_str() == "POST")
        .count();
    assert_eq!(posts, 1);
}
