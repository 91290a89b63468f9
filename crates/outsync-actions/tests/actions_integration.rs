//! Action scenarios against a mock Graph server: payload shape on the
//! wire, the follow-up re-sync, and failure surfaces.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use outsync_actions::{
    create_onetime_event, create_recurring_event, edit_onetime_event_current_timezone,
    edit_onetime_event_custom_timezone, edit_recurring_event, ActionError, AttendeeSlot,
    OneTimeEventEditParams, OneTimeEventParams, RecurringEventEditParams, RecurringEventParams,
};
use outsync_graph::GraphClient;
use outsync_store::SyncStore;
use outsync_sync::SyncEngine;

fn make_engine(server: &MockServer, dir: &TempDir) -> SyncEngine {
    let client = GraphClient::new(&server.uri(), "test_token");
    let store = SyncStore::new(dir.path().join("sync.db")).unwrap();
    SyncEngine::new(client, store)
}

fn onetime_params() -> OneTimeEventParams {
    let mut params = OneTimeEventParams {
        user_id: "u1".to_string(),
        subject: "Planning".to_string(),
        content: "<p>agenda</p>".to_string(),
        start_date: "2024-03-05".to_string(),
        start_time: "10:30:00".to_string(),
        end_date: "2024-03-05".to_string(),
        end_time: "11:00:00".to_string(),
        timezone: "Pacific Standard Time".to_string(),
        location: Some("Room 4".to_string()),
        is_online_meeting: true,
        online_meeting_provider: Some("teamsForBusiness".to_string()),
        ..OneTimeEventParams::default()
    };
    params.attendees[0] = AttendeeSlot::new("ann@example.com", "required");
    params
}

fn recurring_params() -> RecurringEventParams {
    RecurringEventParams {
        user_id: "u1".to_string(),
        subject: "Office hours".to_string(),
        content: "<p>drop in</p>".to_string(),
        timezone: "UTC".to_string(),
        recurrence_type: "weekly".to_string(),
        days: Some("Monday".to_string()),
        day_of_month: None,
        start_date: "2024-03-04".to_string(),
        start_time: "15:00:00".to_string(),
        end_date: "2024-03-04".to_string(),
        end_time: "16:00:00".to_string(),
        recur_end_date: "2024-06-24".to_string(),
        is_online_meeting: true,
    }
}

/// Mount the per-user fetches the post-mutation re-sync performs.
async fn mount_resync(server: &MockServer, user_id: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/users/{}/calendarView", user_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .expect(times)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/users/{}/calendar/events", user_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_create_posts_composed_payload_and_resyncs() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/me/events"))
        .and(body_partial_json(json!({
            "subject": "Planning",
            "body": {"contentType": "HTML", "content": "<p>agenda</p>"},
            "start": {"dateTime": "2024-03-05T10:30:00", "timeZone": "Pacific Standard Time"},
            "end": {"dateTime": "2024-03-05T11:00:00", "timeZone": "Pacific Standard Time"},
            "location": {"displayName": "Room 4"},
            "attendees": [
                {"emailAddress": {"address": "ann@example.com"}, "type": "required"}
            ],
            "allowNewTimeProposals": true,
            "isOnlineMeeting": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "evt-1"})))
        .expect(1)
        .mount(&server)
        .await;

    mount_resync(&server, "u1", 1).await;

    let dir = TempDir::new().unwrap();
    let engine = make_engine(&server, &dir);
    create_onetime_event(&engine, &onetime_params()).await.unwrap();
}

#[tokio::test]
async fn test_create_skips_empty_attendee_slots() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/me/events"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "evt-1"})))
        .mount(&server)
        .await;

    mount_resync(&server, "u1", 1).await;

    let mut params = onetime_params();
    params.attendees[4] = AttendeeSlot::new("zoe@example.com", "optional");

    let dir = TempDir::new().unwrap();
    let engine = make_engine(&server, &dir);
    create_onetime_event(&engine, &params).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let create = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&create.body).unwrap();

    let attendees = body["attendees"].as_array().unwrap();
    assert_eq!(attendees.len(), 2);
    assert_eq!(attendees[0]["emailAddress"]["address"], "ann@example.com");
    assert_eq!(attendees[1]["emailAddress"]["address"], "zoe@example.com");
}

#[tokio::test]
async fn test_recurring_create_pins_provider_and_single_day_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/me/events"))
        .and(body_partial_json(json!({
            "onlineMeetingProvider": "teamsForBusiness",
            "recurrence": {
                "pattern": {"type": "weekly", "interval": 1, "daysOfWeek": ["Monday"]},
                "range": {"type": "endDate", "startDate": "2024-03-04", "endDate": "2024-06-24"}
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "evt-2"})))
        .expect(1)
        .mount(&server)
        .await;

    mount_resync(&server, "u1", 1).await;

    let dir = TempDir::new().unwrap();
    let engine = make_engine(&server, &dir);
    create_recurring_event(&engine, &recurring_params()).await.unwrap();

    // The recurring create never sends attendees or a location.
    let requests = server.received_requests().await.unwrap();
    let create = requests
        .iter()
        .find(|r| r.method.as_str() == "POST")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&create.body).unwrap();
    assert!(body.get("attendees").is_none());
    assert!(body.get("location").is_none());
}

#[tokio::test]
async fn test_edit_current_timezone_patches_whole_timestamps() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/me/events/evt-9"))
        .and(body_partial_json(json!({
            "subject": "Moved meeting",
            "start": {"dateTime": "2024-03-01T09:00:00", "timeZone": "UTC"},
            "end": {"dateTime": "2024-03-01T09:45:00", "timeZone": "UTC"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "evt-9"})))
        .expect(1)
        .mount(&server)
        .await;

    mount_resync(&server, "u1", 1).await;

    let params = OneTimeEventEditParams {
        user_id: "u1".to_string(),
        subject: "Moved meeting".to_string(),
        content: "<p>new slot</p>".to_string(),
        start_date_time: "2024-03-01T09:00:00".to_string(),
        end_date_time: "2024-03-01T09:45:00".to_string(),
        timezone: "UTC".to_string(),
        ..OneTimeEventEditParams::default()
    };

    let dir = TempDir::new().unwrap();
    let engine = make_engine(&server, &dir);
    edit_onetime_event_current_timezone(&engine, "evt-9", &params)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_edit_custom_timezone_composes_datetime() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/me/events/evt-3"))
        .and(body_partial_json(json!({
            "start": {"dateTime": "2024-03-05T10:30:00", "timeZone": "Pacific Standard Time"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "evt-3"})))
        .expect(1)
        .mount(&server)
        .await;

    mount_resync(&server, "u1", 1).await;

    let dir = TempDir::new().unwrap();
    let engine = make_engine(&server, &dir);
    edit_onetime_event_custom_timezone(&engine, "evt-3", &onetime_params())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_edit_recurring_carries_recurrence_and_attendees() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/me/events/evt-5"))
        .and(body_partial_json(json!({
            "onlineMeetingProvider": "teamsForBusiness",
            "attendees": [
                {"emailAddress": {"address": "lee@example.com"}, "type": "required"}
            ],
            "recurrence": {
                "pattern": {"type": "weekly", "daysOfWeek": ["Monday"]},
                "range": {"type": "endDate", "endDate": "2024-06-24"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "evt-5"})))
        .expect(1)
        .mount(&server)
        .await;

    mount_resync(&server, "u1", 1).await;

    let base = recurring_params();
    let mut params = RecurringEventEditParams {
        user_id: base.user_id,
        subject: base.subject,
        content: base.content,
        timezone: base.timezone,
        recurrence_type: base.recurrence_type,
        days: base.days,
        day_of_month: base.day_of_month,
        start_date: base.start_date,
        start_time: base.start_time,
        end_date: base.end_date,
        end_time: base.end_time,
        recur_end_date: base.recur_end_date,
        is_online_meeting: base.is_online_meeting,
        ..RecurringEventEditParams::default()
    };
    params.attendees[0] = AttendeeSlot::new("lee@example.com", "required");

    let dir = TempDir::new().unwrap();
    let engine = make_engine(&server, &dir);
    edit_recurring_event(&engine, "evt-5", &params).await.unwrap();
}

#[tokio::test]
async fn test_mutation_failure_surfaces_status_and_skips_resync() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/me/events"))
        .respond_with(ResponseTemplate::new(400).set_body_string("subject required"))
        .mount(&server)
        .await;

    mount_resync(&server, "u1", 0).await;

    let dir = TempDir::new().unwrap();
    let engine = make_engine(&server, &dir);
    let err = create_onetime_event(&engine, &onetime_params())
        .await
        .unwrap_err();

    match err {
        ActionError::Graph(source) => {
            let msg = source.to_string();
            assert!(msg.contains("400"));
            assert!(msg.contains("subject required"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_day_of_month_fails_before_any_request() {
    let server = MockServer::start().await;

    let mut params = recurring_params();
    params.day_of_month = Some("first".to_string());

    let dir = TempDir::new().unwrap();
    let engine = make_engine(&server, &dir);
    let err = create_recurring_event(&engine, &params).await.unwrap_err();

    assert!(matches!(err, ActionError::InvalidParams(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_resync_failure_after_create_reports_stale_store() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/me/events"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "evt-1"})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/u1/calendarView"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/u1/calendar/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let engine = make_engine(&server, &dir);
    let err = create_onetime_event(&engine, &onetime_params())
        .await
        .unwrap_err();

    match &err {
        ActionError::Resync(_) => assert!(err.user_message().contains("saved")),
        other => panic!("unexpected error: {:?}", other),
    }
}
