// libs/appointment-cell/tests/handlers_test.rs
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use appointment_cell::models::Room;
use appointment_cell::router::{appointment_routes, room_routes};
use appointment_cell::store::InMemoryStore;
use appointment_cell::AppState;
use shared_config::AppConfig;

fn app(store: Arc<InMemoryStore>) -> Router {
    let state = Arc::new(AppState::new(Arc::new(AppConfig::default()), store.clone(), store));
    Router::new()
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/rooms", room_routes(state))
}

fn store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::with_rooms(vec![
        Room::new("A", "Room A", true),
        Room::new("B", "Room B", true),
    ]))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn ana_at_ten() -> Value {
    json!({
        "appointment_date": "2024-03-15",
        "start_time": "10:00",
        "end_time": "11:00",
        "psychologist_email": "dr@x.com",
        "room_id": "A",
        "patient_name": "Ana"
    })
}

#[tokio::test]
async fn book_then_conflict_returns_409_with_details() {
    let app = app(store());

    let (status, body) = send(&app, Method::POST, "/appointments", Some(ana_at_ten())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["appointment"]["status"], "scheduled");

    let mut overlapping = ana_at_ten();
    overlapping["start_time"] = json!("10:30");
    overlapping["end_time"] = json!("11:30");

    let (status, body) = send(&app, Method::POST, "/appointments", Some(overlapping)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let types: Vec<&str> = body["conflicts"].as_array().unwrap()
        .iter()
        .map(|c| c["type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["room", "psychologist", "patient"]);
    assert!(body["alternatives"].is_array());
}

#[tokio::test]
async fn conflict_check_endpoint_reports_clear_slot() {
    let app = app(store());
    send(&app, Method::POST, "/appointments", Some(ana_at_ten())).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/appointments/conflicts/check?date=2024-03-15&start_time=10:30&end_time=11:30&psychologist_email=other@x.com&room_id=B&patient_name=Bruno",
        None,
    ).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_conflicts"], false);
    assert_eq!(body["conflicts"], json!([]));
}

#[tokio::test]
async fn conflict_check_endpoint_fails_closed() {
    let store = store();
    store.set_failing(true);
    let app = app(store);

    let (status, body) = send(
        &app,
        Method::GET,
        "/appointments/conflicts/check?date=2024-03-15&start_time=10:00&end_time=11:00&psychologist_email=dr@x.com&room_id=A",
        None,
    ).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_conflicts"], true);
    assert_eq!(body["conflicts"][0]["type"], "time_overlap");
}

#[tokio::test]
async fn alternatives_endpoint_lists_suggestions() {
    let app = app(store());
    send(&app, Method::POST, "/appointments", Some(ana_at_ten())).await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/appointments/alternatives?date=2024-03-15&start_time=10:00&end_time=11:00&psychologist_email=other@x.com&room_id=A",
        None,
    ).await;

    assert_eq!(status, StatusCode::OK);
    let count = body["count"].as_u64().unwrap();
    assert!(count > 0 && count <= 6);
    assert_eq!(body["alternatives"][0]["type"], "alternative_time");
    assert_eq!(body["alternatives"][0]["urgency"], "high");
}

#[tokio::test]
async fn available_rooms_excludes_occupied_room() {
    let app = app(store());
    send(&app, Method::POST, "/appointments", Some(ana_at_ten())).await;

    let (status, body) = send(&app, Method::GET, "/rooms/available?date=2024-03-15&time=10:30", None).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["rooms"].as_array().unwrap()
        .iter()
        .map(|room| room["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["B"]);
}

#[tokio::test]
async fn status_and_lookup_round_trip() {
    let app = app(store());
    let (_, created) = send(&app, Method::POST, "/appointments", Some(ana_at_ten())).await;
    let id = created["appointment"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/appointments/{}/status", id),
        Some(json!({ "status": "cancelled" })),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appointment"]["status"], "cancelled");

    let (status, body) = send(&app, Method::GET, &format!("/appointments/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, body) = send(&app, Method::GET, "/appointments?date=2024-03-15", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn errors_map_to_http_statuses() {
    let app = app(store());

    let (status, body) = send(&app, Method::GET, "/appointments/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Appointment not found");

    let mut bad_range = ana_at_ten();
    bad_range["end_time"] = json!("09:00");
    let (status, _) = send(&app, Method::POST, "/appointments", Some(bad_range)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut unknown_room = ana_at_ten();
    unknown_room["room_id"] = json!("Z");
    let (status, _) = send(&app, Method::POST, "/appointments", Some(unknown_room)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
