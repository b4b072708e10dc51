// libs/appointment-cell/tests/supabase_store_test.rs
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use wiremock::{Mock, MockServer, ResponseTemplate};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};

use appointment_cell::models::{
    AppointmentError, AppointmentStatus, ConflictCheckRequest, ConflictType,
};
use appointment_cell::services::ConflictDetectionService;
use appointment_cell::store::{AppointmentStore, RoomStore, SupabaseAppointmentStore, SupabaseRoomStore};
use shared_database::supabase::SupabaseClient;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

struct TestSetup {
    mock_server: MockServer,
    appointments: Arc<SupabaseAppointmentStore>,
    rooms: SupabaseRoomStore,
}

impl TestSetup {
    async fn new() -> Self {
        let mock_server = MockServer::start().await;
        let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
        let supabase = Arc::new(SupabaseClient::new(&config));

        Self {
            appointments: Arc::new(SupabaseAppointmentStore::new(supabase.clone())),
            rooms: SupabaseRoomStore::new(supabase),
            mock_server,
        }
    }
}

fn march_15() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

#[tokio::test]
async fn reads_appointments_for_a_date_including_legacy_rows() {
    let setup = TestSetup::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("appointment_date", "eq.2024-03-15"))
        .and(header("apikey", "test-anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response("2024-03-15", "10:00", "11:00", "A", "dr@x.com", "Ana"),
            MockSupabaseResponses::legacy_appointment_response("2024-03-15", "14:00", "B", "dr@x.com", "Bruno"),
        ])))
        .expect(1)
        .mount(&setup.mock_server)
        .await;

    let appointments = setup.appointments.get_appointments_by_date(march_15()).await.unwrap();

    assert_eq!(appointments.len(), 2);
    assert_eq!(appointments[0].start_time.as_deref(), Some("10:00"));
    assert_eq!(appointments[1].appointment_time.as_deref(), Some("14:00"));
    assert_eq!(appointments[1].status, AppointmentStatus::Pending);
    assert_eq!(appointments[1].time_range(60).unwrap().to_string(), "14:00-15:00");
}

#[tokio::test]
async fn server_errors_become_database_errors() {
    let setup = TestSetup::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockSupabaseResponses::error_response("boom", "XX000"),
        ))
        .mount(&setup.mock_server)
        .await;

    let result = setup.appointments.get_appointments_by_date(march_15()).await;

    assert_matches!(result, Err(AppointmentError::DatabaseError(_)));
}

#[tokio::test]
async fn malformed_rows_become_database_errors() {
    let setup = TestSetup::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "only-an-id" }])))
        .mount(&setup.mock_server)
        .await;

    let result = setup.appointments.get_appointments_by_date(march_15()).await;

    assert_matches!(result, Err(AppointmentError::DatabaseError(msg)) if msg.contains("appointments"));
}

#[tokio::test]
async fn detector_fails_closed_when_supabase_is_down() {
    let setup = TestSetup::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&setup.mock_server)
        .await;

    let detector = ConflictDetectionService::with_store(setup.appointments.clone(), 60);
    let result = detector.check_conflicts(&ConflictCheckRequest {
        date: march_15(),
        start_time: "10:00".to_string(),
        end_time: "11:00".to_string(),
        psychologist_email: "dr@x.com".to_string(),
        room_id: "A".to_string(),
        patient_name: Some("Ana".to_string()),
        exclude_appointment_id: None,
    }).await;

    assert!(result.has_conflicts);
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].conflict_type, ConflictType::TimeOverlap);
}

#[tokio::test]
async fn insert_returns_the_stored_representation() {
    let setup = TestSetup::new().await;
    let row = MockSupabaseResponses::appointment_response("2024-03-15", "10:00", "11:00", "A", "dr@x.com", "Ana");

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(header("Prefer", "return=representation"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row.clone()])))
        .expect(1)
        .mount(&setup.mock_server)
        .await;

    let appointment = serde_json::from_value(row).unwrap();
    let stored = setup.appointments.insert_appointment(appointment).await.unwrap();

    assert_eq!(stored.room_id, "A");
    assert_eq!(stored.patient_name, "Ana");
}

#[tokio::test]
async fn update_of_missing_row_is_not_found() {
    let setup = TestSetup::new().await;
    let row = MockSupabaseResponses::appointment_response("2024-03-15", "10:00", "11:00", "A", "dr@x.com", "Ana");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&setup.mock_server)
        .await;

    let appointment = serde_json::from_value(row).unwrap();
    let result = setup.appointments.update_appointment(appointment).await;

    assert_matches!(result, Err(AppointmentError::NotFound));
}

#[tokio::test]
async fn update_clears_the_legacy_time_column() {
    let setup = TestSetup::new().await;
    let row = MockSupabaseResponses::appointment_response("2024-03-15", "23:30", "24:00", "B", "dr@x.com", "Ana");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({
            "appointment_time": null,
            "start_time": "23:30",
            "end_time": "24:00",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row.clone()])))
        .expect(1)
        .mount(&setup.mock_server)
        .await;

    let appointment = serde_json::from_value(row).unwrap();
    let stored = setup.appointments.update_appointment(appointment).await.unwrap();

    assert_eq!(stored.room_id, "B");
    assert_eq!(stored.time_range(60).unwrap().to_string(), "23:30-24:00");
}

#[tokio::test]
async fn reads_rooms() {
    let setup = TestSetup::new().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/rooms"))
        .and(query_param("order", "name.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::room_response("A", "Room A", true),
            MockSupabaseResponses::room_response("B", "Room B", false),
        ])))
        .mount(&setup.mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/rooms"))
        .and(query_param("id", "eq.B"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::room_response("B", "Room B", false),
        ])))
        .mount(&setup.mock_server)
        .await;

    let rooms = setup.rooms.get_all_rooms().await.unwrap();
    assert_eq!(rooms.len(), 2);
    assert!(rooms[0].is_available);
    assert!(!rooms[1].is_available);

    let room = setup.rooms.get_room("B").await.unwrap().unwrap();
    assert_eq!(room.id, "B");
    assert_eq!(room.name, "Room B");
}
