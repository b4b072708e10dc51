// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_models::error::AppError;

use crate::models::{
    AlternativesRequest, AppointmentError, AvailableRoomsQuery, BookAppointmentRequest,
    ConflictCheckRequest, ConflictResult, DateQuery, RescheduleAppointmentRequest,
    UpdateStatusRequest,
};
use crate::services::{
    AlternativeSuggestionService, AppointmentBookingService, ConflictDetectionService,
    RoomAvailabilityService,
};
use crate::state::AppState;

// ==============================================================================
// SCHEDULING CHECKS
// ==============================================================================

#[axum::debug_handler]
pub async fn check_appointment_conflicts(
    State(state): State<Arc<AppState>>,
    Query(request): Query<ConflictCheckRequest>,
) -> Json<ConflictResult> {
    let detector = ConflictDetectionService::new(&state);
    Json(detector.check_conflicts(&request).await)
}

#[axum::debug_handler]
pub async fn suggest_alternatives(
    State(state): State<Arc<AppState>>,
    Query(request): Query<AlternativesRequest>,
) -> Json<Value> {
    let suggester = AlternativeSuggestionService::new(&state);
    let alternatives = suggester.suggest_alternatives(&request).await;

    Json(json!({
        "count": alternatives.len(),
        "alternatives": alternatives,
    }))
}

// ==============================================================================
// APPOINTMENT HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    match booking_service.book_appointment(request).await {
        Ok(appointment) => Ok((StatusCode::CREATED, Json(json!({
            "success": true,
            "appointment": appointment,
            "message": "Appointment booked successfully"
        })))),
        Err(AppointmentError::ConflictDetected(report)) => Ok((StatusCode::CONFLICT, Json(json!({
            "success": false,
            "message": "Appointment conflicts with existing booking",
            "conflicts": report.conflicts.conflicts,
            "alternatives": report.alternatives
        })))),
        Err(e) => Err(map_appointment_error(e)),
    }
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    let appointments = booking_service.list_appointments_by_date(query.date).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "date": query.date,
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service.get_appointment(&appointment_id).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<String>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    match booking_service.reschedule_appointment(&appointment_id, request).await {
        Ok(appointment) => Ok((StatusCode::OK, Json(json!({
            "success": true,
            "appointment": appointment,
            "message": "Appointment rescheduled successfully"
        })))),
        Err(AppointmentError::ConflictDetected(report)) => Ok((StatusCode::CONFLICT, Json(json!({
            "success": false,
            "message": "New time conflicts with existing booking",
            "conflicts": report.conflicts.conflicts,
            "alternatives": report.alternatives
        })))),
        Err(e) => Err(map_appointment_error(e)),
    }
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);
    let appointment = booking_service.update_status(&appointment_id, request.status).await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment
    })))
}

// ==============================================================================
// ROOM HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let availability = RoomAvailabilityService::new(&state);
    let rooms = availability.get_all_rooms().await.map_err(map_appointment_error)?;

    Ok(Json(json!({ "rooms": rooms })))
}

#[axum::debug_handler]
pub async fn get_available_rooms(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailableRoomsQuery>,
) -> Result<Json<Value>, AppError> {
    let availability = RoomAvailabilityService::new(&state);
    let rooms = availability.get_available_rooms(
        query.date,
        &query.time,
        query.exclude_appointment_id.as_deref(),
    ).await.map_err(map_appointment_error)?;

    Ok(Json(json!({
        "date": query.date,
        "time": query.time,
        "rooms": rooms
    })))
}

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::RoomNotFound(room_id) => AppError::NotFound(format!("Room {} not found", room_id)),
        AppointmentError::InvalidTime(msg) => AppError::BadRequest(msg),
        AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
        AppointmentError::InvalidStatusTransition(status) => {
            AppError::BadRequest(format!("Cannot modify appointment in status: {}", status))
        }
        AppointmentError::ConflictDetected(_) => {
            AppError::Conflict("Appointment conflicts with existing booking".to_string())
        }
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}
