// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put, patch},
};

use crate::handlers;
use crate::state::AppState;

pub fn appointment_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment).get(handlers::list_appointments))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/reschedule", put(handlers::reschedule_appointment))
        .route("/{appointment_id}/status", patch(handlers::update_appointment_status))

        // Scheduling checks
        .route("/conflicts/check", get(handlers::check_appointment_conflicts))
        .route("/alternatives", get(handlers::suggest_alternatives))
        .with_state(state)
}

pub fn room_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::list_rooms))
        .route("/available", get(handlers::get_available_rooms))
        .with_state(state)
}
