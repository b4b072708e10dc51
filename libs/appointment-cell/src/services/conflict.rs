use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::models::{
    AppointmentError, ConflictCheckRequest, ConflictDetail, ConflictResult, ConflictType,
};
use crate::services::time::TimeRange;
use crate::state::AppState;
use crate::store::AppointmentStore;

pub struct ConflictDetectionService {
    appointments: Arc<dyn AppointmentStore>,
    default_duration_minutes: u32,
}

impl ConflictDetectionService {
    pub fn new(state: &AppState) -> Self {
        Self::with_store(state.appointments.clone(), state.default_duration_minutes())
    }

    pub fn with_store(appointments: Arc<dyn AppointmentStore>, default_duration_minutes: u32) -> Self {
        Self {
            appointments,
            default_duration_minutes,
        }
    }

    /// Check a candidate appointment against everything booked on the same day.
    ///
    /// Each overlapping appointment contributes one entry per shared dimension
    /// (room, psychologist, patient). Failures fail closed: a store error or an
    /// unreadable candidate range comes back as a single `time_overlap` conflict.
    pub async fn check_conflicts(&self, request: &ConflictCheckRequest) -> ConflictResult {
        match self.scan(request).await {
            Ok(conflicts) => {
                if !conflicts.is_empty() {
                    warn!("Conflict detected for room {} / {} on {} {}-{} - {} conflicts",
                          request.room_id, request.psychologist_email, request.date,
                          request.start_time, request.end_time, conflicts.len());
                }
                ConflictResult::from_conflicts(conflicts)
            }
            Err(e) => {
                error!("Conflict check failed for {} {}-{}: {}",
                       request.date, request.start_time, request.end_time, e);
                ConflictResult::failed_closed(&e.to_string())
            }
        }
    }

    async fn scan(&self, request: &ConflictCheckRequest) -> Result<Vec<ConflictDetail>, AppointmentError> {
        debug!("Checking conflicts on {} from {} to {} in room {}",
               request.date, request.start_time, request.end_time, request.room_id);

        let candidate = TimeRange::parse(&request.start_time, &request.end_time)
            .ok_or_else(|| AppointmentError::InvalidTime(format!(
                "{}-{} is not a valid time range", request.start_time, request.end_time
            )))?;

        let existing = self.appointments.get_appointments_by_date(request.date).await?;

        let patient_name = request.patient_name.as_deref().filter(|name| !name.is_empty());
        let mut conflicts = Vec::new();

        for appointment in &existing {
            if request.exclude_appointment_id.as_deref() == Some(appointment.id.as_str()) {
                continue;
            }
            if !appointment.is_active() {
                continue;
            }

            let Some(range) = appointment.time_range(self.default_duration_minutes) else {
                debug!("Skipping appointment {} with no usable time", appointment.id);
                continue;
            };
            if !candidate.overlaps(&range) {
                continue;
            }

            if appointment.room_id == request.room_id {
                conflicts.push(ConflictDetail::for_appointment(ConflictType::Room, appointment, range));
            }
            if appointment.psychologist_email == request.psychologist_email {
                conflicts.push(ConflictDetail::for_appointment(ConflictType::Psychologist, appointment, range));
            }
            if patient_name.is_some_and(|name| appointment.is_same_patient(name)) {
                conflicts.push(ConflictDetail::for_appointment(ConflictType::Patient, appointment, range));
            }
        }

        Ok(conflicts)
    }
}
