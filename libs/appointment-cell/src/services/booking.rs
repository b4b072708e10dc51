use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    AlternativesRequest, Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest,
    ConflictCheckRequest, ConflictReport, RescheduleAppointmentRequest, Room,
};
use crate::services::conflict::ConflictDetectionService;
use crate::services::suggestions::AlternativeSuggestionService;
use crate::services::time::{parse_end_minutes, parse_minutes, TimeRange};
use crate::state::AppState;
use crate::store::{AppointmentStore, RoomStore};

/// Books and reschedules appointments behind the conflict detector.
///
/// The check and the write are two separate store calls. Two requests racing for
/// the same slot can both pass the check; only the persistence layer (for example a
/// unique constraint on room, date and start time) can close that window.
pub struct AppointmentBookingService {
    appointments: Arc<dyn AppointmentStore>,
    rooms: Arc<dyn RoomStore>,
    detector: ConflictDetectionService,
    suggester: AlternativeSuggestionService,
    default_duration_minutes: u32,
}

struct Slot {
    date: NaiveDate,
    range: TimeRange,
    room_id: String,
    psychologist_email: String,
    patient_name: String,
}

impl AppointmentBookingService {
    pub fn new(state: &AppState) -> Self {
        Self {
            appointments: state.appointments.clone(),
            rooms: state.rooms.clone(),
            detector: ConflictDetectionService::new(state),
            suggester: AlternativeSuggestionService::new(state),
            default_duration_minutes: state.default_duration_minutes(),
        }
    }

    pub async fn book_appointment(&self, request: BookAppointmentRequest) -> Result<Appointment, AppointmentError> {
        debug!("Booking appointment for {} with {} on {}",
               request.patient_name, request.psychologist_email, request.appointment_date);

        let range = parse_range(&request.start_time, &request.end_time)?;
        require_non_empty("patient_name", &request.patient_name)?;
        require_non_empty("psychologist_email", &request.psychologist_email)?;

        let slot = Slot {
            date: request.appointment_date,
            range,
            room_id: request.room_id,
            psychologist_email: request.psychologist_email,
            patient_name: request.patient_name,
        };
        self.ensure_bookable(&slot, None).await?;

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            appointment_date: slot.date,
            start_time: Some(slot.range.start_label()),
            end_time: Some(slot.range.end_label()),
            appointment_time: None,
            psychologist_email: slot.psychologist_email,
            room_id: slot.room_id,
            patient_name: slot.patient_name,
            status: AppointmentStatus::Scheduled,
            notes: request.notes,
            created_at: Some(now),
            updated_at: Some(now),
        };

        let appointment = self.appointments.insert_appointment(appointment).await?;
        info!("Appointment {} booked in room {} on {} {}",
              appointment.id, appointment.room_id, appointment.appointment_date, range);
        Ok(appointment)
    }

    pub async fn reschedule_appointment(
        &self,
        appointment_id: &str,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.get_appointment(appointment_id).await?;
        if appointment.status.is_terminal() {
            return Err(AppointmentError::InvalidStatusTransition(appointment.status));
        }

        let range = self.rescheduled_range(
            appointment.time_range(self.default_duration_minutes),
            request.start_time.as_deref(),
            request.end_time.as_deref(),
        )?;

        let slot = Slot {
            date: request.appointment_date.unwrap_or(appointment.appointment_date),
            range,
            room_id: request.room_id.unwrap_or_else(|| appointment.room_id.clone()),
            psychologist_email: request.psychologist_email
                .unwrap_or_else(|| appointment.psychologist_email.clone()),
            patient_name: appointment.patient_name.clone(),
        };
        self.ensure_bookable(&slot, Some(appointment_id)).await?;

        appointment.appointment_date = slot.date;
        appointment.start_time = Some(slot.range.start_label());
        appointment.end_time = Some(slot.range.end_label());
        appointment.appointment_time = None;
        appointment.room_id = slot.room_id;
        appointment.psychologist_email = slot.psychologist_email;
        appointment.updated_at = Some(Utc::now());

        let appointment = self.appointments.update_appointment(appointment).await?;
        info!("Appointment {} rescheduled to {} {}", appointment.id, appointment.appointment_date, slot.range);
        Ok(appointment)
    }

    /// Status changes skip the conflict check; cancelling frees the slot
    pub async fn update_status(
        &self,
        appointment_id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.get_appointment(appointment_id).await?;
        if appointment.status.is_terminal() && appointment.status != status {
            return Err(AppointmentError::InvalidStatusTransition(appointment.status));
        }

        appointment.status = status;
        appointment.updated_at = Some(Utc::now());
        self.appointments.update_appointment(appointment).await
    }

    pub async fn get_appointment(&self, appointment_id: &str) -> Result<Appointment, AppointmentError> {
        self.appointments
            .get_appointment(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn list_appointments_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        let mut appointments = self.appointments.get_appointments_by_date(date).await?;
        let duration = self.default_duration_minutes;
        appointments.sort_by_key(|apt| apt.time_range(duration).map(|range| range.start));
        Ok(appointments)
    }

    /// Apply the requested bounds to the current range.
    ///
    /// A single bound keeps the current duration, or the default duration for rows
    /// without a usable range.
    fn rescheduled_range(
        &self,
        current: Option<TimeRange>,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<TimeRange, AppointmentError> {
        let duration = current
            .map(|range| range.end - range.start)
            .unwrap_or(self.default_duration_minutes);

        let range = match (start, end) {
            (Some(start), Some(end)) => return parse_range(start, end),
            (Some(start), None) => parse_minutes(start)
                .and_then(|start| TimeRange::new(start, start + duration)),
            (None, Some(end)) => parse_end_minutes(end)
                .and_then(|end| TimeRange::new(end.checked_sub(duration)?, end)),
            (None, None) => current,
        };

        range.ok_or_else(|| AppointmentError::InvalidTime(format!(
            "Cannot move a {} minute appointment to start {} / end {}",
            duration,
            start.unwrap_or("-"),
            end.unwrap_or("-"),
        )))
    }

    async fn ensure_bookable(&self, slot: &Slot, exclude_appointment_id: Option<&str>) -> Result<(), AppointmentError> {
        let room = self.find_room(&slot.room_id).await?;
        if !room.is_available {
            return Err(AppointmentError::ValidationError(format!(
                "Room {} is not available for booking", room.name
            )));
        }

        let check = ConflictCheckRequest {
            date: slot.date,
            start_time: slot.range.start_label(),
            end_time: slot.range.end_label(),
            psychologist_email: slot.psychologist_email.clone(),
            room_id: slot.room_id.clone(),
            patient_name: Some(slot.patient_name.clone()),
            exclude_appointment_id: exclude_appointment_id.map(str::to_string),
        };

        let conflicts = self.detector.check_conflicts(&check).await;
        if !conflicts.has_conflicts {
            return Ok(());
        }

        let alternatives = self.suggester.suggest_alternatives(&AlternativesRequest {
            date: check.date,
            start_time: check.start_time,
            end_time: check.end_time,
            psychologist_email: check.psychologist_email,
            room_id: check.room_id,
            exclude_appointment_id: check.exclude_appointment_id,
        }).await;

        warn!("Rejecting booking in room {} on {} {}: {} conflicts, {} alternatives",
              slot.room_id, slot.date, slot.range, conflicts.conflicts.len(), alternatives.len());

        Err(AppointmentError::ConflictDetected(Box::new(ConflictReport {
            conflicts,
            alternatives,
        })))
    }

    async fn find_room(&self, room_id: &str) -> Result<Room, AppointmentError> {
        self.rooms
            .get_room(room_id)
            .await?
            .ok_or_else(|| AppointmentError::RoomNotFound(room_id.to_string()))
    }
}

fn parse_range(start: &str, end: &str) -> Result<TimeRange, AppointmentError> {
    TimeRange::parse(start, end).ok_or_else(|| AppointmentError::InvalidTime(format!(
        "{}-{} must be two HH:MM times with the start before the end", start, end
    )))
}

fn require_non_empty(field: &str, value: &str) -> Result<(), AppointmentError> {
    if value.trim().is_empty() {
        return Err(AppointmentError::ValidationError(format!("{} is required", field)));
    }
    Ok(())
}
