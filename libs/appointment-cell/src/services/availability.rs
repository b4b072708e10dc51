use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::models::{AppointmentError, Room};
use crate::services::time::parse_minutes;
use crate::state::AppState;
use crate::store::{AppointmentStore, RoomStore};

pub struct RoomAvailabilityService {
    appointments: Arc<dyn AppointmentStore>,
    rooms: Arc<dyn RoomStore>,
    default_duration_minutes: u32,
}

impl RoomAvailabilityService {
    pub fn new(state: &AppState) -> Self {
        Self::with_stores(
            state.appointments.clone(),
            state.rooms.clone(),
            state.default_duration_minutes(),
        )
    }

    pub fn with_stores(
        appointments: Arc<dyn AppointmentStore>,
        rooms: Arc<dyn RoomStore>,
        default_duration_minutes: u32,
    ) -> Self {
        Self {
            appointments,
            rooms,
            default_duration_minutes,
        }
    }

    pub async fn get_all_rooms(&self) -> Result<Vec<Room>, AppointmentError> {
        self.rooms.get_all_rooms().await
    }

    /// Rooms switched on that nobody occupies at `time` on `date`
    pub async fn get_available_rooms(
        &self,
        date: NaiveDate,
        time: &str,
        exclude_appointment_id: Option<&str>,
    ) -> Result<Vec<Room>, AppointmentError> {
        let minute = parse_minutes(time)
            .ok_or_else(|| AppointmentError::InvalidTime(format!("{} is not a valid time", time)))?;

        let rooms = self.rooms.get_all_rooms().await?;
        let appointments = self.appointments.get_appointments_by_date(date).await?;

        let occupied: HashSet<&str> = appointments
            .iter()
            .filter(|apt| apt.is_active() && exclude_appointment_id != Some(apt.id.as_str()))
            .filter(|apt| {
                apt.time_range(self.default_duration_minutes)
                    .is_some_and(|range| range.contains(minute))
            })
            .map(|apt| apt.room_id.as_str())
            .collect();

        let available: Vec<Room> = rooms
            .into_iter()
            .filter(|room| room.is_available && !occupied.contains(room.id.as_str()))
            .collect();

        debug!("{} rooms available on {} at {}", available.len(), date, time);
        Ok(available)
    }
}
