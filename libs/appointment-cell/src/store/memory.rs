use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{Appointment, AppointmentError, Room};
use crate::store::{AppointmentStore, RoomStore};

/// Process-local store backing both traits.
///
/// Used when Supabase is not configured and as the fake collaborator in tests.
/// `set_failing(true)` makes every read and write return a database error.
#[derive(Default)]
pub struct InMemoryStore {
    appointments: RwLock<Vec<Appointment>>,
    rooms: RwLock<Vec<Room>>,
    failing: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rooms(rooms: Vec<Room>) -> Self {
        Self {
            rooms: RwLock::new(rooms),
            ..Self::default()
        }
    }

    pub async fn add_room(&self, room: Room) {
        self.rooms.write().await.push(room);
    }

    pub async fn add_appointment(&self, appointment: Appointment) {
        self.appointments.write().await.push(appointment);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AppointmentError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppointmentError::DatabaseError("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AppointmentStore for InMemoryStore {
    async fn get_appointments_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        self.check_available()?;
        let appointments = self.appointments.read().await;
        Ok(appointments
            .iter()
            .filter(|apt| apt.appointment_date == date)
            .cloned()
            .collect())
    }

    async fn get_appointment(&self, id: &str) -> Result<Option<Appointment>, AppointmentError> {
        self.check_available()?;
        let appointments = self.appointments.read().await;
        Ok(appointments.iter().find(|apt| apt.id == id).cloned())
    }

    async fn insert_appointment(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        self.check_available()?;
        let mut appointments = self.appointments.write().await;
        if appointments.iter().any(|apt| apt.id == appointment.id) {
            return Err(AppointmentError::ValidationError(format!(
                "Appointment {} already exists",
                appointment.id
            )));
        }
        debug!("Storing appointment {} in memory", appointment.id);
        appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        self.check_available()?;
        let mut appointments = self.appointments.write().await;
        let slot = appointments
            .iter_mut()
            .find(|apt| apt.id == appointment.id)
            .ok_or(AppointmentError::NotFound)?;
        *slot = appointment.clone();
        Ok(appointment)
    }
}

#[async_trait]
impl RoomStore for InMemoryStore {
    async fn get_all_rooms(&self) -> Result<Vec<Room>, AppointmentError> {
        self.check_available()?;
        Ok(self.rooms.read().await.clone())
    }

    async fn get_room(&self, id: &str) -> Result<Option<Room>, AppointmentError> {
        self.check_available()?;
        Ok(self.rooms.read().await.iter().find(|room| room.id == id).cloned())
    }
}
