//! Data-access seams used by the scheduling services.
//!
//! Reads are plain async calls with no caching and no locking across calls, so a
//! conflict check followed by a write is not atomic.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{Appointment, AppointmentError, Room};

pub mod memory;
pub mod supabase;

pub use memory::InMemoryStore;
pub use supabase::{SupabaseAppointmentStore, SupabaseRoomStore};

#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn get_appointments_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError>;

    async fn get_appointment(&self, id: &str) -> Result<Option<Appointment>, AppointmentError>;

    async fn insert_appointment(&self, appointment: Appointment) -> Result<Appointment, AppointmentError>;

    async fn update_appointment(&self, appointment: Appointment) -> Result<Appointment, AppointmentError>;
}

#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn get_all_rooms(&self) -> Result<Vec<Room>, AppointmentError>;

    async fn get_room(&self, id: &str) -> Result<Option<Room>, AppointmentError>;
}
