use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError, Room};
use crate::store::{AppointmentStore, RoomStore};

pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn fetch(&self, path: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            path,
            None,
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        parse_rows(result, "appointments")
    }

    async fn write(&self, method: Method, path: &str, body: Value) -> Result<Option<Appointment>, AppointmentError> {

        let result: Vec<Value> = self.supabase.request_with_headers(
            method,
            path,
            None,
            Some(body),
            Some(SupabaseClient::representation_headers()),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(parse_rows::<Appointment>(result, "appointments")?.into_iter().next())
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn get_appointments_by_date(&self, date: NaiveDate) -> Result<Vec<Appointment>, AppointmentError> {
        debug!("Fetching appointments for {}", date);
        let path = format!(
            "/rest/v1/appointments?appointment_date=eq.{}&order=start_time.asc",
            date.format("%Y-%m-%d")
        );
        self.fetch(&path).await
    }

    async fn get_appointment(&self, id: &str) -> Result<Option<Appointment>, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", urlencoding::encode(id));
        Ok(self.fetch(&path).await?.into_iter().next())
    }

    async fn insert_appointment(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        debug!("Inserting appointment {}", appointment.id);
        self.write(Method::POST, "/rest/v1/appointments", encode(&appointment)?)
            .await?
            .ok_or_else(|| AppointmentError::DatabaseError("Failed to create appointment".to_string()))
    }

    async fn update_appointment(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        debug!("Updating appointment {}", appointment.id);
        let path = format!("/rest/v1/appointments?id=eq.{}", urlencoding::encode(&appointment.id));
        let mut body = encode(&appointment)?;
        // PATCH only touches the keys it sends, so a cleared legacy time must go out as null
        if appointment.appointment_time.is_none() {
            body["appointment_time"] = Value::Null;
        }
        self.write(Method::PATCH, &path, body)
            .await?
            .ok_or(AppointmentError::NotFound)
    }
}

pub struct SupabaseRoomStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseRoomStore {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    async fn fetch(&self, path: &str) -> Result<Vec<Room>, AppointmentError> {
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            path,
            None,
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        parse_rows(result, "rooms")
    }
}

#[async_trait]
impl RoomStore for SupabaseRoomStore {
    async fn get_all_rooms(&self) -> Result<Vec<Room>, AppointmentError> {
        self.fetch("/rest/v1/rooms?order=name.asc").await
    }

    async fn get_room(&self, id: &str) -> Result<Option<Room>, AppointmentError> {
        let path = format!("/rest/v1/rooms?id=eq.{}", urlencoding::encode(id));
        Ok(self.fetch(&path).await?.into_iter().next())
    }
}

fn encode(appointment: &Appointment) -> Result<Value, AppointmentError> {
    serde_json::to_value(appointment)
        .map_err(|e| AppointmentError::DatabaseError(format!("Failed to encode appointment: {}", e)))
}

fn parse_rows<T: DeserializeOwned>(rows: Vec<Value>, table: &str) -> Result<Vec<T>, AppointmentError> {
    rows.into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse {}: {}", table, e)))
}
