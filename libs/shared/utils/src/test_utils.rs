use std::sync::Arc;
use serde_json::json;
use uuid::Uuid;

use shared_config::{AppConfig, DEFAULT_APPOINTMENT_DURATION_MINUTES, DEFAULT_SERVER_PORT};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub default_appointment_duration_minutes: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            default_appointment_duration_minutes: DEFAULT_APPOINTMENT_DURATION_MINUTES,
        }
    }
}

impl TestConfig {
    /// Point the config at a wiremock server
    pub fn with_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_service_role_key: None,
            default_appointment_duration_minutes: self.default_appointment_duration_minutes,
            server_port: DEFAULT_SERVER_PORT,
            dev_rooms: Vec::new(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn appointment_response(
        date: &str,
        start_time: &str,
        end_time: &str,
        room_id: &str,
        psychologist_email: &str,
        patient_name: &str,
    ) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "appointment_date": date,
            "start_time": start_time,
            "end_time": end_time,
            "appointment_time": null,
            "psychologist_email": psychologist_email,
            "room_id": room_id,
            "patient_name": patient_name,
            "status": "scheduled",
            "notes": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    /// Row written before start/end times were tracked
    pub fn legacy_appointment_response(
        date: &str,
        appointment_time: &str,
        room_id: &str,
        psychologist_email: &str,
        patient_name: &str,
    ) -> serde_json::Value {
        json!({
            "id": Uuid::new_v4().to_string(),
            "appointment_date": date,
            "appointment_time": appointment_time,
            "psychologist_email": psychologist_email,
            "room_id": room_id,
            "patient_name": patient_name,
            "status": "pending"
        })
    }

    pub fn room_response(id: &str, name: &str, is_available: bool) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "is_available": is_available,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(app_config.is_configured());
    }

    #[test]
    fn appointment_fixture_has_expected_fields() {
        let row = MockSupabaseResponses::appointment_response(
            "2024-03-15", "10:00", "11:00", "A", "dr@x.com", "Ana",
        );
        assert_eq!(row["room_id"], "A");
        assert_eq!(row["status"], "scheduled");
        assert!(row["id"].is_string());
    }
}
