use std::sync::Arc;

use tracing::{info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::Room;
use crate::store::{
    AppointmentStore, InMemoryStore, RoomStore, SupabaseAppointmentStore, SupabaseRoomStore,
};

/// Shared handler state: configuration plus the injected data-access capabilities
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub rooms: Arc<dyn RoomStore>,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        appointments: Arc<dyn AppointmentStore>,
        rooms: Arc<dyn RoomStore>,
    ) -> Self {
        Self {
            config,
            appointments,
            rooms,
        }
    }

    /// Supabase-backed stores when configured, otherwise a process-local store
    pub fn from_config(config: AppConfig) -> Self {
        let config = Arc::new(config);

        if config.is_configured() {
            info!("Using Supabase stores at {}", config.supabase_url);
            let supabase = Arc::new(SupabaseClient::new(&config));
            Self::new(
                config,
                Arc::new(SupabaseAppointmentStore::new(supabase.clone())),
                Arc::new(SupabaseRoomStore::new(supabase)),
            )
        } else {
            warn!("Supabase not configured, falling back to in-memory store with rooms {:?}", config.dev_rooms);
            let rooms = config.dev_rooms
                .iter()
                .map(|id| Room::new(id, &format!("Room {}", id), true))
                .collect();
            let store = Arc::new(InMemoryStore::with_rooms(rooms));
            Self::new(config, store.clone(), store)
        }
    }

    pub fn default_duration_minutes(&self) -> u32 {
        self.config.default_appointment_duration_minutes
    }
}
