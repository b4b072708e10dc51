use std::env;
use tracing::warn;

pub const DEFAULT_APPOINTMENT_DURATION_MINUTES: u32 = 60;
pub const DEFAULT_SERVER_PORT: u16 = 3000;
/// Room ids seeded into the in-memory store when Supabase is not configured
pub const DEFAULT_DEV_ROOMS: &[&str] = &["A", "B", "C"];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_service_role_key: Option<String>,
    /// Duration applied to legacy appointments that only store a single `appointment_time`
    pub default_appointment_duration_minutes: u32,
    pub server_port: u16,
    /// Rooms available in development mode, from the comma-separated `DEV_ROOMS`
    pub dev_rooms: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_service_role_key: None,
            default_appointment_duration_minutes: DEFAULT_APPOINTMENT_DURATION_MINUTES,
            server_port: DEFAULT_SERVER_PORT,
            dev_rooms: default_dev_rooms(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_service_role_key: env::var("SUPABASE_SERVICE_ROLE_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            default_appointment_duration_minutes: parse_or_default(
                "DEFAULT_APPOINTMENT_DURATION_MINUTES",
                DEFAULT_APPOINTMENT_DURATION_MINUTES,
            ),
            server_port: parse_or_default("SERVER_PORT", DEFAULT_SERVER_PORT),
            dev_rooms: env::var("DEV_ROOMS")
                .map(|raw| parse_room_list(&raw))
                .ok()
                .filter(|rooms| !rooms.is_empty())
                .unwrap_or_else(default_dev_rooms),
        };

        if !config.is_configured() {
            warn!("Supabase not configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }
}

fn default_dev_rooms() -> Vec<String> {
    DEFAULT_DEV_ROOMS.iter().map(|id| id.to_string()).collect()
}

fn parse_room_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
