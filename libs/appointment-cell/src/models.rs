// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

use crate::services::time::TimeRange;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub appointment_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Legacy single-field time, only present on rows written before durations were tracked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_time: Option<String>,
    pub psychologist_email: String,
    pub room_id: String,
    pub patient_name: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// Canonical time range of this appointment.
    ///
    /// Rows carrying both `start_time` and `end_time` use them as-is. Rows with only a
    /// single timestamp (`start_time` or the legacy `appointment_time`) are given
    /// `default_duration_minutes`. Returns `None` when no usable time is stored.
    pub fn time_range(&self, default_duration_minutes: u32) -> Option<TimeRange> {
        if let (Some(start), Some(end)) = (&self.start_time, &self.end_time) {
            if let Some(range) = TimeRange::parse(start, end) {
                return Some(range);
            }
        }

        let single = self.start_time.as_deref().or(self.appointment_time.as_deref())?;
        TimeRange::starting_at(single, default_duration_minutes)
    }

    /// Cancelled appointments never block a slot
    pub fn is_active(&self) -> bool {
        self.status != AppointmentStatus::Cancelled
    }

    pub fn is_same_patient(&self, patient_name: &str) -> bool {
        self.patient_name.to_lowercase() == patient_name.to_lowercase()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: String,
    pub name: String,
    /// Administrative switch, independent of bookings
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Room {
    pub fn new(id: &str, name: &str, is_available: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            is_available,
            created_at: None,
            updated_at: None,
        }
    }
}

// ==============================================================================
// CONFLICT DETECTION MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictCheckRequest {
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub psychologist_email: String,
    pub room_id: String,
    /// `None` (or empty) skips the patient dimension
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub exclude_appointment_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    Room,
    Psychologist,
    Patient,
    /// Synthetic conflict reported when the check itself could not complete
    TimeOverlap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConflictDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicting_patient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicting_psychologist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicting_room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicting_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictDetail {
    #[serde(rename = "type")]
    pub conflict_type: ConflictType,
    pub message: String,
    pub conflicting_appointment: Option<Appointment>,
    pub details: ConflictDetails,
}

impl ConflictDetail {
    pub fn for_appointment(conflict_type: ConflictType, appointment: &Appointment, range: TimeRange) -> Self {
        let message = match conflict_type {
            ConflictType::Room => format!(
                "Room {} is already booked from {}",
                appointment.room_id, range
            ),
            ConflictType::Psychologist => format!(
                "{} already has an appointment from {}",
                appointment.psychologist_email, range
            ),
            ConflictType::Patient => format!(
                "Patient {} already has an appointment from {}",
                appointment.patient_name, range
            ),
            ConflictType::TimeOverlap => format!("Time overlaps with an appointment from {}", range),
        };

        Self {
            conflict_type,
            message,
            conflicting_appointment: Some(appointment.clone()),
            details: ConflictDetails {
                conflicting_patient: Some(appointment.patient_name.clone()),
                conflicting_psychologist: Some(appointment.psychologist_email.clone()),
                conflicting_room: Some(appointment.room_id.clone()),
                conflicting_time: Some(range.to_string()),
                error: None,
            },
        }
    }

    pub fn check_failed(reason: &str) -> Self {
        Self {
            conflict_type: ConflictType::TimeOverlap,
            message: "Could not verify availability, treating the slot as taken".to_string(),
            conflicting_appointment: None,
            details: ConflictDetails {
                error: Some(reason.to_string()),
                ..ConflictDetails::default()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictResult {
    pub has_conflicts: bool,
    pub conflicts: Vec<ConflictDetail>,
}

impl ConflictResult {
    pub fn from_conflicts(conflicts: Vec<ConflictDetail>) -> Self {
        Self {
            has_conflicts: !conflicts.is_empty(),
            conflicts,
        }
    }

    pub fn failed_closed(reason: &str) -> Self {
        Self::from_conflicts(vec![ConflictDetail::check_failed(reason)])
    }

    pub fn count_of(&self, conflict_type: ConflictType) -> usize {
        self.conflicts.iter().filter(|c| c.conflict_type == conflict_type).count()
    }
}

// ==============================================================================
// ALTERNATIVE SUGGESTION MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativesRequest {
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub psychologist_email: String,
    pub room_id: String,
    #[serde(default)]
    pub exclude_appointment_id: Option<String>,
}

impl AlternativesRequest {
    pub(crate) fn probe(&self, room_id: &str, date: NaiveDate, range: TimeRange) -> ConflictCheckRequest {
        ConflictCheckRequest {
            date,
            start_time: range.start_label(),
            end_time: range.end_label(),
            psychologist_email: self.psychologist_email.clone(),
            room_id: room_id.to_string(),
            patient_name: None,
            exclude_appointment_id: self.exclude_appointment_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionType {
    AlternativeRoom,
    AlternativeTime,
}

/// Ordering follows rank: `Low < Medium < High`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub fn rank(&self) -> u8 {
        match self {
            Urgency::Low => 1,
            Urgency::Medium => 2,
            Urgency::High => 3,
        }
    }

    /// Closeness of an alternative start time to the requested one
    pub fn for_distance(distance_minutes: u32) -> Self {
        match distance_minutes {
            0..=60 => Urgency::High,
            61..=120 => Urgency::Medium,
            _ => Urgency::Low,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeSuggestion {
    #[serde(rename = "type")]
    pub suggestion_type: SuggestionType,
    pub room_id: String,
    pub room_name: Option<String>,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub message: String,
    pub urgency: Urgency,
}

// ==============================================================================
// BOOKING MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub appointment_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub psychologist_email: String,
    pub room_id: String,
    pub patient_name: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub appointment_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub room_id: Option<String>,
    pub psychologist_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableRoomsQuery {
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub exclude_appointment_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

/// Why a booking was refused: the detector output plus what could be booked instead
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictReport {
    pub conflicts: ConflictResult,
    pub alternatives: Vec<AlternativeSuggestion>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Invalid appointment time: {0}")]
    InvalidTime(String),

    #[error("Appointment cannot be modified in current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Appointment conflicts with existing booking")]
    ConflictDetected(Box<ConflictReport>),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
