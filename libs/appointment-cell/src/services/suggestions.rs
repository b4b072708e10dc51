use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};
use tracing::{debug, warn};

use crate::models::{
    AlternativeSuggestion, AlternativesRequest, AppointmentError, SuggestionType, Urgency,
};
use crate::services::availability::RoomAvailabilityService;
use crate::services::conflict::ConflictDetectionService;
use crate::services::time::TimeRange;
use crate::state::AppState;
use crate::store::{AppointmentStore, RoomStore};

pub const MAX_SUGGESTIONS: usize = 6;
pub const MAX_TIME_SUGGESTIONS: usize = 5;
pub const MAX_DAY_SUGGESTIONS: usize = 3;
pub const DAY_SEARCH_RADIUS: i64 = 3;

const WORKDAY_START_HOUR: u32 = 8;
const WORKDAY_END_HOUR: u32 = 18;
const SLOT_MINUTES: u32 = 60;

pub struct AlternativeSuggestionService {
    detector: ConflictDetectionService,
    availability: RoomAvailabilityService,
    today: Option<NaiveDate>,
}

impl AlternativeSuggestionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            detector: ConflictDetectionService::new(state),
            availability: RoomAvailabilityService::new(state),
            today: None,
        }
    }

    pub fn with_stores(
        appointments: Arc<dyn AppointmentStore>,
        rooms: Arc<dyn RoomStore>,
        default_duration_minutes: u32,
    ) -> Self {
        Self {
            detector: ConflictDetectionService::with_store(appointments.clone(), default_duration_minutes),
            availability: RoomAvailabilityService::with_stores(appointments, rooms, default_duration_minutes),
            today: None,
        }
    }

    /// Pin the date used to drop past days from the cross-day fallback
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Propose conflict-free substitutes for a requested slot, best first.
    ///
    /// Suggestions are advisory, so any failure yields an empty list instead of an error.
    pub async fn suggest_alternatives(&self, request: &AlternativesRequest) -> Vec<AlternativeSuggestion> {
        match self.collect(request).await {
            Ok(mut suggestions) => {
                // stable sort keeps discovery order within an urgency band
                suggestions.sort_by(|a, b| b.urgency.cmp(&a.urgency));
                suggestions.truncate(MAX_SUGGESTIONS);
                suggestions
            }
            Err(e) => {
                warn!("Could not compute alternatives for {} {}-{}: {}",
                      request.date, request.start_time, request.end_time, e);
                Vec::new()
            }
        }
    }

    async fn collect(&self, request: &AlternativesRequest) -> Result<Vec<AlternativeSuggestion>, AppointmentError> {
        let original = TimeRange::parse(&request.start_time, &request.end_time)
            .ok_or_else(|| AppointmentError::InvalidTime(format!(
                "{}-{} is not a valid time range", request.start_time, request.end_time
            )))?;

        let mut suggestions = self.alternative_rooms(request, original).await?;
        suggestions.extend(self.alternative_times(request, original).await);

        if suggestions.is_empty() {
            suggestions = self.alternative_days(request, original).await;
        }

        debug!("Found {} alternatives for {} {}", suggestions.len(), request.date, original);
        Ok(suggestions)
    }

    async fn alternative_rooms(
        &self,
        request: &AlternativesRequest,
        original: TimeRange,
    ) -> Result<Vec<AlternativeSuggestion>, AppointmentError> {
        let rooms = self.availability.get_available_rooms(
            request.date,
            &request.start_time,
            request.exclude_appointment_id.as_deref(),
        ).await?;

        let mut suggestions = Vec::new();
        for room in rooms.into_iter().filter(|room| room.id != request.room_id) {
            let probe = request.probe(&room.id, request.date, original);
            if self.detector.check_conflicts(&probe).await.has_conflicts {
                continue;
            }

            suggestions.push(AlternativeSuggestion {
                suggestion_type: SuggestionType::AlternativeRoom,
                message: format!("{} is free at the requested time ({})", room.name, original),
                room_id: room.id,
                room_name: Some(room.name),
                date: request.date,
                start_time: original.start_label(),
                end_time: original.end_label(),
                urgency: Urgency::Medium,
            });
        }

        Ok(suggestions)
    }

    async fn alternative_times(
        &self,
        request: &AlternativesRequest,
        original: TimeRange,
    ) -> Vec<AlternativeSuggestion> {
        let mut suggestions = Vec::new();

        for slot in hourly_slots() {
            if suggestions.len() >= MAX_TIME_SUGGESTIONS {
                break;
            }
            if slot.start == original.start {
                continue;
            }

            let probe = request.probe(&request.room_id, request.date, slot);
            if self.detector.check_conflicts(&probe).await.has_conflicts {
                continue;
            }

            suggestions.push(AlternativeSuggestion {
                suggestion_type: SuggestionType::AlternativeTime,
                room_id: request.room_id.clone(),
                room_name: None,
                date: request.date,
                start_time: slot.start_label(),
                end_time: slot.end_label(),
                message: format!("Same room is free from {}", slot),
                urgency: Urgency::for_distance(slot.start.abs_diff(original.start)),
            });
        }

        suggestions
    }

    async fn alternative_days(
        &self,
        request: &AlternativesRequest,
        original: TimeRange,
    ) -> Vec<AlternativeSuggestion> {
        let mut suggestions = Vec::new();

        for date in nearby_dates(request.date, self.today(), DAY_SEARCH_RADIUS) {
            if suggestions.len() >= MAX_DAY_SUGGESTIONS {
                break;
            }

            let probe = request.probe(&request.room_id, date, original);
            if self.detector.check_conflicts(&probe).await.has_conflicts {
                continue;
            }

            suggestions.push(AlternativeSuggestion {
                suggestion_type: SuggestionType::AlternativeTime,
                room_id: request.room_id.clone(),
                room_name: None,
                date,
                start_time: original.start_label(),
                end_time: original.end_label(),
                message: format!("Same time available on {}", day_label(date)),
                urgency: Urgency::Low,
            });
        }

        suggestions
    }
}

/// One-hour slots covering the working day, 08:00-09:00 through 17:00-18:00
pub fn hourly_slots() -> impl Iterator<Item = TimeRange> {
    (WORKDAY_START_HOUR..WORKDAY_END_HOUR)
        .filter_map(|hour| TimeRange::new(hour * 60, hour * 60 + SLOT_MINUTES))
}

/// Dates within `radius` days of `date`, skipping days before `today`, ascending
pub fn nearby_dates(date: NaiveDate, today: NaiveDate, radius: i64) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for offset in 1..=radius {
        if let Some(future) = date.checked_add_signed(Duration::days(offset)) {
            dates.push(future);
        }
        if let Some(past) = date.checked_sub_signed(Duration::days(offset)) {
            if past >= today {
                dates.push(past);
            }
        }
    }
    dates.sort();
    dates
}

fn day_label(date: NaiveDate) -> String {
    date.format("%A, %B %-d").to_string()
}
