pub mod availability;
pub mod booking;
pub mod conflict;
pub mod suggestions;
pub mod time;

pub use availability::RoomAvailabilityService;
pub use booking::AppointmentBookingService;
pub use conflict::ConflictDetectionService;
pub use suggestions::AlternativeSuggestionService;
