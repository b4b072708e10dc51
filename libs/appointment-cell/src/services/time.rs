use std::fmt;

use chrono::{NaiveTime, Timelike};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Minutes since midnight for a wall-clock `HH:MM` (or `HH:MM:SS`) string
pub fn parse_minutes(value: &str) -> Option<u32> {
    let value = value.trim();
    let time = NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()?;
    Some(time.hour() * 60 + time.minute())
}

/// Like `parse_minutes`, but also reads `24:00` as the end of the day
pub fn parse_end_minutes(value: &str) -> Option<u32> {
    match value.trim() {
        "24:00" | "24:00:00" => Some(MINUTES_PER_DAY),
        other => parse_minutes(other),
    }
}

pub fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Half-open overlap test on raw `HH:MM` strings.
///
/// Intervals that only touch at an endpoint do not overlap. Any unparseable
/// input makes the comparison false.
pub fn time_ranges_overlap(start1: &str, end1: &str, start2: &str, end2: &str) -> bool {
    match (
        parse_minutes(start1),
        parse_end_minutes(end1),
        parse_minutes(start2),
        parse_end_minutes(end2),
    ) {
        (Some(s1), Some(e1), Some(s2), Some(e2)) => s1 < e2 && e1 > s2,
        _ => false,
    }
}

/// A non-empty `[start, end)` range in minutes since midnight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: u32,
    pub end: u32,
}

impl TimeRange {
    pub fn new(start: u32, end: u32) -> Option<Self> {
        (start < end && end <= MINUTES_PER_DAY).then_some(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Option<Self> {
        Self::new(parse_minutes(start)?, parse_end_minutes(end)?)
    }

    /// Range of `duration_minutes` from `start`, clipped at midnight
    pub fn starting_at(start: &str, duration_minutes: u32) -> Option<Self> {
        let start = parse_minutes(start)?;
        Self::new(start, (start + duration_minutes).min(MINUTES_PER_DAY))
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn contains(&self, minute: u32) -> bool {
        self.start <= minute && minute < self.end
    }

    pub fn start_label(&self) -> String {
        format_minutes(self.start)
    }

    pub fn end_label(&self) -> String {
        format_minutes(self.end)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_label(), self.end_label())
    }
}
