//! Time Engine - wall-clock readings and time-of-day buckets
//!
//! Produces the strings shown by the clock labels for a selected timezone (or
//! the system-local zone) and classifies the hour into a coarse bucket that
//! drives the background image.

use chrono::{DateTime, Local, TimeZone, Timelike, Utc};
use std::fmt::Display;

use crate::catalog::parse_timezone;

/// Coarse classification of an hour of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    /// 06:00 - 11:59
    Morning,
    /// 12:00 - 17:59
    Afternoon,
    /// 18:00 - 23:59
    Evening,
    /// 00:00 - 05:59
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }

    /// File name of the background image for this bucket
    pub fn asset_file_name(&self) -> String {
        format!("{}.jpg", self.as_str())
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map an hour (0-23) to its bucket. Out-of-range hours wrap around the day.
pub fn bucket_for(hour: u32) -> TimeOfDay {
    match hour % 24 {
        6..=11 => TimeOfDay::Morning,
        12..=17 => TimeOfDay::Afternoon,
        18..=23 => TimeOfDay::Evening,
        _ => TimeOfDay::Night,
    }
}

/// Formatted clock output for a single tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockReading {
    /// Time of day, e.g. "17:04:05 PM"
    pub time: String,
    /// ISO date, e.g. "2024-03-01"
    pub date: String,
    /// Hour in 24-hour format (0-23)
    pub hour: u32,
}

impl ClockReading {
    pub fn bucket(&self) -> TimeOfDay {
        bucket_for(self.hour)
    }
}

/// Format a reading from any zoned datetime
pub fn reading_for<T>(datetime: &DateTime<T>) -> ClockReading
where
    T: TimeZone,
    T::Offset: Display,
{
    ClockReading {
        time: datetime.format("%H:%M:%S %p").to_string(),
        date: datetime.format("%Y-%m-%d").to_string(),
        hour: datetime.hour(),
    }
}

/// Current reading in `timezone`, or system-local time when it is unset or unknown
pub fn now(timezone: Option<&str>) -> ClockReading {
    now_at(timezone, Utc::now())
}

/// Reading for a specific instant
pub fn now_at(timezone: Option<&str>, instant: DateTime<Utc>) -> ClockReading {
    match timezone.and_then(parse_timezone) {
        Some(tz) => reading_for(&instant.with_timezone(&tz)),
        None => reading_for(&instant.with_timezone(&Local)),
    }
}
