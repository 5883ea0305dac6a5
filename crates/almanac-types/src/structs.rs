//! Value structs for the Almanac time engine.
//!
//! Covers calendar days and local times read back from the engine, the
//! observer location, and the payloads the bus adapter's caller hands in
//! after decoding the wire encoding.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Calendar day
// ---------------------------------------------------------------------------

/// A day of the year without a year: `(day, month)`.
///
/// Holiday matching compares only these two fields, so a rule resolved for
/// the current year still matches "tomorrow" across the year boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarDay {
    /// Day of month, 1-31 (0 before the first computation).
    pub day: u8,
    /// Month, 1-12 (0 before the first computation).
    pub month: u8,
}

impl CalendarDay {
    /// Create a calendar day from its components.
    pub const fn new(day: u8, month: u8) -> Self {
        Self { day, month }
    }
}

impl From<NaiveDate> for CalendarDay {
    fn from(date: NaiveDate) -> Self {
        // chrono guarantees day in 1..=31 and month in 1..=12.
        Self {
            day: u8::try_from(date.day()).unwrap_or(0),
            month: u8::try_from(date.month()).unwrap_or(0),
        }
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:02}.", self.day, self.month)
    }
}

// ---------------------------------------------------------------------------
// Local time
// ---------------------------------------------------------------------------

/// An hour and minute in local civil time.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LocalTime {
    /// Hour, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
}

impl LocalTime {
    /// Create a local time from its components.
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }
}

impl fmt::Display for LocalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Sunrise and sunset for the current day, in local time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SunTimes {
    /// Local sunrise.
    pub sunrise: LocalTime,
    /// Local sunset.
    pub sunset: LocalTime,
}

/// Easter Sunday and the fourth Sunday of Advent for the current year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovableFeasts {
    /// Easter Sunday, always in March or April.
    pub easter: CalendarDay,
    /// Fourth Sunday of Advent, always in December.
    pub advent: CalendarDay,
}

/// Holiday lookup result for today and tomorrow.
///
/// Each index is 0 when no holiday matches, otherwise one plus the table
/// position of the first matching rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HolidayStatus {
    /// Holiday index for today.
    pub today: u8,
    /// Holiday index for tomorrow.
    pub tomorrow: u8,
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// Observer location used for sun computations and local-time conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Longitude in degrees, east positive.
    pub longitude: f64,
    /// Latitude in degrees, north positive.
    pub latitude: f64,
    /// Standard-time offset from UTC in whole hours.
    pub timezone: i8,
}

// ---------------------------------------------------------------------------
// External update payloads
// ---------------------------------------------------------------------------

/// A decoded time-of-day update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeUpdate {
    /// Hour, 0-23.
    pub hour: u8,
    /// Minute, 0-59.
    pub minute: u8,
    /// Second, 0-59.
    pub second: u8,
}

/// A decoded calendar date update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateUpdate {
    /// Day of month, 1-31.
    pub day: u8,
    /// Month, 1-12.
    pub month: u8,
    /// Full year, e.g. 2025.
    pub year: i32,
}

/// A decoded combined date-time update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateTimeUpdate {
    /// Time-of-day part.
    pub time: TimeUpdate,
    /// Date part.
    pub date: DateUpdate,
    /// Summer-time flag carried by the payload, if the encoding has one.
    pub summertime: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_day_from_date() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 20);
        assert!(date.is_some());
        let day = date.map(CalendarDay::from).unwrap_or_default();
        assert_eq!(day, CalendarDay::new(20, 4));
    }

    #[test]
    fn display_formats() {
        assert_eq!(CalendarDay::new(6, 1).to_string(), "06.01.");
        assert_eq!(LocalTime::new(7, 5).to_string(), "07:05");
    }

    #[test]
    fn date_time_update_serializes() {
        let update = DateTimeUpdate {
            time: TimeUpdate { hour: 12, minute: 30, second: 0 },
            date: DateUpdate { day: 1, month: 6, year: 2025 },
            summertime: Some(true),
        };
        let json = serde_json::to_value(update).unwrap_or_default();
        assert_eq!(json["date"]["year"], 2025);
        assert_eq!(json["summertime"], true);
    }
}
