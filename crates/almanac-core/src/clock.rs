//! Civil clock for the Almanac engine.
//!
//! The clock is the single source of truth for the current local date and
//! time. It is always normalized: writing field values out of their usual
//! range (second 60, day 31 of a 30-day month, month 13) carries into the
//! next larger unit, the way C `mktime` does, and the weekday is derived
//! from the date rather than stored.
//!
//! # Design Principles
//!
//! - All field arithmetic is checked; a value chrono cannot represent is
//!   reported as [`ClockError::OutOfRange`] and leaves the clock untouched.
//! - Weekday follows the `tm_wday` convention: 0 = Sunday .. 6 = Saturday.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};

/// Year the clock shows before any external update.
pub const EPOCH_YEAR: i32 = 2020;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3600;
const MONTHS_PER_YEAR: i64 = 12;

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// The normalized date-time falls outside the representable range.
    #[error("date-time out of range: {reason}")]
    OutOfRange {
        /// Which step of the normalization overflowed.
        reason: String,
    },
}

fn out_of_range(reason: &str) -> ClockError {
    ClockError::OutOfRange {
        reason: reason.to_owned(),
    }
}

/// Normalize possibly out-of-range calendar fields into a date-time.
///
/// Months carry into years, then days and the time of day are added as
/// offsets from the first of the resulting month.
///
/// # Errors
///
/// Returns [`ClockError::OutOfRange`] if any intermediate value or the
/// result cannot be represented.
pub fn normalize(
    year: i32,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
) -> Result<NaiveDateTime, ClockError> {
    let total_months = i64::from(year)
        .checked_mul(MONTHS_PER_YEAR)
        .and_then(|m| m.checked_add(month))
        .and_then(|m| m.checked_sub(1))
        .ok_or_else(|| out_of_range("month overflow"))?;
    let norm_year = i32::try_from(total_months.div_euclid(MONTHS_PER_YEAR))
        .map_err(|_err| out_of_range("year overflow"))?;
    // rem_euclid(12) is in 0..12, so the month is in 1..=12.
    let norm_month = u32::try_from(total_months.rem_euclid(MONTHS_PER_YEAR))
        .map_err(|_err| out_of_range("month overflow"))?
        .saturating_add(1);

    let first_of_month = NaiveDate::from_ymd_opt(norm_year, norm_month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| out_of_range("year outside calendar range"))?;

    let day_offset = day
        .checked_sub(1)
        .and_then(TimeDelta::try_days)
        .ok_or_else(|| out_of_range("day overflow"))?;
    let seconds = hour
        .checked_mul(SECONDS_PER_HOUR)
        .and_then(|s| minute.checked_mul(SECONDS_PER_MINUTE)?.checked_add(s))
        .and_then(|s| s.checked_add(second))
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(|| out_of_range("time of day overflow"))?;

    first_of_month
        .checked_add_signed(day_offset)
        .and_then(|dt| dt.checked_add_signed(seconds))
        .ok_or_else(|| out_of_range("result outside calendar range"))
}

/// Local civil clock, second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CivilClock {
    now: NaiveDateTime,
}

impl CivilClock {
    /// Create a clock at 2020-01-01 00:00:00, the value shown before any
    /// external update arrives.
    pub fn new() -> Self {
        let now = NaiveDate::from_ymd_opt(EPOCH_YEAR, 1, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Self { now }
    }

    /// Create a clock from possibly out-of-range fields, normalizing them.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::OutOfRange`] if the fields normalize to an
    /// unrepresentable date-time.
    pub fn from_parts(
        year: i32,
        month: i64,
        day: i64,
        hour: i64,
        minute: i64,
        second: i64,
    ) -> Result<Self, ClockError> {
        Ok(Self {
            now: normalize(year, month, day, hour, minute, second)?,
        })
    }

    /// Wrap an already valid date-time.
    pub const fn from_date_time(now: NaiveDateTime) -> Self {
        Self { now }
    }

    /// Advance the clock by one second, carrying into larger units.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::OutOfRange`] at the end of chrono's range.
    pub fn advance_second(&mut self) -> Result<(), ClockError> {
        self.now = self
            .now
            .checked_add_signed(TimeDelta::seconds(1))
            .ok_or_else(|| out_of_range("advance past calendar range"))?;
        Ok(())
    }

    /// Overwrite the time-of-day fields, keeping the date, then normalize.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::OutOfRange`] if normalization overflows; the
    /// clock is left unchanged.
    pub fn set_time_of_day(&mut self, hour: u8, minute: u8, second: u8) -> Result<(), ClockError> {
        *self = Self::from_parts(
            self.year(),
            i64::from(self.month()),
            i64::from(self.day()),
            i64::from(hour),
            i64::from(minute),
            i64::from(second),
        )?;
        Ok(())
    }

    /// Overwrite the date fields, keeping the time of day, then normalize.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::OutOfRange`] if normalization overflows; the
    /// clock is left unchanged.
    pub fn set_date(&mut self, day: u8, month: u8, year: i32) -> Result<(), ClockError> {
        *self = Self::from_parts(
            year,
            i64::from(month),
            i64::from(day),
            i64::from(self.hour()),
            i64::from(self.minute()),
            i64::from(self.second()),
        )?;
        Ok(())
    }

    /// Return the underlying date-time.
    pub const fn date_time(&self) -> NaiveDateTime {
        self.now
    }

    /// Return the calendar date.
    pub const fn date(&self) -> NaiveDate {
        self.now.date()
    }

    /// Full year, e.g. 2025.
    pub fn year(&self) -> i32 {
        self.now.year()
    }

    /// Month, 1-12.
    pub fn month(&self) -> u8 {
        narrow(self.now.month())
    }

    /// Day of month, 1-31.
    pub fn day(&self) -> u8 {
        narrow(self.now.day())
    }

    /// Hour, 0-23.
    pub fn hour(&self) -> u8 {
        narrow(self.now.hour())
    }

    /// Minute, 0-59.
    pub fn minute(&self) -> u8 {
        narrow(self.now.minute())
    }

    /// Second, 0-59.
    pub fn second(&self) -> u8 {
        narrow(self.now.second())
    }

    /// Weekday, 0 = Sunday .. 6 = Saturday.
    pub fn weekday(&self) -> u8 {
        narrow(self.now.weekday().num_days_from_sunday())
    }

    /// Render like C `asctime`, without the trailing newline:
    /// `Wed Jan  1 00:00:00 2020`.
    pub fn asctime(&self) -> String {
        self.now.format("%a %b %e %H:%M:%S %Y").to_string()
    }
}

impl Default for CivilClock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CivilClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.asctime())
    }
}

/// Narrow a chrono calendar field (always below 60) to `u8`.
fn narrow(value: u32) -> u8 {
    u8::try_from(value).unwrap_or(u8::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn make_clock(y: i32, mo: i64, d: i64, h: i64, mi: i64, s: i64) -> CivilClock {
        CivilClock::from_parts(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn starts_at_epoch_wednesday() {
        let clock = CivilClock::new();
        assert_eq!(clock.year(), 2020);
        assert_eq!(clock.month(), 1);
        assert_eq!(clock.day(), 1);
        assert_eq!(clock.weekday(), 3);
        assert_eq!(clock.asctime(), "Wed Jan  1 00:00:00 2020");
    }

    #[test]
    fn advance_carries_into_next_year() {
        let mut clock = make_clock(2024, 12, 31, 23, 59, 59);
        clock.advance_second().unwrap();
        assert_eq!(clock.year(), 2025);
        assert_eq!(clock.month(), 1);
        assert_eq!(clock.day(), 1);
        assert_eq!(clock.hour(), 0);
        assert_eq!(clock.minute(), 0);
        assert_eq!(clock.second(), 0);
        // 2025-01-01 is a Wednesday.
        assert_eq!(clock.weekday(), 3);
    }

    #[test]
    fn advance_within_minute_changes_only_second() {
        let mut clock = make_clock(2025, 6, 15, 10, 20, 30);
        clock.advance_second().unwrap();
        assert_eq!(
            (clock.year(), clock.month(), clock.day(), clock.hour(), clock.minute()),
            (2025, 6, 15, 10, 20)
        );
        assert_eq!(clock.second(), 31);
    }

    #[test]
    fn overflowing_day_normalizes_forward() {
        // 31 April is 1 May.
        let clock = make_clock(2025, 4, 31, 0, 0, 0);
        assert_eq!((clock.day(), clock.month()), (1, 5));
    }

    #[test]
    fn month_thirteen_carries_into_year() {
        let clock = make_clock(2024, 13, 1, 0, 0, 0);
        assert_eq!((clock.year(), clock.month()), (2025, 1));
    }

    #[test]
    fn zero_day_is_last_of_previous_month() {
        let clock = make_clock(2024, 3, 0, 12, 0, 0);
        assert_eq!((clock.day(), clock.month()), (29, 2));
    }

    #[test]
    fn set_time_keeps_date() {
        let mut clock = make_clock(2025, 3, 30, 0, 0, 0);
        clock.set_time_of_day(3, 1, 0).unwrap();
        assert_eq!((clock.day(), clock.month(), clock.hour(), clock.minute()), (30, 3, 3, 1));
    }

    #[test]
    fn set_date_keeps_time() {
        let mut clock = make_clock(2025, 3, 30, 14, 15, 16);
        clock.set_date(24, 12, 2023).unwrap();
        assert_eq!((clock.year(), clock.month(), clock.day()), (2023, 12, 24));
        assert_eq!((clock.hour(), clock.minute(), clock.second()), (14, 15, 16));
        // 2023-12-24 is a Sunday.
        assert_eq!(clock.weekday(), 0);
    }

    #[test]
    fn unrepresentable_year_is_rejected_and_clock_unchanged() {
        let mut clock = make_clock(2025, 1, 1, 0, 0, 0);
        let result = clock.set_date(1, 1, i32::MAX);
        assert!(result.is_err());
        assert_eq!(clock.year(), 2025);
    }
}
