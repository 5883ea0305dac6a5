//! Daylight-saving evaluation for the European rule set.
//!
//! Summer time starts on the last Sunday of March and ends on the last
//! Sunday of October, with the switch taking effect at 03:00 local time on
//! those days. The engine evaluates the rule once per year rollover and
//! again at 03:01 on any March or October day.
//!
//! The boundary tests are asymmetric: in March the hour must be
//! past 3, in October it must be before 3. Local times between 02:00 and
//! 03:00 on the October switch day exist twice, so evaluation at that hour
//! is ambiguous; the engine only evaluates at 03:01 and the only consumer
//! is the sun-time offset, which tolerates the approximation.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, Timelike};

/// Month in which summer time begins.
pub const START_MONTH: u8 = 3;
/// Month in which summer time ends.
pub const END_MONTH: u8 = 10;
/// Local hour at which the switch takes effect.
pub const SWITCH_HOUR: u8 = 3;
/// Minute past [`SWITCH_HOUR`] at which the engine re-evaluates.
pub const EVALUATION_MINUTE: u8 = 1;

/// Day of month of the last Sunday in `month` of `year`.
///
/// Returns 0 when the month cannot be represented.
pub fn last_sunday_in_month(year: i32, month: u8) -> u8 {
    let last_day = NaiveDate::from_ymd_opt(year, u32::from(month), 1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next_first| next_first.pred_opt());
    last_day.map_or(0, |date| {
        let day = date
            .day()
            .saturating_sub(date.weekday().num_days_from_sunday());
        u8::try_from(day).unwrap_or(0)
    })
}

/// Whether `now` is the instant at which the engine re-evaluates summer
/// time during a tick: 03:01 on any day in March or October.
pub fn is_evaluation_instant(now: &NaiveDateTime) -> bool {
    let month = now.month();
    (month == u32::from(START_MONTH) || month == u32::from(END_MONTH))
        && now.hour() == u32::from(SWITCH_HOUR)
        && now.minute() == u32::from(EVALUATION_MINUTE)
}

/// Decide whether local time `now` lies in summer time.
pub fn is_summertime(now: &NaiveDateTime) -> bool {
    let month = u8::try_from(now.month()).unwrap_or(0);
    let day = u8::try_from(now.day()).unwrap_or(0);
    let hour = u8::try_from(now.hour()).unwrap_or(0);

    match month {
        START_MONTH => {
            let last_sunday = last_sunday_in_month(now.year(), START_MONTH);
            if last_sunday == day {
                hour > SWITCH_HOUR
            } else {
                last_sunday < day
            }
        }
        END_MONTH => {
            let last_sunday = last_sunday_in_month(now.year(), END_MONTH);
            if last_sunday == day {
                hour < SWITCH_HOUR
            } else {
                last_sunday > day
            }
        }
        _ => month > START_MONTH && month < END_MONTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, 0))
            .unwrap_or_default()
    }

    #[test]
    fn last_sundays() {
        assert_eq!(last_sunday_in_month(2024, 3), 31);
        assert_eq!(last_sunday_in_month(2024, 10), 27);
        assert_eq!(last_sunday_in_month(2025, 3), 30);
        assert_eq!(last_sunday_in_month(2025, 10), 26);
        // 30-day month
        assert_eq!(last_sunday_in_month(2025, 4), 27);
        assert_eq!(last_sunday_in_month(2025, 13), 0);
    }

    #[test]
    fn winter_and_summer_months() {
        assert!(!is_summertime(&at(2025, 1, 15, 12, 0)));
        assert!(!is_summertime(&at(2025, 2, 28, 12, 0)));
        assert!(is_summertime(&at(2025, 4, 1, 0, 0)));
        assert!(is_summertime(&at(2025, 9, 30, 23, 59)));
        assert!(!is_summertime(&at(2025, 11, 1, 0, 0)));
        assert!(!is_summertime(&at(2025, 12, 31, 12, 0)));
    }

    #[test]
    fn march_outside_switch_day() {
        assert!(!is_summertime(&at(2025, 3, 29, 12, 0)));
        assert!(is_summertime(&at(2025, 3, 31, 0, 0)));
    }

    #[test]
    fn march_switch_day_depends_on_hour() {
        assert!(!is_summertime(&at(2025, 3, 30, 2, 0)));
        assert!(!is_summertime(&at(2025, 3, 30, 3, 1)));
        assert!(is_summertime(&at(2025, 3, 30, 4, 0)));
    }

    #[test]
    fn october_outside_switch_day() {
        assert!(is_summertime(&at(2025, 10, 25, 12, 0)));
        assert!(!is_summertime(&at(2025, 10, 27, 0, 0)));
    }

    #[test]
    fn october_switch_day_depends_on_hour() {
        assert!(is_summertime(&at(2025, 10, 26, 2, 59)));
        assert!(!is_summertime(&at(2025, 10, 26, 3, 1)));
        assert!(!is_summertime(&at(2025, 10, 26, 12, 0)));
    }

    #[test]
    fn evaluation_instant_only_at_0301_in_march_and_october() {
        assert!(is_evaluation_instant(&at(2025, 3, 10, 3, 1)));
        assert!(is_evaluation_instant(&at(2025, 10, 26, 3, 1)));
        assert!(!is_evaluation_instant(&at(2025, 3, 10, 3, 0)));
        assert!(!is_evaluation_instant(&at(2025, 4, 10, 3, 1)));
        assert!(!is_evaluation_instant(&at(2025, 10, 26, 4, 1)));
    }
}
