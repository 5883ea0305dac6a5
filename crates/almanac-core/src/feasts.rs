//! Movable feasts: Easter Sunday and the fourth Sunday of Advent.
//!
//! Both are pure functions of the year and are recomputed by the engine
//! once per year rollover.

use almanac_types::{CalendarDay, MovableFeasts};
use chrono::{Datelike, NaiveDate};

const MARCH: u8 = 3;
const APRIL: u8 = 4;
const DECEMBER: u8 = 12;

/// Compute Easter Sunday with Gauss's congruence method.
///
/// The result always falls between 22 March and 25 April. Two exceptions
/// apply to April dates: the 26th becomes the 19th, and the 25th becomes
/// the 18th when `d == 28` and `year % 19 > 10`.
// All intermediates are bounded by small multiples of `year / 100`.
#[allow(clippy::arithmetic_side_effects)]
pub fn easter_sunday(year: i32) -> CalendarDay {
    let year = i64::from(year);
    let a = year.rem_euclid(19);
    let b = year.rem_euclid(4);
    let c = year.rem_euclid(7);

    let k = year.div_euclid(100);
    let q = k.div_euclid(4);
    let p = (8 * k + 13).div_euclid(25);
    // Century epact.
    let egz = (38 - (k - q) + p).rem_euclid(30);
    let m = (53 - egz).rem_euclid(30);
    let n = (4 + k - q).rem_euclid(7);

    let d = (19 * a + m).rem_euclid(30);
    let e = (2 * b + 4 * c + 6 * d + n).rem_euclid(7);

    // d is in 0..30 and e in 0..7, so every day below fits in 1..=31.
    let march_day = 22 + d + e;
    if march_day <= 31 {
        return CalendarDay::new(small(march_day), MARCH);
    }

    let mut april_day = d + e - 9;
    if april_day == 26 {
        april_day = 19;
    } else if april_day == 25 && d == 28 && a > 10 {
        april_day = 18;
    }
    CalendarDay::new(small(april_day), APRIL)
}

/// Compute the fourth Sunday of Advent: the last Sunday on or before
/// 24 December, i.e. `24 - weekday(24 December)`.
///
/// Always a December date between the 18th and the 24th.
pub fn fourth_advent(year: i32) -> CalendarDay {
    // Years outside chrono's range fall back to Sunday arithmetic on the 24th.
    let weekday = NaiveDate::from_ymd_opt(year, 12, 24)
        .map_or(0, |date| date.weekday().num_days_from_sunday());
    let day = 24_u32.saturating_sub(weekday);
    CalendarDay::new(u8::try_from(day).unwrap_or(24), DECEMBER)
}

/// Compute both movable feasts for a year.
pub fn movable_feasts(year: i32) -> MovableFeasts {
    MovableFeasts {
        easter: easter_sunday(year),
        advent: fourth_advent(year),
    }
}

/// Narrow a day number already known to lie in 1..=31.
fn small(value: i64) -> u8 {
    u8::try_from(value).unwrap_or(0)
}
