//! Sunrise and sunset from low-precision orbital elements.
//!
//! The solver works in days since 2000 Jan 0.0 UT (1999-12-31 00:00 UT).
//! For local mean noon of the requested date it derives the Sun's ecliptic
//! longitude from the mean anomaly and orbit eccentricity, converts to right
//! ascension and declination, and finds the hour angle at which the Sun
//! crosses the requested altitude. Accuracy is about a minute for dates
//! between 1801 and 2099.
//!
//! Longitudes are east positive, latitudes north positive. All returned
//! times are hours UT and may fall outside 0..24.

use almanac_types::{DiurnalArc, LocalTime};
use chrono::{Datelike, NaiveDate};

/// Altitude of the Sun's centre at apparent rise/set, in degrees,
/// accounting for refraction. Use with [`Limb::Upper`].
pub const RISE_SET_ALTITUDE: f64 = -35.0 / 60.0;
/// Altitude bounding civil twilight.
pub const CIVIL_TWILIGHT_ALTITUDE: f64 = -6.0;
/// Altitude bounding nautical twilight.
pub const NAUTICAL_TWILIGHT_ALTITUDE: f64 = -12.0;
/// Altitude bounding astronomical twilight.
pub const ASTRONOMICAL_TWILIGHT_ALTITUDE: f64 = -18.0;

const DEG_PER_RAD: f64 = 180.0 / std::f64::consts::PI;
const INV_360: f64 = 1.0 / 360.0;
const DEG_PER_HOUR: f64 = 15.0;

/// Which point of the solar disk must cross the altitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limb {
    /// The upper edge of the disk; used for rise and set.
    Upper,
    /// The centre of the disk; used for twilight.
    Center,
}

/// Crossing times of the Sun through an altitude on one day, hours UT.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunTransit {
    /// Rising crossing. For [`DiurnalArc::AlwaysAbove`] this is solar noon
    /// minus twelve hours; for [`DiurnalArc::AlwaysBelow`] it is solar noon.
    pub rise: f64,
    /// Setting crossing. For [`DiurnalArc::AlwaysAbove`] this is solar noon
    /// plus twelve hours; for [`DiurnalArc::AlwaysBelow`] it is solar noon.
    pub set: f64,
    /// Whether the Sun actually crosses the altitude this day.
    pub arc: DiurnalArc,
}

/// Compute the times the Sun crosses `altitude` on `date` at the given
/// position.
///
/// Polar day and polar night are not failures: they are reported through
/// [`SunTransit::arc`] with a well-defined symmetric window around solar
/// noon.
pub fn sun_rise_set(
    date: NaiveDate,
    longitude: f64,
    latitude: f64,
    altitude: f64,
    limb: Limb,
) -> SunTransit {
    // Local mean noon of the date.
    let d = days_since_2000_jan_0(date) + 0.5 - longitude / 360.0;

    let sidereal = revolution(gmst0(d) + 180.0 + longitude);
    let (right_ascension, declination, distance) = sun_ra_dec(d);

    // Time of meridian transit, hours UT.
    let t_south = 12.0 - rev180(sidereal - right_ascension) / DEG_PER_HOUR;

    let target = match limb {
        Limb::Upper => altitude - 0.2666 / distance,
        Limb::Center => altitude,
    };

    let cos_hour_angle = (sind(target) - sind(latitude) * sind(declination))
        / (cosd(latitude) * cosd(declination));

    let (arc, half_arc) = if cos_hour_angle >= 1.0 {
        (DiurnalArc::AlwaysBelow, 0.0)
    } else if cos_hour_angle <= -1.0 {
        (DiurnalArc::AlwaysAbove, 12.0)
    } else {
        (DiurnalArc::Crossing, acosd(cos_hour_angle) / DEG_PER_HOUR)
    };

    SunTransit {
        rise: t_south - half_arc,
        set: t_south + half_arc,
        arc,
    }
}

/// Convert hours UT to local wall-clock time.
///
/// Adds the timezone offset and one hour during summer time, then wraps
/// into 0..24. Minutes are truncated, not rounded.
#[allow(clippy::cast_possible_truncation)]
pub fn to_local_time(utc_hours: f64, timezone: i8, summertime: bool) -> LocalTime {
    let whole = utc_hours.floor();
    let minute = (60.0 * (utc_hours - whole)) as i64;
    let hour = (whole as i64)
        .saturating_add(i64::from(timezone))
        .saturating_add(i64::from(summertime))
        .rem_euclid(24);
    LocalTime {
        hour: u8::try_from(hour).unwrap_or(0),
        minute: u8::try_from(minute.clamp(0, 59)).unwrap_or(0),
    }
}

/// Days since 2000 Jan 0.0 UT at 0h UT of `date`.
// Day counts for representable dates are far below 2^52.
#[allow(clippy::cast_precision_loss, clippy::arithmetic_side_effects)]
fn days_since_2000_jan_0(date: NaiveDate) -> f64 {
    let y = i64::from(date.year());
    let m = i64::from(date.month());
    let d = i64::from(date.day());
    let days = 367 * y - (7 * (y + (m + 9) / 12)) / 4 + (275 * m) / 9 + d - 730_530;
    days as f64
}

/// Sun's ecliptic longitude (degrees) and distance (AU) at day `d`.
fn sun_position(d: f64) -> (f64, f64) {
    let mean_anomaly = revolution(356.0470 + 0.985_600_258_5 * d);
    let perihelion = 282.9404 + 4.709_35e-5 * d;
    let eccentricity = 0.016_709 - 1.151e-9 * d;

    // One correction step of Kepler's equation is enough at e ~ 0.0167.
    let eccentric_anomaly = mean_anomaly
        + eccentricity
            * DEG_PER_RAD
            * sind(mean_anomaly)
            * (1.0 + eccentricity * cosd(mean_anomaly));
    let x = cosd(eccentric_anomaly) - eccentricity;
    let y = (1.0 - eccentricity * eccentricity).sqrt() * sind(eccentric_anomaly);

    let distance = x.hypot(y);
    let true_anomaly = atan2d(y, x);
    let mut longitude = true_anomaly + perihelion;
    if longitude >= 360.0 {
        longitude -= 360.0;
    }
    (longitude, distance)
}

/// Sun's right ascension, declination (degrees) and distance (AU).
fn sun_ra_dec(d: f64) -> (f64, f64, f64) {
    let (longitude, distance) = sun_position(d);

    // Ecliptic rectangular coordinates, z = 0.
    let x = distance * cosd(longitude);
    let y_ecl = distance * sind(longitude);

    let obliquity = 23.4393 - 3.563e-7 * d;

    let z = y_ecl * sind(obliquity);
    let y = y_ecl * cosd(obliquity);

    let right_ascension = atan2d(y, x);
    let declination = atan2d(z, x.hypot(y));
    (right_ascension, declination, distance)
}

/// Greenwich mean sidereal time at 0h UT, generalized to any instant:
/// equal to the Sun's mean longitude plus 180 degrees.
fn gmst0(d: f64) -> f64 {
    revolution((180.0 + 356.0470 + 282.9404) + (0.985_600_258_5 + 4.709_35e-5) * d)
}

/// Reduce an angle to 0..360 degrees.
fn revolution(x: f64) -> f64 {
    x - 360.0 * (x * INV_360).floor()
}

/// Reduce an angle to -180..180 degrees.
fn rev180(x: f64) -> f64 {
    x - 360.0 * (x * INV_360 + 0.5).floor()
}

fn sind(x: f64) -> f64 {
    x.to_radians().sin()
}

fn cosd(x: f64) -> f64 {
    x.to_radians().cos()
}

fn acosd(x: f64) -> f64 {
    x.acos().to_degrees()
}

fn atan2d(y: f64, x: f64) -> f64 {
    y.atan2(x).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn epoch_day_count() {
        // 2000 Jan 1 is day 1 after 2000 Jan 0.0.
        assert!((days_since_2000_jan_0(date(2000, 1, 1)) - 1.0).abs() < f64::EPSILON);
        assert!((days_since_2000_jan_0(date(2000, 3, 1)) - 61.0).abs() < f64::EPSILON);
    }

    #[test]
    fn angle_reduction() {
        assert!((revolution(370.0) - 10.0).abs() < 1e-9);
        assert!((revolution(-10.0) - 350.0).abs() < 1e-9);
        assert!((rev180(190.0) + 170.0).abs() < 1e-9);
        assert!((rev180(-190.0) - 170.0).abs() < 1e-9);
    }

    #[test]
    fn equinox_day_is_about_twelve_hours_at_mid_latitude() {
        let transit = sun_rise_set(date(2025, 3, 20), 10.0, 50.0, RISE_SET_ALTITUDE, Limb::Upper);
        assert_eq!(transit.arc, DiurnalArc::Crossing);
        let day_length = transit.set - transit.rise;
        // Refraction and the upper limb add a few minutes over 12 h.
        assert!((12.0..12.4).contains(&day_length), "{day_length}");
        // Solar noon near 12:00 UT minus 40 minutes for 10 degrees east.
        let noon = (transit.rise + transit.set) / 2.0;
        assert!((11.1..11.6).contains(&noon), "{noon}");
    }

    #[test]
    fn summer_solstice_at_fifty_north() {
        let transit = sun_rise_set(date(2025, 6, 21), 10.0, 50.0, RISE_SET_ALTITUDE, Limb::Upper);
        assert_eq!(transit.arc, DiurnalArc::Crossing);
        // Sunrise about 03:20 UT, sunset about 19:30 UT.
        assert!((3.0..3.7).contains(&transit.rise), "{}", transit.rise);
        assert!((19.2..19.8).contains(&transit.set), "{}", transit.set);
    }

    #[test]
    fn polar_day_is_symmetric_window_around_noon() {
        let transit = sun_rise_set(date(2025, 6, 21), 10.0, 70.0, RISE_SET_ALTITUDE, Limb::Upper);
        assert_eq!(transit.arc, DiurnalArc::AlwaysAbove);
        assert!((transit.set - transit.rise - 24.0).abs() < 1e-9);
        let noon = (transit.rise + transit.set) / 2.0;
        assert!((11.1..11.6).contains(&noon), "{noon}");
    }

    #[test]
    fn polar_night_collapses_to_noon() {
        let transit = sun_rise_set(date(2025, 12, 21), 10.0, 70.0, RISE_SET_ALTITUDE, Limb::Upper);
        assert_eq!(transit.arc, DiurnalArc::AlwaysBelow);
        assert!((transit.set - transit.rise).abs() < f64::EPSILON);
    }

    #[test]
    fn twilight_starts_before_sunrise() {
        let day = date(2025, 5, 1);
        let rise = sun_rise_set(day, 10.0, 50.0, RISE_SET_ALTITUDE, Limb::Upper);
        let civil = sun_rise_set(day, 10.0, 50.0, CIVIL_TWILIGHT_ALTITUDE, Limb::Center);
        let nautical = sun_rise_set(day, 10.0, 50.0, NAUTICAL_TWILIGHT_ALTITUDE, Limb::Center);
        assert!(civil.rise < rise.rise);
        assert!(nautical.rise < civil.rise);
        assert!(civil.set > rise.set);
    }

    #[test]
    fn local_time_applies_offsets() {
        assert_eq!(to_local_time(5.5, 1, false), LocalTime::new(6, 30));
        assert_eq!(to_local_time(5.5, 1, true), LocalTime::new(7, 30));
        assert_eq!(to_local_time(5.999, 0, false), LocalTime::new(5, 59));
    }

    #[test]
    fn local_time_wraps_across_midnight() {
        assert_eq!(to_local_time(23.25, 2, false), LocalTime::new(1, 15));
        assert_eq!(to_local_time(-0.5, 0, false), LocalTime::new(23, 30));
    }
}
