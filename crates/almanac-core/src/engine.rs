//! The tick state machine that owns the civil clock.
//!
//! [`TimerEngine`] is constructed once by its owner and passed by reference
//! to anything that needs to read the derived state. Each tick runs these
//! phases, in this order:
//!
//! 1. **Advance** -- add one second to the clock. Always happens.
//! 2. **Detect** -- if the clock is fully [`TimeValidity::Valid`], compare
//!    it against the rollover cursors (see [`crate::cursors`]).
//! 3. **Minute** -- raise the minute-changed edge; at 03:01 in March or
//!    October re-evaluate internally derived summer time.
//! 4. **Year** -- recompute Easter and Advent, evaluate summer time, and
//!    refresh the holiday status.
//! 5. **Day** -- recompute sunrise/sunset and refresh the holiday status,
//!    unless an unread holiday change is still pending.
//!
//! Year work always completes before day work within one tick, so the
//! day-level holiday match and sun times see current movable feasts.
//!
//! Consumers pick up edge-triggered changes with the consume-once
//! accessors [`TimerEngine::take_minute_changed`] and
//! [`TimerEngine::take_holiday_changed`]; the peek/clear pairs remain for
//! callers that poll.

use almanac_types::{
    CalendarDay, HolidayStatus, LocalTime, Location, MovableFeasts, SunEvent, SunTimes,
    SummertimeSource, TimeValidity,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::CivilClock;
use crate::config::AlmanacConfig;
use crate::cursors::{TickCursors, Unit};
use crate::feasts;
use crate::holiday::{HolidayCalendar, HolidayMask};
use crate::pacer::{MonotonicSource, SystemMonotonic, TickPacer};
use crate::solar::{self, Limb};
use crate::summertime;

/// What a single call to [`TimerEngine::advance_one_second`] did.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TickOutcome {
    /// Rollover detection ran (the clock was fully valid).
    pub evaluated: bool,
    /// The minute cursor fired.
    pub minute_changed: bool,
    /// Summer time was re-evaluated at the 03:01 instant.
    pub summertime_evaluated: bool,
    /// Movable feasts, summer time, and holidays were recomputed.
    pub year_refreshed: bool,
    /// Sun times (and possibly holidays) were recomputed.
    pub day_refreshed: bool,
}

impl TickOutcome {
    /// Whether any recomputation fired.
    pub const fn triggered(&self) -> bool {
        self.minute_changed || self.summertime_evaluated || self.year_refreshed || self.day_refreshed
    }
}

/// Serializable view of the engine for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlmanacSnapshot {
    /// Current time, `asctime` style.
    pub time: String,
    /// Weekday, 0 = Sunday.
    pub weekday: u8,
    /// Validity lattice state.
    pub validity: TimeValidity,
    /// Whether summer time is in effect.
    pub summertime: bool,
    /// Movable feasts of the current year.
    pub feasts: MovableFeasts,
    /// Holiday status for today and tomorrow.
    pub holidays: HolidayStatus,
    /// Name of today's holiday, if any.
    pub holiday_today: Option<&'static str>,
    /// Name of tomorrow's holiday, if any.
    pub holiday_tomorrow: Option<&'static str>,
    /// Local sunrise and sunset.
    pub sun: SunTimes,
}

/// The calendar and astronomical time engine.
#[derive(Debug)]
pub struct TimerEngine<M: MonotonicSource = SystemMonotonic> {
    pub(crate) clock: CivilClock,
    pub(crate) validity: TimeValidity,
    pub(crate) cursors: TickCursors,
    pub(crate) pacer: TickPacer,
    pub(crate) source: M,
    pub(crate) location: Location,
    pub(crate) summertime_source: SummertimeSource,
    pub(crate) summertime: bool,
    pub(crate) min_valid_year: i32,
    pub(crate) feasts: MovableFeasts,
    pub(crate) holidays: HolidayCalendar,
    pub(crate) holiday_status: HolidayStatus,
    pub(crate) holiday_changed: bool,
    pub(crate) minute_changed: bool,
    pub(crate) sun: SunTimes,
}

impl TimerEngine<SystemMonotonic> {
    /// Create an engine paced by the process monotonic clock.
    pub fn with_system_clock(config: &AlmanacConfig) -> Self {
        Self::new(config, SystemMonotonic::new())
    }
}

impl<M: MonotonicSource> TimerEngine<M> {
    /// Create an engine from startup configuration.
    ///
    /// The clock starts at 2020-01-01 00:00:00 with validity
    /// [`TimeValidity::Invalid`]; nothing is derived until external updates
    /// confirm both the time and the date.
    pub fn new(config: &AlmanacConfig, source: M) -> Self {
        let pacer = TickPacer::new(source.now_ms(), config.clock.tick_interval_ms);
        let holidays = HolidayCalendar::new(HolidayMask::from_bits(config.holidays.enabled_mask));
        info!(
            longitude = config.location.longitude,
            latitude = config.location.latitude,
            timezone = config.location.timezone,
            summertime_source = ?config.summertime.source,
            holiday_mask = holidays.mask().bits(),
            "Timer engine initialized"
        );
        Self {
            clock: CivilClock::new(),
            validity: TimeValidity::Invalid,
            cursors: TickCursors::new(),
            pacer,
            source,
            location: config.location.to_location(),
            summertime_source: config.summertime.source,
            summertime: false,
            min_valid_year: config.clock.min_valid_year,
            feasts: MovableFeasts::default(),
            holidays,
            holiday_status: HolidayStatus::default(),
            holiday_changed: false,
            minute_changed: false,
            sun: SunTimes::default(),
        }
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Run one tick if the pacer says a second has elapsed.
    ///
    /// At most one tick runs per call; a backlog drains over subsequent
    /// calls without drift.
    pub fn poll(&mut self) -> Option<TickOutcome> {
        if !self.pacer.is_due(self.source.now_ms()) {
            return None;
        }
        self.pacer.consume();
        Some(self.advance_one_second())
    }

    /// Advance the clock by one second and run any rollover work.
    pub fn advance_one_second(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        // --- Phase 1: Advance ---
        if let Err(err) = self.clock.advance_second() {
            warn!(error = %err, "Clock cannot advance");
            return outcome;
        }
        if self.validity != TimeValidity::Valid {
            return outcome;
        }

        // --- Phase 2: Detect ---
        outcome.evaluated = true;
        let rollovers = self.cursors.observe(&self.clock);

        // --- Phase 3: Minute ---
        if rollovers.contains(Unit::Minute) {
            self.minute_changed = true;
            outcome.minute_changed = true;
            if self.summertime_source == SummertimeSource::Internal
                && summertime::is_evaluation_instant(&self.clock.date_time())
            {
                self.evaluate_summertime();
                outcome.summertime_evaluated = true;
            }
        }

        // --- Phase 4: Year (must precede day) ---
        if rollovers.contains(Unit::Year) {
            self.refresh_year();
            outcome.year_refreshed = true;
        }

        // --- Phase 5: Day ---
        if rollovers.contains(Unit::Day) {
            self.recompute_sun_times();
            if !self.holiday_changed {
                self.evaluate_holidays();
            }
            outcome.day_refreshed = true;
        }

        outcome
    }

    fn refresh_year(&mut self) {
        let year = self.clock.year();
        self.feasts = feasts::movable_feasts(year);
        info!(
            year,
            easter = %self.feasts.easter,
            advent = %self.feasts.advent,
            "Movable feasts computed"
        );
        self.evaluate_summertime();
        self.evaluate_holidays();
    }

    // -----------------------------------------------------------------------
    // Derived state
    // -----------------------------------------------------------------------

    /// Re-derive summer time from the clock when the policy is internal.
    pub(crate) fn evaluate_summertime(&mut self) {
        if self.summertime_source == SummertimeSource::Internal {
            let value = summertime::is_summertime(&self.clock.date_time());
            self.set_summertime(value);
        }
    }

    /// Store a new summer-time flag; a change shifts the local offset, so
    /// sun times are recomputed immediately.
    pub(crate) fn set_summertime(&mut self, value: bool) {
        if value != self.summertime {
            self.summertime = value;
            info!(summertime = value, "Summer time changed");
            self.recompute_sun_times();
        }
    }

    fn recompute_sun_times(&mut self) {
        let transit = solar::sun_rise_set(
            self.clock.date(),
            self.location.longitude,
            self.location.latitude,
            solar::RISE_SET_ALTITUDE,
            Limb::Upper,
        );
        self.sun = SunTimes {
            sunrise: self.to_local(transit.rise),
            sunset: self.to_local(transit.set),
        };
        debug!(
            sunrise = %self.sun.sunrise,
            sunset = %self.sun.sunset,
            arc = ?transit.arc,
            "Sun times computed"
        );
    }

    fn evaluate_holidays(&mut self) {
        if self.validity < TimeValidity::DateValid {
            return;
        }
        let status = self.holidays.evaluate(self.clock.date(), &self.feasts);
        if status != self.holiday_status {
            self.holiday_status = status;
            self.holiday_changed = true;
            info!(
                today = status.today,
                tomorrow = status.tomorrow,
                today_name = self.holidays.name(status.today).unwrap_or("-"),
                tomorrow_name = self.holidays.name(status.tomorrow).unwrap_or("-"),
                "Holiday status changed"
            );
        }
    }

    fn to_local(&self, utc_hours: f64) -> LocalTime {
        solar::to_local_time(utc_hours, self.location.timezone, self.summertime)
    }

    /// Raise validity to the join with `level`. Never lowers it.
    pub(crate) fn escalate(&mut self, level: TimeValidity) {
        let next = self.validity.join(level);
        if next != self.validity {
            info!(from = ?self.validity, to = ?next, "Time validity escalated");
            self.validity = next;
        }
    }

    // -----------------------------------------------------------------------
    // Clock accessors
    // -----------------------------------------------------------------------

    /// Full year.
    pub fn year(&self) -> i32 {
        self.clock.year()
    }

    /// Month, 1-12.
    pub fn month(&self) -> u8 {
        self.clock.month()
    }

    /// Day of month, 1-31.
    pub fn day(&self) -> u8 {
        self.clock.day()
    }

    /// Hour, 0-23.
    pub fn hour(&self) -> u8 {
        self.clock.hour()
    }

    /// Minute, 0-59.
    pub fn minute(&self) -> u8 {
        self.clock.minute()
    }

    /// Second, 0-59.
    pub fn second(&self) -> u8 {
        self.clock.second()
    }

    /// Weekday, 0 = Sunday .. 6 = Saturday.
    pub fn weekday(&self) -> u8 {
        self.clock.weekday()
    }

    /// The clock itself.
    pub const fn clock(&self) -> &CivilClock {
        &self.clock
    }

    /// Current time rendered like `asctime`.
    pub fn time_ascii(&self) -> String {
        self.clock.asctime()
    }

    /// Validity lattice state.
    pub const fn validity(&self) -> TimeValidity {
        self.validity
    }

    /// Configured location.
    pub const fn location(&self) -> Location {
        self.location
    }

    // -----------------------------------------------------------------------
    // Edge-triggered notifications
    // -----------------------------------------------------------------------

    /// Whether the minute changed since the flag was last cleared. Only
    /// reported once the clock is fully valid.
    pub fn minute_changed(&self) -> bool {
        self.minute_changed && self.validity == TimeValidity::Valid
    }

    /// Clear the minute-changed flag.
    pub const fn clear_minute_changed(&mut self) {
        self.minute_changed = false;
    }

    /// Report and clear the minute-changed flag in one step.
    pub fn take_minute_changed(&mut self) -> bool {
        let changed = self.minute_changed();
        self.minute_changed = false;
        changed
    }

    /// Holiday index for today (0 = none, else 1 + table position).
    pub const fn holiday_today(&self) -> u8 {
        self.holiday_status.today
    }

    /// Holiday index for tomorrow (0 = none, else 1 + table position).
    pub const fn holiday_tomorrow(&self) -> u8 {
        self.holiday_status.tomorrow
    }

    /// Both holiday indices.
    pub const fn holiday_status(&self) -> HolidayStatus {
        self.holiday_status
    }

    /// Whether the holiday status changed since the flag was last cleared.
    pub const fn holiday_changed(&self) -> bool {
        self.holiday_changed
    }

    /// Clear the holiday-changed flag, allowing the next day rollover to
    /// refresh the status again.
    pub const fn clear_holiday_changed(&mut self) {
        self.holiday_changed = false;
    }

    /// Return the new status if it changed, clearing the flag.
    pub const fn take_holiday_changed(&mut self) -> Option<HolidayStatus> {
        if self.holiday_changed {
            self.holiday_changed = false;
            Some(self.holiday_status)
        } else {
            None
        }
    }

    /// Name of the holiday behind a status index.
    pub fn holiday_name(&self, status_index: u8) -> Option<&'static str> {
        self.holidays.name(status_index)
    }

    /// The holiday calendar in use.
    pub const fn holiday_calendar(&self) -> &HolidayCalendar {
        &self.holidays
    }

    // -----------------------------------------------------------------------
    // Feasts and sun
    // -----------------------------------------------------------------------

    /// Easter Sunday of the current year.
    pub const fn easter(&self) -> CalendarDay {
        self.feasts.easter
    }

    /// Easter and fourth Advent of the current year.
    pub const fn feasts(&self) -> MovableFeasts {
        self.feasts
    }

    /// Whether summer time is in effect.
    pub const fn is_summertime(&self) -> bool {
        self.summertime
    }

    /// Stored local sunrise or sunset for today.
    pub const fn sun_info(&self, event: SunEvent) -> LocalTime {
        match event {
            SunEvent::Sunrise => self.sun.sunrise,
            SunEvent::Sunset => self.sun.sunset,
        }
    }

    /// Stored local sunrise and sunset for today.
    pub const fn sun_times(&self) -> SunTimes {
        self.sun
    }

    /// Local time at which the Sun's centre crosses `altitude` degrees
    /// today, e.g. [`solar::CIVIL_TWILIGHT_ALTITUDE`]. Computed on demand.
    pub fn sun_degree(&self, event: SunEvent, altitude: f64) -> LocalTime {
        let transit = solar::sun_rise_set(
            self.clock.date(),
            self.location.longitude,
            self.location.latitude,
            altitude,
            Limb::Center,
        );
        match event {
            SunEvent::Sunrise => self.to_local(transit.rise),
            SunEvent::Sunset => self.to_local(transit.set),
        }
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    /// Serializable view of the current state.
    pub fn snapshot(&self) -> AlmanacSnapshot {
        AlmanacSnapshot {
            time: self.clock.asctime(),
            weekday: self.clock.weekday(),
            validity: self.validity,
            summertime: self.summertime,
            feasts: self.feasts,
            holidays: self.holiday_status,
            holiday_today: self.holidays.name(self.holiday_status.today),
            holiday_tomorrow: self.holidays.name(self.holiday_status.tomorrow),
            sun: self.sun,
        }
    }

    /// Log the current time and, once the date is valid, the resolved
    /// holiday list and sun times.
    pub fn log_status(&self) {
        if self.validity.has_minutes() {
            info!(time = %self.clock, "Current time");
        }
        if self.validity.has_date() {
            let year = self.clock.year();
            for holiday in self.holidays.resolved_for_year(year, &self.feasts) {
                debug!(
                    year,
                    position = holiday.position,
                    name = holiday.name,
                    day = %holiday.day,
                    "Holiday"
                );
            }
            info!(
                sunrise = %self.sun.sunrise,
                sunset = %self.sun.sunset,
                "Sun times"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use almanac_types::{DateUpdate, TimeUpdate};

    use super::*;
    use crate::pacer::ManualMonotonic;

    fn make_engine() -> TimerEngine<ManualMonotonic> {
        TimerEngine::new(&AlmanacConfig::default(), ManualMonotonic::new())
    }

    fn make_valid_engine(hour: u8, minute: u8, second: u8) -> TimerEngine<ManualMonotonic> {
        let mut engine = make_engine();
        engine.apply_time(TimeUpdate {
            hour,
            minute,
            second,
        });
        engine.apply_date(DateUpdate {
            day: 3,
            month: 7,
            year: 2024,
        });
        engine
    }

    #[test]
    fn fresh_engine_starts_at_epoch() {
        let engine = make_engine();
        assert_eq!(engine.year(), 2020);
        assert_eq!(engine.month(), 1);
        assert_eq!(engine.day(), 1);
        assert_eq!(engine.weekday(), 3);
        assert_eq!(engine.validity(), TimeValidity::Invalid);
        assert_eq!(engine.holiday_status(), HolidayStatus::default());
        assert_eq!(engine.sun_times(), SunTimes::default());
        assert!(!engine.is_summertime());
    }

    #[test]
    fn first_valid_tick_runs_every_phase() {
        let mut engine = make_valid_engine(10, 0, 0);
        let outcome = engine.advance_one_second();
        assert!(outcome.evaluated);
        assert!(outcome.minute_changed);
        assert!(outcome.year_refreshed);
        assert!(outcome.day_refreshed);
        assert_eq!(engine.feasts().easter, CalendarDay::new(31, 3));
        assert_eq!(engine.feasts().advent, CalendarDay::new(22, 12));
        assert!(engine.is_summertime());
        assert!(engine.sun_info(SunEvent::Sunrise) < engine.sun_info(SunEvent::Sunset));
    }

    #[test]
    fn minute_rollover_raises_edge_once() {
        let mut engine = make_valid_engine(10, 0, 58);
        engine.advance_one_second();
        engine.clear_minute_changed();

        assert!(!engine.advance_one_second().minute_changed);
        assert!(!engine.minute_changed());
        assert!(engine.advance_one_second().minute_changed);
        assert!(engine.take_minute_changed());
        assert!(!engine.take_minute_changed());
    }

    #[test]
    fn midnight_refreshes_day_but_not_year() {
        let mut engine = make_valid_engine(23, 59, 58);
        engine.advance_one_second();
        let outcome = engine.advance_one_second();
        assert_eq!(engine.day(), 4);
        assert!(outcome.day_refreshed);
        assert!(!outcome.year_refreshed);
    }

    #[test]
    fn take_holiday_changed_consumes_flag() {
        let mut engine = make_valid_engine(12, 0, 0);
        assert!(engine.take_holiday_changed().is_none());
        engine.apply_date(DateUpdate {
            day: 31,
            month: 12,
            year: 2024,
        });
        engine.advance_one_second();
        let status = engine.take_holiday_changed().unwrap();
        assert_eq!(engine.holiday_name(status.today), Some("New Year's Eve"));
        assert_eq!(engine.holiday_name(status.tomorrow), Some("New Year's Day"));
        assert!(engine.take_holiday_changed().is_none());
    }

    #[test]
    fn summertime_setter_is_edge_triggered() {
        let mut engine = make_valid_engine(12, 0, 0);
        engine.advance_one_second();
        let before = engine.sun_times();
        engine.set_summertime(true);
        assert_eq!(engine.sun_times(), before);
        engine.set_summertime(false);
        assert_ne!(engine.sun_times(), before);
    }

    #[test]
    fn log_status_handles_every_validity() {
        make_engine().log_status();
        make_valid_engine(8, 30, 0).log_status();
    }
}
