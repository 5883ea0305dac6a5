//! Application of external time, date, and summer-time updates.
//!
//! Updates arrive from the bus in any order and at any rate. Each one
//! rewrites part of the clock, restarts the tick pacer so the next second
//! is counted from the moment of receipt, and raises validity. A date
//! update also invalidates the year or day cursor so the derived state is
//! recomputed on the very next tick.

use almanac_types::{DateTimeUpdate, DateUpdate, SummertimeSource, TimeUpdate, TimeValidity};
use tracing::{debug, warn};

use crate::cursors::Unit;
use crate::engine::TimerEngine;
use crate::pacer::MonotonicSource;

impl<M: MonotonicSource> TimerEngine<M> {
    /// Apply a time-of-day update.
    ///
    /// Raises the minute-changed edge when the hour or minute differs and
    /// grants at least [`TimeValidity::MinutesValid`]. Out-of-range fields
    /// are normalized into the date.
    pub fn apply_time(&mut self, update: TimeUpdate) {
        if self.clock.hour() != update.hour || self.clock.minute() != update.minute {
            self.minute_changed = true;
        }
        if let Err(err) = self
            .clock
            .set_time_of_day(update.hour, update.minute, update.second)
        {
            warn!(error = %err, ?update, "Time update rejected");
            return;
        }
        self.pacer.resync(self.source.now_ms());
        debug!(time = %self.clock, "Time updated");
        self.escalate(TimeValidity::MinutesValid);
    }

    /// Apply a calendar-date update.
    ///
    /// A new year invalidates the year cursor (and with it the day cursor);
    /// a new day or month invalidates the day cursor. The date only counts
    /// as valid once the year reaches the configured minimum.
    pub fn apply_date(&mut self, update: DateUpdate) {
        if update.year != self.clock.year() {
            self.cursors.invalidate(Unit::Year);
            self.minute_changed = true;
        } else if update.month != self.clock.month() || update.day != self.clock.day() {
            self.cursors.invalidate(Unit::Day);
            self.minute_changed = true;
        }
        if let Err(err) = self.clock.set_date(update.day, update.month, update.year) {
            warn!(error = %err, ?update, "Date update rejected");
            return;
        }
        self.pacer.resync(self.source.now_ms());
        debug!(time = %self.clock, "Date updated");

        let year = self.clock.year();
        if year >= self.min_valid_year {
            self.escalate(TimeValidity::DateValid);
        } else {
            warn!(
                year,
                min_valid_year = self.min_valid_year,
                "Date ignored for validity, year too early"
            );
        }
    }

    /// Apply a combined date-time update: time first, then date.
    ///
    /// The embedded summer-time flag is honoured only when the engine is
    /// configured with [`SummertimeSource::DateTimeFlag`].
    pub fn apply_date_time(&mut self, update: DateTimeUpdate) {
        self.apply_time(update.time);
        self.apply_date(update.date);
        if self.summertime_source == SummertimeSource::DateTimeFlag {
            if let Some(flag) = update.summertime {
                self.set_summertime(flag);
            }
        }
    }

    /// Apply an explicit summer-time flag from the bus.
    ///
    /// Sun times are recomputed immediately if the flag changes.
    pub fn apply_summertime_flag(&mut self, summertime: bool) {
        self.set_summertime(summertime);
    }
}
