//! Rollover detection as an ordered graph of dirty calendar units.
//!
//! Each [`Unit`] keeps a cursor holding the last value the engine acted on.
//! A unit fires when the clock disagrees with its cursor, or when its
//! cursor was cleared. Firing a unit clears the cursors of its dependents:
//!
//! ```text
//! Hour  -> Minute
//! Month -> Year, Day
//! Year  -> Day
//! ```
//!
//! Units are visited in [`EVALUATION_ORDER`], a topological order of that
//! graph, so a cleared dependent always fires in the same pass. In
//! particular `Year` is visited before `Day`: movable feasts are current
//! before any day-level holiday match runs.

use crate::clock::CivilClock;

/// A calendar unit tracked for rollover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Hour of day.
    Hour,
    /// Minute of hour.
    Minute,
    /// Month of year.
    Month,
    /// Year.
    Year,
    /// Day of month.
    Day,
}

impl Unit {
    /// Units whose cursors are cleared when this unit fires.
    pub const fn dependents(self) -> &'static [Self] {
        match self {
            Self::Hour => &[Self::Minute],
            Self::Month => &[Self::Year, Self::Day],
            Self::Year => &[Self::Day],
            Self::Minute | Self::Day => &[],
        }
    }

    fn read(self, clock: &CivilClock) -> i32 {
        match self {
            Self::Hour => i32::from(clock.hour()),
            Self::Minute => i32::from(clock.minute()),
            Self::Month => i32::from(clock.month()),
            Self::Year => clock.year(),
            Self::Day => i32::from(clock.day()),
        }
    }
}

/// Topological order of the dependency graph.
pub const EVALUATION_ORDER: [Unit; 5] = [Unit::Hour, Unit::Minute, Unit::Month, Unit::Year, Unit::Day];

/// The units that fired during one observation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rollovers {
    hour: bool,
    minute: bool,
    month: bool,
    year: bool,
    day: bool,
}

impl Rollovers {
    /// Whether `unit` fired.
    pub const fn contains(&self, unit: Unit) -> bool {
        match unit {
            Unit::Hour => self.hour,
            Unit::Minute => self.minute,
            Unit::Month => self.month,
            Unit::Year => self.year,
            Unit::Day => self.day,
        }
    }

    /// Whether nothing fired.
    pub const fn is_empty(&self) -> bool {
        !(self.hour || self.minute || self.month || self.year || self.day)
    }

    const fn mark(&mut self, unit: Unit) {
        match unit {
            Unit::Hour => self.hour = true,
            Unit::Minute => self.minute = true,
            Unit::Month => self.month = true,
            Unit::Year => self.year = true,
            Unit::Day => self.day = true,
        }
    }
}

/// Last-observed value per unit; `None` forces the unit to fire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TickCursors {
    hour: Option<i32>,
    minute: Option<i32>,
    month: Option<i32>,
    year: Option<i32>,
    day: Option<i32>,
}

impl TickCursors {
    /// All cursors unset: the first observation fires every unit.
    pub const fn new() -> Self {
        Self {
            hour: None,
            minute: None,
            month: None,
            year: None,
            day: None,
        }
    }

    /// Compare the clock against every cursor in evaluation order,
    /// update the cursors, and report which units fired.
    pub fn observe(&mut self, clock: &CivilClock) -> Rollovers {
        let mut fired = Rollovers::default();
        for unit in EVALUATION_ORDER {
            let value = unit.read(clock);
            let cursor = self.cursor_mut(unit);
            if *cursor != Some(value) {
                *cursor = Some(value);
                fired.mark(unit);
                for dependent in unit.dependents() {
                    self.invalidate(*dependent);
                }
            }
        }
        fired
    }

    /// Clear a cursor so the unit and its dependents fire on the next
    /// observation.
    pub fn invalidate(&mut self, unit: Unit) {
        *self.cursor_mut(unit) = None;
        for dependent in unit.dependents() {
            self.invalidate(*dependent);
        }
    }

    /// Last value observed for `unit`, if set.
    pub const fn cursor(&self, unit: Unit) -> Option<i32> {
        match unit {
            Unit::Hour => self.hour,
            Unit::Minute => self.minute,
            Unit::Month => self.month,
            Unit::Year => self.year,
            Unit::Day => self.day,
        }
    }

    const fn cursor_mut(&mut self, unit: Unit) -> &mut Option<i32> {
        match unit {
            Unit::Hour => &mut self.hour,
            Unit::Minute => &mut self.minute,
            Unit::Month => &mut self.month,
            Unit::Year => &mut self.year,
            Unit::Day => &mut self.day,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn clock(y: i32, mo: i64, d: i64, h: i64, mi: i64, s: i64) -> CivilClock {
        CivilClock::from_parts(y, mo, d, h, mi, s).unwrap()
    }

    fn fired(rollovers: Rollovers) -> Vec<Unit> {
        EVALUATION_ORDER
            .into_iter()
            .filter(|unit| rollovers.contains(*unit))
            .collect()
    }

    #[test]
    fn evaluation_order_is_topological() {
        for (position, unit) in EVALUATION_ORDER.iter().enumerate() {
            for dependent in unit.dependents() {
                let dep_position = EVALUATION_ORDER.iter().position(|u| u == dependent);
                assert!(dep_position.unwrap() > position, "{unit:?} -> {dependent:?}");
            }
        }
    }

    #[test]
    fn first_observation_fires_everything() {
        let mut cursors = TickCursors::new();
        let rollovers = cursors.observe(&clock(2025, 6, 15, 10, 20, 0));
        assert_eq!(fired(rollovers), EVALUATION_ORDER.to_vec());
        assert_eq!(cursors.cursor(Unit::Year), Some(2025));
    }

    #[test]
    fn second_change_fires_nothing() {
        let mut cursors = TickCursors::new();
        let _ = cursors.observe(&clock(2025, 6, 15, 10, 20, 0));
        let rollovers = cursors.observe(&clock(2025, 6, 15, 10, 20, 1));
        assert!(rollovers.is_empty());
    }

    #[test]
    fn minute_change_fires_only_minute() {
        let mut cursors = TickCursors::new();
        let _ = cursors.observe(&clock(2025, 6, 15, 10, 20, 59));
        let rollovers = cursors.observe(&clock(2025, 6, 15, 10, 21, 0));
        assert_eq!(fired(rollovers), vec![Unit::Minute]);
    }

    #[test]
    fn hour_jump_with_same_minute_still_fires_minute() {
        let mut cursors = TickCursors::new();
        let _ = cursors.observe(&clock(2025, 6, 15, 10, 20, 0));
        let rollovers = cursors.observe(&clock(2025, 6, 15, 14, 20, 0));
        assert_eq!(fired(rollovers), vec![Unit::Hour, Unit::Minute]);
    }

    #[test]
    fn day_rollover_fires_day_but_not_year() {
        let mut cursors = TickCursors::new();
        let _ = cursors.observe(&clock(2025, 6, 15, 23, 59, 59));
        let rollovers = cursors.observe(&clock(2025, 6, 16, 0, 0, 0));
        assert_eq!(fired(rollovers), vec![Unit::Hour, Unit::Minute, Unit::Day]);
    }

    #[test]
    fn month_rollover_forces_year_and_day() {
        let mut cursors = TickCursors::new();
        let _ = cursors.observe(&clock(2025, 6, 30, 23, 59, 59));
        let rollovers = cursors.observe(&clock(2025, 7, 1, 0, 0, 0));
        assert_eq!(fired(rollovers), EVALUATION_ORDER.to_vec());
    }

    #[test]
    fn invalidated_year_cascades_to_day() {
        let mut cursors = TickCursors::new();
        let now = clock(2025, 6, 15, 10, 20, 0);
        let _ = cursors.observe(&now);
        cursors.invalidate(Unit::Year);
        assert_eq!(cursors.cursor(Unit::Day), None);
        let rollovers = cursors.observe(&now);
        assert_eq!(fired(rollovers), vec![Unit::Year, Unit::Day]);
    }

    #[test]
    fn invalidated_day_fires_alone() {
        let mut cursors = TickCursors::new();
        let now = clock(2025, 6, 15, 10, 20, 0);
        let _ = cursors.observe(&now);
        cursors.invalidate(Unit::Day);
        assert_eq!(fired(cursors.observe(&now)), vec![Unit::Day]);
    }
}
