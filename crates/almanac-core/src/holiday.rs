//! Holiday rule table and the today/tomorrow matcher.
//!
//! The rule table is a constant. Which entries count as holidays is decided
//! by a [`HolidayMask`] chosen once at startup and checked at match time, so
//! the table itself is never mutated and several calendars with different
//! selections can coexist (one per engine instance).
//!
//! Matching scans the table in order and the first matching entry wins,
//! independently for today and for tomorrow. Entries are never reordered,
//! so table position is the permanent tie-break when two rules land on the
//! same day (for example the fourth Sunday of Advent on 24 December).

use almanac_types::{CalendarDay, HolidayStatus, MovableFeasts};
use chrono::{Datelike, NaiveDate, TimeDelta};

/// Number of entries in the holiday table.
pub const HOLIDAY_COUNT: usize = 32;

/// How a holiday's date is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HolidayRule {
    /// The same calendar day every year.
    Fixed {
        /// Day of month.
        day: u8,
        /// Month.
        month: u8,
    },
    /// A signed day offset from Easter Sunday.
    EasterRelative(i16),
    /// A signed day offset from the fourth Sunday of Advent.
    AdventRelative(i16),
    /// An unused table slot; never matches.
    Removed,
}

/// One named entry of the holiday table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HolidayEntry {
    /// Human-readable name for diagnostics.
    pub name: &'static str,
    /// Date rule.
    pub rule: HolidayRule,
}

const fn fixed(name: &'static str, day: u8, month: u8) -> HolidayEntry {
    HolidayEntry {
        name,
        rule: HolidayRule::Fixed { day, month },
    }
}

const fn easter(name: &'static str, offset: i16) -> HolidayEntry {
    HolidayEntry {
        name,
        rule: HolidayRule::EasterRelative(offset),
    }
}

const fn advent(name: &'static str, offset: i16) -> HolidayEntry {
    HolidayEntry {
        name,
        rule: HolidayRule::AdventRelative(offset),
    }
}

/// The reference holiday table (German-speaking regions).
pub const DEFAULT_HOLIDAYS: [HolidayEntry; HOLIDAY_COUNT] = [
    fixed("New Year's Day", 1, 1),
    fixed("Epiphany", 6, 1),
    easter("Fat Thursday", -52),
    easter("Shrove Monday", -48),
    easter("Shrove Tuesday", -47),
    easter("Ash Wednesday", -46),
    fixed("International Women's Day", 8, 3),
    easter("Maundy Thursday", -3),
    easter("Good Friday", -2),
    easter("Easter Sunday", 0),
    easter("Easter Monday", 1),
    fixed("Labour Day", 1, 5),
    easter("Ascension Day", 39),
    easter("Whit Sunday", 49),
    easter("Whit Monday", 50),
    easter("Corpus Christi", 60),
    fixed("Augsburg Peace Festival", 8, 8),
    fixed("Assumption Day", 15, 8),
    fixed("German Unity Day", 3, 10),
    fixed("Reformation Day", 31, 10),
    fixed("All Saints' Day", 1, 11),
    advent("Repentance and Prayer Day", -32),
    advent("First Sunday of Advent", -21),
    advent("Second Sunday of Advent", -14),
    advent("Third Sunday of Advent", -7),
    advent("Fourth Sunday of Advent", 0),
    fixed("Christmas Eve", 24, 12),
    fixed("Christmas Day", 25, 12),
    fixed("St. Stephen's Day", 26, 12),
    fixed("New Year's Eve", 31, 12),
    fixed("Austrian National Day", 26, 10),
    fixed("Immaculate Conception", 8, 12),
];

/// Selection of enabled table entries. Bit 31 selects entry 0, bit 0
/// selects entry 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HolidayMask(u32);

impl HolidayMask {
    /// Every entry enabled.
    pub const ALL: Self = Self(u32::MAX);
    /// No entry enabled.
    pub const NONE: Self = Self(0);

    /// Wrap a raw configuration mask.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Return the raw mask.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Return this mask with table entry `index` enabled.
    #[must_use]
    pub const fn with(self, index: usize) -> Self {
        match Self::bit_for(index) {
            Some(bit) => Self(self.0 | bit),
            None => self,
        }
    }

    /// Whether table entry `index` is enabled.
    pub const fn is_enabled(self, index: usize) -> bool {
        match Self::bit_for(index) {
            Some(bit) => self.0 & bit != 0,
            None => false,
        }
    }

    const fn bit_for(index: usize) -> Option<u32> {
        if index < HOLIDAY_COUNT {
            Some(0x8000_0000 >> index)
        } else {
            None
        }
    }
}

/// A resolved holiday for diagnostics: table position, name, and date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedHoliday {
    /// Zero-based table position.
    pub position: usize,
    /// Entry name.
    pub name: &'static str,
    /// Date in the evaluated year.
    pub day: CalendarDay,
}

/// Holiday table together with the startup selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HolidayCalendar {
    entries: &'static [HolidayEntry],
    mask: HolidayMask,
}

impl HolidayCalendar {
    /// Calendar over [`DEFAULT_HOLIDAYS`] with the given selection.
    pub const fn new(mask: HolidayMask) -> Self {
        Self {
            entries: &DEFAULT_HOLIDAYS,
            mask,
        }
    }

    /// Calendar over a custom table. Entries past [`HOLIDAY_COUNT`] are
    /// never enabled.
    pub const fn with_entries(entries: &'static [HolidayEntry], mask: HolidayMask) -> Self {
        Self { entries, mask }
    }

    /// Return the selection mask.
    pub const fn mask(&self) -> HolidayMask {
        self.mask
    }

    /// Name of the holiday behind a status index (1-based, 0 = none).
    pub fn name(&self, status_index: u8) -> Option<&'static str> {
        let position = usize::from(status_index).checked_sub(1)?;
        self.entries.get(position).map(|entry| entry.name)
    }

    /// Resolve a rule to a calendar day in `year`.
    ///
    /// Relative rules are shifted with full calendar arithmetic, so offsets
    /// may cross month boundaries. Returns `None` for removed slots and for
    /// relative rules while the feasts are still unset.
    pub fn resolve(rule: HolidayRule, year: i32, feasts: &MovableFeasts) -> Option<CalendarDay> {
        match rule {
            HolidayRule::Fixed { day, month } => Some(CalendarDay::new(day, month)),
            HolidayRule::EasterRelative(offset) => shift(feasts.easter, offset, year),
            HolidayRule::AdventRelative(offset) => shift(feasts.advent, offset, year),
            HolidayRule::Removed => None,
        }
    }

    /// Match `today` and the following day against the enabled rules.
    ///
    /// Rules resolve against `today`'s year; tomorrow is compared by day
    /// and month only, so 31 December finds a 1 January rule.
    pub fn evaluate(&self, today: NaiveDate, feasts: &MovableFeasts) -> HolidayStatus {
        let year = today.year();
        let today_day = CalendarDay::from(today);
        let tomorrow_day = today.succ_opt().map(CalendarDay::from);

        let mut status = HolidayStatus::default();
        for (position, day) in self.enabled(year, feasts) {
            let index = u8::try_from(position.saturating_add(1)).unwrap_or(u8::MAX);
            if status.today == 0 && day == today_day {
                status.today = index;
            }
            if status.tomorrow == 0 && Some(day) == tomorrow_day {
                status.tomorrow = index;
            }
            if status.today > 0 && status.tomorrow > 0 {
                break;
            }
        }
        status
    }

    /// Every enabled holiday resolved for `year`, in table order.
    pub fn resolved_for_year(&self, year: i32, feasts: &MovableFeasts) -> Vec<ResolvedHoliday> {
        self.enabled(year, feasts)
            .filter_map(|(position, day)| {
                self.entries.get(position).map(|entry| ResolvedHoliday {
                    position,
                    name: entry.name,
                    day,
                })
            })
            .collect()
    }

    fn enabled<'a>(
        &'a self,
        year: i32,
        feasts: &'a MovableFeasts,
    ) -> impl Iterator<Item = (usize, CalendarDay)> + 'a {
        let mask = self.mask;
        self.entries
            .iter()
            .enumerate()
            .filter(move |(position, _)| mask.is_enabled(*position))
            .filter_map(move |(position, entry)| {
                Self::resolve(entry.rule, year, feasts).map(|day| (position, day))
            })
    }
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::new(HolidayMask::ALL)
    }
}

fn shift(anchor: CalendarDay, offset: i16, year: i32) -> Option<CalendarDay> {
    NaiveDate::from_ymd_opt(year, u32::from(anchor.month), u32::from(anchor.day))?
        .checked_add_signed(TimeDelta::days(i64::from(offset)))
        .map(CalendarDay::from)
}
