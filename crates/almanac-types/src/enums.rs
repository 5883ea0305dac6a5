//! Enumeration types for the Almanac time engine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Validity lattice
// ---------------------------------------------------------------------------

/// How much of the engine clock has been confirmed by external input.
///
/// The lattice is `Invalid < MinutesValid < DateValid < Valid`, where
/// `Valid` is the join of `MinutesValid` and `DateValid`. The engine only
/// ever escalates along this lattice; nothing downgrades it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TimeValidity {
    /// Nothing has been received yet.
    #[default]
    Invalid,
    /// A time of day has been received.
    MinutesValid,
    /// A date at or after the minimum valid year has been received.
    DateValid,
    /// Both time of day and date are confirmed.
    Valid,
}

impl TimeValidity {
    const MINUTES_BIT: u8 = 0b01;
    const DATE_BIT: u8 = 0b10;

    const fn bits(self) -> u8 {
        match self {
            Self::Invalid => 0,
            Self::MinutesValid => Self::MINUTES_BIT,
            Self::DateValid => Self::DATE_BIT,
            Self::Valid => Self::MINUTES_BIT | Self::DATE_BIT,
        }
    }

    const fn from_bits(bits: u8) -> Self {
        match bits & (Self::MINUTES_BIT | Self::DATE_BIT) {
            0 => Self::Invalid,
            Self::MINUTES_BIT => Self::MinutesValid,
            Self::DATE_BIT => Self::DateValid,
            _ => Self::Valid,
        }
    }

    /// Least upper bound of two validity states.
    ///
    /// `MinutesValid.join(DateValid)` is `Valid`; joining with `Invalid`
    /// is the identity.
    #[must_use]
    pub const fn join(self, other: Self) -> Self {
        Self::from_bits(self.bits() | other.bits())
    }

    /// Whether every component of `other` is already confirmed in `self`.
    pub const fn includes(self, other: Self) -> bool {
        self.bits() & other.bits() == other.bits()
    }

    /// Whether the time-of-day component is confirmed.
    pub const fn has_minutes(self) -> bool {
        self.includes(Self::MinutesValid)
    }

    /// Whether the date component is confirmed.
    pub const fn has_date(self) -> bool {
        self.includes(Self::DateValid)
    }
}

// ---------------------------------------------------------------------------
// Summertime policy
// ---------------------------------------------------------------------------

/// Where the "is summer time" flag comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummertimeSource {
    /// Reserved: a dedicated bus value carries the flag.
    BusValue,
    /// The flag accompanying a combined date-time payload.
    DateTimeFlag,
    /// Derived by the engine from the current date and time.
    #[default]
    Internal,
}

// ---------------------------------------------------------------------------
// Sun
// ---------------------------------------------------------------------------

/// Which horizon crossing of the Sun is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SunEvent {
    /// The Sun crosses the altitude upwards.
    Sunrise,
    /// The Sun crosses the altitude downwards.
    Sunset,
}

/// Shape of the Sun's diurnal arc relative to a target altitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiurnalArc {
    /// The Sun rises and sets across the altitude this day.
    Crossing,
    /// The Sun stays above the altitude all day (polar day).
    AlwaysAbove,
    /// The Sun stays below the altitude all day (polar night).
    AlwaysBelow,
}
