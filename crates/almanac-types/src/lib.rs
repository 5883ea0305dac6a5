//! Shared type definitions for the Almanac time engine.
//!
//! This crate holds the plain value types exchanged between the engine and
//! its collaborators: the external-update payloads handed in by the bus
//! adapter's caller, and the results read back out (sun times, holiday
//! status, movable feasts).
//!
//! # Modules
//!
//! - [`enums`] -- Enumeration types (validity lattice, summertime source,
//!   sun events, diurnal arc outcome)
//! - [`structs`] -- Value structs (calendar days, local times, location,
//!   update payloads, holiday status)

pub mod enums;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{DiurnalArc, SunEvent, SummertimeSource, TimeValidity};
pub use structs::{
    CalendarDay, DateTimeUpdate, DateUpdate, HolidayStatus, LocalTime, Location, MovableFeasts,
    SunTimes, TimeUpdate,
};
