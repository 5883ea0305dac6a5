//! Calendar and astronomical time engine for an embedded controller.
//!
//! The engine keeps one authoritative local civil clock, advanced once per
//! second and corrected by external time/date updates. From it, the engine
//! derives daylight-saving state, a two-day holiday lookup, and daily
//! sunrise/sunset times.
//!
//! # Modules
//!
//! - [`clock`] -- Normalized civil date-time with `mktime`-style overflow.
//! - [`config`] -- Configuration loading from `almanac-config.yaml`.
//! - [`cursors`] -- Rollover detection as an ordered graph of dirty units.
//! - [`engine`] -- [`TimerEngine`], the tick state machine and accessors.
//! - [`feasts`] -- Easter and fourth-Advent computation.
//! - [`holiday`] -- The holiday rule table and today/tomorrow matcher.
//! - [`ingest`] -- Application of external time, date, and summer-time
//!   updates.
//! - [`pacer`] -- Monotonic millisecond source and the drift-free tick
//!   accumulator.
//! - [`solar`] -- Sunrise/sunset solver from orbital elements.
//! - [`summertime`] -- Daylight-saving evaluation for European rules.
//!
//! [`TimerEngine`]: engine::TimerEngine

pub mod clock;
pub mod config;
pub mod cursors;
pub mod engine;
pub mod feasts;
pub mod holiday;
pub mod ingest;
pub mod pacer;
pub mod solar;
pub mod summertime;

pub use engine::{AlmanacSnapshot, TickOutcome, TimerEngine};
