//! The host side of the engine: seeding from the system clock and the
//! polling loop.
//!
//! On the device the engine is polled from the firmware main loop and
//! receives its time from the bus. Here the system clock stands in for the
//! bus time source, and a tokio interval stands in for the main loop.

use std::future::Future;
use std::time::Duration;

use almanac_core::TimerEngine;
use almanac_core::pacer::MonotonicSource;
use almanac_types::{DateTimeUpdate, DateUpdate, TimeUpdate};
use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use tracing::{debug, info};

const SECONDS_PER_HOUR: i32 = 3600;

/// Counters collected while the host loop ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostSummary {
    /// Engine ticks executed.
    pub ticks: u64,
    /// Minute-changed edges consumed.
    pub minute_edges: u64,
    /// Holiday-changed edges consumed.
    pub holiday_edges: u64,
}

/// Build a bus-style date-time update from a wall-clock reading.
///
/// The summer-time flag is set when the reading's UTC offset differs from
/// the configured standard `timezone`.
pub fn system_update(now: DateTime<FixedOffset>, timezone: i8) -> DateTimeUpdate {
    let standard_offset = i32::from(timezone).saturating_mul(SECONDS_PER_HOUR);
    DateTimeUpdate {
        time: TimeUpdate {
            hour: narrow(now.hour()),
            minute: narrow(now.minute()),
            second: narrow(now.second()),
        },
        date: DateUpdate {
            day: narrow(now.day()),
            month: narrow(now.month()),
            year: now.year(),
        },
        summertime: Some(now.offset().local_minus_utc() != standard_offset),
    }
}

fn narrow(value: u32) -> u8 {
    u8::try_from(value).unwrap_or(0)
}

/// Poll the engine every `poll_interval` until `shutdown` resolves.
///
/// Every poll drains the engine's pending ticks one by one and consumes
/// the minute and holiday edges, logging each.
pub async fn run<M, F>(
    engine: &mut TimerEngine<M>,
    poll_interval: Duration,
    shutdown: F,
) -> HostSummary
where
    M: MonotonicSource,
    F: Future<Output = ()>,
{
    let mut summary = HostSummary::default();
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!(poll_interval = ?poll_interval, "Entering poll loop");
    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            _ = interval.tick() => {
                while engine.poll().is_some() {
                    summary.ticks = summary.ticks.saturating_add(1);
                    consume_edges(engine, &mut summary);
                }
            }
        }
    }
    summary
}

fn consume_edges<M: MonotonicSource>(engine: &mut TimerEngine<M>, summary: &mut HostSummary) {
    if engine.take_minute_changed() {
        summary.minute_edges = summary.minute_edges.saturating_add(1);
        debug!(time = %engine.clock(), "Minute changed");
    }
    if let Some(status) = engine.take_holiday_changed() {
        summary.holiday_edges = summary.holiday_edges.saturating_add(1);
        info!(
            today = status.today,
            tomorrow = status.tomorrow,
            today_name = engine.holiday_name(status.today).unwrap_or("-"),
            tomorrow_name = engine.holiday_name(status.tomorrow).unwrap_or("-"),
            "Holiday edge"
        );
    }
}
