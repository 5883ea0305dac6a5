//! Monotonic time source and the drift-free tick accumulator.
//!
//! The engine never reads wall-clock time. It asks a [`MonotonicSource`]
//! for elapsed milliseconds and lets a [`TickPacer`] decide when the next
//! simulated second is due. Each consumed tick moves the threshold forward
//! by exactly one interval, so late polls do not push later ticks back.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Source of monotonically increasing milliseconds.
pub trait MonotonicSource {
    /// Milliseconds elapsed since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;
}

/// Monotonic source backed by [`Instant`], counting from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemMonotonic {
    origin: Instant,
}

impl SystemMonotonic {
    /// Start counting from now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemMonotonic {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicSource for SystemMonotonic {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Manually driven monotonic source.
///
/// Clones share the same counter, so a test can keep one handle and give
/// another to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualMonotonic {
    millis: Arc<AtomicU64>,
}

impl ManualMonotonic {
    /// Create a source reading 0 ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current reading.
    pub fn set(&self, ms: u64) {
        self.millis.store(ms, Ordering::Release);
    }

    /// Move the reading forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.millis.fetch_add(ms, Ordering::AcqRel);
    }
}

impl MonotonicSource for ManualMonotonic {
    fn now_ms(&self) -> u64 {
        self.millis.load(Ordering::Acquire)
    }
}

/// Decides when the next tick is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickPacer {
    last_ms: u64,
    interval_ms: u64,
}

impl TickPacer {
    /// Create a pacer whose first tick is due one interval after `now_ms`.
    pub const fn new(now_ms: u64, interval_ms: u64) -> Self {
        Self {
            last_ms: now_ms,
            interval_ms,
        }
    }

    /// Whether a full interval has elapsed since the last threshold.
    /// Wrapping subtraction keeps this correct across counter rollover.
    pub const fn is_due(&self, now_ms: u64) -> bool {
        now_ms.wrapping_sub(self.last_ms) >= self.interval_ms
    }

    /// Move the threshold forward by exactly one interval.
    pub const fn consume(&mut self) {
        self.last_ms = self.last_ms.wrapping_add(self.interval_ms);
    }

    /// Restart counting from `now_ms` (after an external time update).
    pub const fn resync(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
    }

    /// Configured interval.
    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_after_full_interval() {
        let pacer = TickPacer::new(0, 1000);
        assert!(!pacer.is_due(999));
        assert!(pacer.is_due(1000));
    }

    #[test]
    fn late_poll_does_not_accumulate_drift() {
        let mut pacer = TickPacer::new(0, 1000);
        // Polled 300 ms late.
        assert!(pacer.is_due(1300));
        pacer.consume();
        // Next tick is still due at 2000, not 2300.
        assert!(!pacer.is_due(1999));
        assert!(pacer.is_due(2000));
    }

    #[test]
    fn backlog_drains_one_tick_per_consume() {
        let mut pacer = TickPacer::new(0, 1000);
        let mut ticks = 0;
        while pacer.is_due(3500) {
            pacer.consume();
            ticks += 1;
        }
        assert_eq!(ticks, 3);
    }

    #[test]
    fn resync_restarts_interval() {
        let mut pacer = TickPacer::new(0, 1000);
        pacer.resync(1800);
        assert!(!pacer.is_due(2000));
        assert!(pacer.is_due(2800));
    }

    #[test]
    fn manual_source_is_shared_between_clones() {
        let source = ManualMonotonic::new();
        let handle = source.clone();
        handle.advance(250);
        handle.advance(250);
        assert_eq!(source.now_ms(), 500);
        handle.set(10);
        assert_eq!(source.now_ms(), 10);
    }

    #[test]
    fn system_source_is_monotonic() {
        let source = SystemMonotonic::new();
        let first = source.now_ms();
        let second = source.now_ms();
        assert!(second >= first);
    }
}
