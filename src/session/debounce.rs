//! DebounceScheduler: quiet-period gate for pattern scans
//!
//! Every text change restarts the quiet period; the pending scan fires on
//! the first poll after the period elapses. Timestamps are passed in
//! explicitly, so the scheduler itself never reads a clock.

use instant::Instant;
use std::time::Duration;

// =============================================================================
// DebounceScheduler
// =============================================================================

/// One-deadline debounce gate
#[derive(Debug, Clone)]
pub struct DebounceScheduler {
    quiet_period: Duration,
    deadline: Option<Instant>,
    /// Number of schedule calls (including reschedules)
    scheduled_count: u64,
    /// Number of deadlines that actually fired
    fired_count: u64,
}

impl DebounceScheduler {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            deadline: None,
            scheduled_count: 0,
            fired_count: 0,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Start (or restart) the quiet period at `now`.
    /// A pending deadline is replaced, never queued.
    pub fn schedule_at(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet_period);
        self.scheduled_count += 1;
    }

    /// True exactly once per deadline, on the first call at or past it.
    pub fn fire_at(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.fired_count += 1;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending deadline without firing it.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn scheduled_count(&self) -> u64 {
        self.scheduled_count
    }

    pub fn fired_count(&self) -> u64 {
        self.fired_count
    }
}

// =============================================================================
// Tests
// =============================================================================
