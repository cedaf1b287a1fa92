//! # Tick Cadence
//!
//! Fixed-interval generation timer.
//!
//! ## Design
//!
//! The cadence keeps one deadline, `next_due`. A generation runs whenever the
//! clock has passed it, and each generation moves it forward by one interval:
//!
//! ```text
//!   due      due      due      due
//! ───┼────────┼────────┼────────┼──> time
//!    └ tick   └ tick   └ slow tick ──┘ two back-to-back to catch up
//! ```
//!
//! After a stall the deadline is pulled forward so that at most
//! [`MAX_CATCH_UP_TICKS`] generations run back-to-back. Paused time is never
//! owed: resuming schedules the next generation one interval later. A
//! deadline past what `Instant` can represent is never due.

use std::time::{Duration, Instant};

/// Most generations run back-to-back to catch up after a stall.
pub const MAX_CATCH_UP_TICKS: u32 = 5;

/// Fixed-interval cadence controller.
pub struct TickLoop {
    interval: Duration,
    /// When the next generation is due. `None` if that is unrepresentable.
    next_due: Option<Instant>,
    paused: bool,
    stats: TickStats,
}

/// How long generations took.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickStats {
    /// Fastest generation (`Duration::MAX` until one is measured).
    pub min: Duration,
    /// Slowest generation.
    pub max: Duration,
    /// Exponential moving average, weight 1/16.
    pub average: Duration,
    /// Generations that took longer than the interval.
    pub late: u64,
    /// Generations measured.
    pub measured: u64,
}

impl Default for TickStats {
    fn default() -> Self {
        Self {
            min: Duration::MAX,
            max: Duration::ZERO,
            average: Duration::ZERO,
            late: 0,
            measured: 0,
        }
    }
}

impl TickStats {
    fn record(&mut self, elapsed: Duration, interval: Duration) {
        self.measured += 1;
        self.min = self.min.min(elapsed);
        self.max = self.max.max(elapsed);
        self.average = if self.measured == 1 {
            elapsed
        } else {
            (self.average * 15 + elapsed) / 16
        };
        if elapsed > interval {
            self.late += 1;
        }
    }
}

impl TickLoop {
    /// Creates a running cadence. The first generation is due one interval
    /// from now.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: Instant::now().checked_add(interval),
            paused: false,
            stats: TickStats::default(),
        }
    }

    /// Returns true if a generation is due.
    ///
    /// Call in a loop, with [`TickLoop::begin_tick`] per `true`, until it
    /// returns false. Always false while paused.
    #[must_use]
    pub fn should_tick(&mut self) -> bool {
        let Some(due) = self.next_due.filter(|_| !self.paused) else {
            return false;
        };

        let now = Instant::now();
        let window = self.interval.saturating_mul(MAX_CATCH_UP_TICKS - 1);
        if let Some(earliest) = now.checked_sub(window) {
            if due < earliest {
                self.next_due = Some(earliest);
            }
        }
        self.next_due.is_some_and(|due| now >= due)
    }

    /// Consumes the due generation. Returns its start time for
    /// [`TickLoop::end_tick`].
    #[must_use]
    pub fn begin_tick(&mut self) -> Instant {
        self.next_due = self.next_due.and_then(|due| due.checked_add(self.interval));
        Instant::now()
    }

    /// Records how long the generation started at `start` took.
    pub fn end_tick(&mut self, start: Instant) {
        self.stats.record(start.elapsed(), self.interval);
    }

    /// Time left until the next generation is due. `Duration::MAX` while
    /// paused or when no generation will ever be due.
    #[must_use]
    pub fn time_until_next_tick(&self) -> Duration {
        match self.next_due {
            Some(due) if !self.paused => due.saturating_duration_since(Instant::now()),
            _ => Duration::MAX,
        }
    }

    /// Stops the cadence.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Restarts the cadence. The next generation is due one interval from now.
    pub fn resume(&mut self) {
        self.paused = false;
        self.next_due = Instant::now().checked_add(self.interval);
    }

    /// Whether the cadence is stopped.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Target interval between generations.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Timing statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Forgets all timing statistics.
    pub fn reset_stats(&mut self) {
        self.stats = TickStats::default();
    }
}
