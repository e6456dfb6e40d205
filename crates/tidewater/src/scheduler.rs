//! # Tick Scheduler
//!
//! Wall-clock pacing for the server binary plus repeating tasks keyed on the
//! server's tick count.
//!
//! `TickLoop` holds a deadline one period ahead of the last tick and sleeps
//! until it. A server that falls more than a full period behind restarts its
//! schedule from now instead of bursting to catch up. `RepeatingTask` never
//! looks at the clock: it fires on multiples of its interval, so a paced and
//! an unpaced run make the same sea-level passes.

use std::time::{Duration, Instant};

/// Fixed-rate pacer for the server loop.
#[derive(Debug)]
pub struct TickLoop {
    period: Duration,
    deadline: Instant,
    stats: TickStats,
}

/// Cost of the passes run under [`TickLoop::measure`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Passes measured.
    pub ticks: u64,
    /// Moving average, weighted 1/8 towards the latest pass.
    pub mean: Duration,
    /// Slowest pass.
    pub worst: Duration,
    /// Passes that took longer than one period.
    pub overruns: u64,
}

impl TickStats {
    fn record(&mut self, cost: Duration, period: Duration) {
        self.mean = if self.ticks == 0 {
            cost
        } else {
            (self.mean * 7 + cost) / 8
        };
        self.ticks += 1;
        self.worst = self.worst.max(cost);
        if cost > period {
            self.overruns += 1;
        }
    }
}

impl TickLoop {
    /// Paces at `tick_rate` ticks per second; zero means one.
    #[must_use]
    pub fn new(tick_rate: u32) -> Self {
        Self {
            period: Duration::from_secs(1) / tick_rate.max(1),
            deadline: Instant::now(),
            stats: TickStats::default(),
        }
    }

    /// Time between tick deadlines.
    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Blocks until the next tick is due. The first call returns at once.
    pub fn pace(&mut self) {
        let now = Instant::now();
        if let Some(wait) = self.deadline.checked_duration_since(now) {
            std::thread::sleep(wait);
        } else if now.duration_since(self.deadline) > self.period {
            self.deadline = now;
        }
        self.deadline += self.period;
    }

    /// Runs one pass and records its cost.
    pub fn measure<T>(&mut self, pass: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let out = pass();
        self.stats.record(started.elapsed(), self.period);
        out
    }

    /// Stats of every measured pass.
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }
}

/// A task that fires every `interval` ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepeatingTask {
    interval: u64,
    next_due: u64,
}

impl RepeatingTask {
    /// Fires on tick `interval`, then every `interval` ticks. A zero
    /// interval fires every tick.
    #[must_use]
    pub fn every(interval: u32) -> Self {
        let interval = u64::from(interval.max(1));
        Self {
            interval,
            next_due: interval,
        }
    }

    /// Ticks between firings.
    #[must_use]
    pub const fn interval(&self) -> u64 {
        self.interval
    }

    /// Tick of the next firing.
    #[must_use]
    pub const fn next_due(&self) -> u64 {
        self.next_due
    }

    /// Changes the interval. The pending firing is kept; later ones use
    /// the new interval.
    pub fn set_interval(&mut self, interval: u32) {
        self.interval = u64::from(interval.max(1));
    }

    /// Returns true if the task fires on `tick`, and schedules the next
    /// firing. Missed ticks collapse into one firing.
    pub fn poll(&mut self, tick: u64) -> bool {
        if tick < self.next_due {
            return false;
        }
        self.next_due = tick + self.interval;
        true
    }
}
