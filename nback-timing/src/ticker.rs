use std::time::{Duration, Instant};

/// Fixed tick period driving trial advancement.
pub const TICK_PERIOD: Duration = Duration::from_millis(50);

/// Deadline-based periodic tick source for an event loop.
///
/// The loop sleeps until [`Ticker::deadline`] and calls [`Ticker::poll`] on
/// wake-up. At most one tick is emitted per poll; when the loop has fallen a
/// full period behind, the schedule is re-anchored at `now` instead of
/// replaying the missed ticks.
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    deadline: Instant,
    last_fired: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            deadline: now + period,
            last_fired: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Restarts the schedule so the first tick lands one period after `now`.
    pub fn reset(&mut self, now: Instant) {
        self.deadline = now + self.period;
        self.last_fired = None;
    }

    /// Returns the interval since the previous tick when a tick is due.
    ///
    /// The first tick after a reset reports `Duration::ZERO`.
    pub fn poll(&mut self, now: Instant) -> Option<Duration> {
        if now < self.deadline {
            return None;
        }
        let interval = self
            .last_fired
            .map_or(Duration::ZERO, |prev| now.duration_since(prev));
        self.last_fired = Some(now);
        self.deadline += self.period;
        if self.deadline <= now {
            self.deadline = now + self.period;
        }
        Some(interval)
    }
}
