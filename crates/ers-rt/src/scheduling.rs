//! ---
//! ers_section: "01-core-functionality"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Runtime helpers supporting the simulation driver."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Async rate limiter yielding once per period.
///
/// The first tick fires one full period after construction, and a late tick
/// pushes the schedule back instead of bursting to catch up.
#[derive(Debug)]
pub struct RateLimiter {
    period: Duration,
    interval: Interval,
}

impl RateLimiter {
    /// `period` is floored at one microsecond.
    pub fn new(period: Duration) -> Self {
        let period = period.max(Duration::from_micros(1));
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { period, interval }
    }

    pub async fn tick(&mut self) -> Instant {
        self.interval.tick().await
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}
