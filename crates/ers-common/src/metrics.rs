//! ---
//! ers_section: "01-core-functionality"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Shared primitives and utilities for the simulator runtime."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;

use crate::time::{abs_jitter, duration_to_micros};

/// Collects absolute tick jitter samples in microseconds.
#[derive(Debug, Default)]
pub struct JitterHistogram {
    samples: Mutex<Vec<u64>>,
}

impl JitterHistogram {
    pub fn record(&self, jitter: Duration) {
        self.samples.lock().push(duration_to_micros(jitter));
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> Option<JitterSummary> {
        let samples = self.samples.lock();
        if samples.is_empty() {
            return None;
        }
        let count = samples.len() as f64;
        let mean = samples.iter().map(|&v| v as f64).sum::<f64>() / count;
        let variance = if samples.len() > 1 {
            samples
                .iter()
                .map(|&v| {
                    let delta = v as f64 - mean;
                    delta * delta
                })
                .sum::<f64>()
                / (count - 1.0)
        } else {
            0.0
        };
        Some(JitterSummary {
            mean_us: mean,
            std_dev_us: variance.sqrt(),
            max_us: samples.iter().copied().max().unwrap_or_default(),
            min_us: samples.iter().copied().min().unwrap_or_default(),
            samples: samples.len() as u64,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JitterSummary {
    pub mean_us: f64,
    pub std_dev_us: f64,
    pub max_us: u64,
    pub min_us: u64,
    pub samples: u64,
}

/// Helper for measuring tick intervals against a target period.
#[derive(Debug)]
pub struct LoopTimingReporter {
    target_interval: Duration,
    last_tick: Mutex<Option<Instant>>,
    histogram: JitterHistogram,
}

impl LoopTimingReporter {
    pub fn new(target_interval: Duration) -> Self {
        Self {
            target_interval,
            last_tick: Mutex::new(None),
            histogram: JitterHistogram::default(),
        }
    }

    pub fn record_tick(&self) {
        self.record_tick_at(Instant::now());
    }

    /// Record a tick observed at `now`; the first call only arms the reporter.
    pub fn record_tick_at(&self, now: Instant) {
        let mut last_tick = self.last_tick.lock();
        if let Some(previous) = *last_tick {
            let actual = now.saturating_duration_since(previous);
            self.histogram
                .record(abs_jitter(actual, self.target_interval));
        }
        *last_tick = Some(now);
    }

    pub fn target_interval(&self) -> Duration {
        self.target_interval
    }

    pub fn histogram(&self) -> &JitterHistogram {
        &self.histogram
    }
}
