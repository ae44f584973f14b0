//! ---
//! ers_section: "11-simulation"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Delayed and smoothed bridge telemetry feed."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::constants::{ALPHA, DELAY_STEPS, STEADY_PRESSURE_BAR, STEADY_TEMPERATURE_C};
use crate::delay::DelayLine;
use crate::model::Readings;

/// First-order IIR low-pass: `value <- alpha * value + (1 - alpha) * input`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialSmoother {
    alpha: f64,
    value: f64,
}

impl ExponentialSmoother {
    /// `alpha` is clamped to `[0, 1]` so the output stays a convex combination.
    pub fn new(alpha: f64, seed: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            value: seed,
        }
    }

    pub fn update(&mut self, input: f64) -> f64 {
        self.value = self.alpha * self.value + (1.0 - self.alpha) * input;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn reseed(&mut self, seed: f64) {
        self.value = seed;
    }
}

/// Result of pushing one true sample through a [`ChannelFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelOutput {
    /// Sample that left the delay line this tick and entered the smoother.
    pub delayed_raw: f64,
    pub filtered: f64,
}

/// Delay line followed by a smoother, seeded at a steady-state value.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelFilter {
    delay: DelayLine,
    smoother: ExponentialSmoother,
    seed: f64,
}

impl ChannelFilter {
    pub fn new(delay_steps: usize, alpha: f64, seed: f64) -> Self {
        Self {
            delay: DelayLine::filled(delay_steps, seed),
            smoother: ExponentialSmoother::new(alpha, seed),
            seed,
        }
    }

    pub fn process(&mut self, sample: f64) -> ChannelOutput {
        let delayed_raw = self.delay.push(sample);
        let filtered = self.smoother.update(delayed_raw);
        ChannelOutput {
            delayed_raw,
            filtered,
        }
    }

    pub fn value(&self) -> f64 {
        self.smoother.value()
    }

    pub fn delay_line(&self) -> &DelayLine {
        &self.delay
    }

    pub fn reset(&mut self) {
        self.delay.refill(self.seed);
        self.smoother.reseed(self.seed);
    }
}

/// The pair of samples that entered the smoothers on the latest tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayedRaw {
    pub pressure_bar: f64,
    pub temperature_c: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterOutput {
    pub delayed: DelayedRaw,
    /// What the bridge displays: smoothed pressure and temperature, raw consumption.
    pub bridge: Readings,
}

/// Manipulated bridge feed.
///
/// Pressure and temperature each get their own delay line and smoother;
/// consumption is forwarded untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryFilter {
    pressure: ChannelFilter,
    temperature: ChannelFilter,
}

impl Default for TelemetryFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryFilter {
    pub fn new() -> Self {
        Self {
            pressure: ChannelFilter::new(DELAY_STEPS, ALPHA, STEADY_PRESSURE_BAR),
            temperature: ChannelFilter::new(DELAY_STEPS, ALPHA, STEADY_TEMPERATURE_C),
        }
    }

    pub fn apply(&mut self, truth: &Readings) -> FilterOutput {
        let pressure = self.pressure.process(truth.pressure_bar);
        let temperature = self.temperature.process(truth.temperature_c);
        FilterOutput {
            delayed: DelayedRaw {
                pressure_bar: pressure.delayed_raw,
                temperature_c: temperature.delayed_raw,
            },
            bridge: Readings {
                pressure_bar: pressure.filtered,
                temperature_c: temperature.filtered,
                consumption_lpm: truth.consumption_lpm,
            },
        }
    }

    pub fn pressure(&self) -> &ChannelFilter {
        &self.pressure
    }

    pub fn temperature(&self) -> &ChannelFilter {
        &self.temperature
    }

    pub fn reset(&mut self) {
        self.pressure.reset();
        self.temperature.reset();
    }
}
