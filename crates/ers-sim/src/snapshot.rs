//! ---
//! ers_section: "11-simulation"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Immutable per-tick state published to presentation code."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::constants::MAX_TIME;
use crate::model::{Phase, Readings};

/// Composite state after a tick.
///
/// The engine feed mirrors `true_values`; the bridge feed carries the
/// delayed and smoothed pressure and temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub time: f64,
    pub true_values: Readings,
    pub engine_values: Readings,
    pub bridge_values: Readings,
    pub engine_alarm: bool,
    pub bridge_alarm: bool,
}

impl SimulationSnapshot {
    /// State at `time = 0`: every feed at steady state, no alarms.
    pub const fn initial() -> Self {
        Self {
            time: 0.0,
            true_values: Readings::STEADY_STATE,
            engine_values: Readings::STEADY_STATE,
            bridge_values: Readings::STEADY_STATE,
            engine_alarm: false,
            bridge_alarm: false,
        }
    }

    pub fn phase(&self) -> Phase {
        Phase::at(self.time)
    }

    /// Fraction of the session elapsed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        (self.time / MAX_TIME).clamp(0.0, 1.0)
    }

    pub fn clock_label(&self) -> String {
        format_clock(self.time)
    }

    /// Bridge pressure minus true pressure; negative while the feed understates.
    pub fn pressure_divergence(&self) -> f64 {
        self.bridge_values.pressure_bar - self.true_values.pressure_bar
    }
}

impl Default for SimulationSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}

/// `MM:SS` rendering of elapsed seconds.
pub fn format_clock(seconds: f64) -> String {
    let whole = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_snapshot_is_quiet() {
        let snapshot = SimulationSnapshot::initial();
        assert_eq!(snapshot.time, 0.0);
        assert!(!snapshot.engine_alarm && !snapshot.bridge_alarm);
        assert_eq!(snapshot.phase(), Phase::Normal);
        assert_eq!(snapshot.progress(), 0.0);
        assert_eq!(snapshot.pressure_divergence(), 0.0);
    }

    #[test]
    fn clock_label_formats_minutes_and_seconds() {
        assert_eq!(format_clock(0.0), "00:00");
        assert_eq!(format_clock(9.95), "00:09");
        assert_eq!(format_clock(60.0), "01:00");
        assert_eq!(format_clock(-3.0), "00:00");
    }

    #[test]
    fn progress_is_clamped() {
        let snapshot = SimulationSnapshot {
            time: 30.0,
            ..SimulationSnapshot::initial()
        };
        assert!((snapshot.progress() - 0.5).abs() < 1e-12);
        let done = SimulationSnapshot {
            time: 75.0,
            ..SimulationSnapshot::initial()
        };
        assert_eq!(done.progress(), 1.0);
    }

    #[test]
    fn serializes_with_field_names() {
        let json = serde_json::to_value(SimulationSnapshot::initial()).unwrap();
        assert_eq!(json["true_values"]["pressure_bar"], 100.0);
        assert_eq!(json["bridge_alarm"], false);
    }
}
