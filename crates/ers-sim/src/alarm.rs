//! ---
//! ers_section: "11-simulation"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Alarm policy for the engine-room and bridge feeds."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{BRIDGE_ALARM_GATE_SECS, PRESSURE_ALARM_THRESHOLD_BAR};
use crate::model::Readings;

/// Which consumer of the telemetry an alarm belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feed {
    Engine,
    Bridge,
}

impl Feed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feed::Engine => "engine",
            Feed::Bridge => "bridge",
        }
    }
}

/// Engine room alarm: raw pressure over the threshold, no gating.
pub fn engine_alarm(truth: &Readings) -> bool {
    truth.pressure_bar > PRESSURE_ALARM_THRESHOLD_BAR
}

/// Bridge alarm: same threshold, held off until the gate time has passed.
pub fn bridge_alarm(time: f64, bridge: &Readings) -> bool {
    time > BRIDGE_ALARM_GATE_SECS && bridge.pressure_bar > PRESSURE_ALARM_THRESHOLD_BAR
}

/// Edge of an alarm signal observed on one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmTransition {
    pub feed: Feed,
    pub raised: bool,
    /// Simulated time of the tick that produced the edge.
    pub time: f64,
    /// Pressure the feed displayed on that tick.
    pub pressure_bar: f64,
    pub observed_at: DateTime<Utc>,
}

/// First simulated time each feed raised its alarm in the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AlarmOnsets {
    pub engine: Option<f64>,
    pub bridge: Option<f64>,
}

impl AlarmOnsets {
    /// Record a raise; later raises of the same feed are ignored.
    pub fn note(&mut self, feed: Feed, time: f64) {
        let slot = match feed {
            Feed::Engine => &mut self.engine,
            Feed::Bridge => &mut self.bridge,
        };
        slot.get_or_insert(time);
    }

    pub fn get(&self, feed: Feed) -> Option<f64> {
        match feed {
            Feed::Engine => self.engine,
            Feed::Bridge => self.bridge,
        }
    }

    /// How long the bridge learned of the fault after the engine room did.
    pub fn bridge_lag(&self) -> Option<f64> {
        Some(self.bridge? - self.engine?)
    }
}
