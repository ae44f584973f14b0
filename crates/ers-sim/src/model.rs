//! ---
//! ers_section: "11-simulation"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Piecewise physical model of the engine fuel system."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use crate::constants::{
    CONSUMPTION_RISE_LPM, CRITICAL_START_SECS, PRESSURE_RISE_BAR, RISING_START_SECS,
    STEADY_CONSUMPTION_LPM, STEADY_PRESSURE_BAR, STEADY_TEMPERATURE_C, TEMPERATURE_RISE_C,
};
use crate::status::{StatusLevel, PRESSURE_BAND, TEMPERATURE_BAND};

/// One observation of the three monitored quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub pressure_bar: f64,
    pub temperature_c: f64,
    pub consumption_lpm: f64,
}

impl Readings {
    /// Phase-1 values; every buffer and filter is seeded from these.
    pub const STEADY_STATE: Readings = Readings {
        pressure_bar: STEADY_PRESSURE_BAR,
        temperature_c: STEADY_TEMPERATURE_C,
        consumption_lpm: STEADY_CONSUMPTION_LPM,
    };

    pub const fn new(pressure_bar: f64, temperature_c: f64, consumption_lpm: f64) -> Self {
        Self {
            pressure_bar,
            temperature_c,
            consumption_lpm,
        }
    }

    pub fn pressure_status(&self) -> StatusLevel {
        PRESSURE_BAND.classify(self.pressure_bar)
    }

    pub fn temperature_status(&self) -> StatusLevel {
        TEMPERATURE_BAND.classify(self.temperature_c)
    }
}

impl Default for Readings {
    fn default() -> Self {
        Self::STEADY_STATE
    }
}

/// Scenario phase at a given simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Normal,
    Rising,
    Critical,
}

impl Phase {
    pub fn at(time: f64) -> Self {
        if time < RISING_START_SECS {
            Phase::Normal
        } else if time < CRITICAL_START_SECS {
            Phase::Rising
        } else {
            Phase::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Normal => "Normal",
            Phase::Rising => "Rising",
            Phase::Critical => "Critical",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Phase::Normal => "Normal operation. All systems nominal.",
            Phase::Rising => "Fuel system obstruction. Pressure rising.",
            Phase::Critical => "Critical pressure. Bridge alarm delayed by cyber manipulation.",
        }
    }
}

/// True physical process: a fuel line that clogs between 10 s and 30 s.
///
/// Stateless and total; any time maps to a reading and the three segments
/// meet at the phase boundaries.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicalModel;

impl PhysicalModel {
    pub fn evaluate(time: f64) -> Readings {
        match Phase::at(time) {
            Phase::Normal => Readings::STEADY_STATE,
            Phase::Rising => {
                let factor = (time - RISING_START_SECS) / (CRITICAL_START_SECS - RISING_START_SECS);
                Readings {
                    pressure_bar: STEADY_PRESSURE_BAR + factor * PRESSURE_RISE_BAR,
                    temperature_c: STEADY_TEMPERATURE_C + factor * TEMPERATURE_RISE_C,
                    consumption_lpm: STEADY_CONSUMPTION_LPM + factor * CONSUMPTION_RISE_LPM,
                }
            }
            Phase::Critical => Readings {
                pressure_bar: STEADY_PRESSURE_BAR + PRESSURE_RISE_BAR,
                temperature_c: STEADY_TEMPERATURE_C + TEMPERATURE_RISE_C,
                consumption_lpm: STEADY_CONSUMPTION_LPM + CONSUMPTION_RISE_LPM,
            },
        }
    }
}
