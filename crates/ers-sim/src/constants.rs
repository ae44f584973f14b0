//! ---
//! ers_section: "11-simulation"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Fixed scenario parameters."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
//! Fixed scenario parameters. None of these are runtime-configurable.

/// Simulated seconds advanced per tick.
pub const DT: f64 = 0.1;

/// Length of a session in simulated seconds.
pub const MAX_TIME: f64 = 60.0;

/// Ticks in a full session; the tick that would reach `MAX_TIME` auto-stops.
pub const MAX_STEPS: u32 = 600;

/// Transport delay of the bridge feed, in ticks (10 s at `DT`).
pub const DELAY_STEPS: usize = 100;

/// Weight of the previous filter value in the bridge smoother.
pub const ALPHA: f64 = 0.92;

/// Pressure above which either feed raises its alarm, in bar.
pub const PRESSURE_ALARM_THRESHOLD_BAR: f64 = 120.0;

/// The bridge alarm stays suppressed until simulated time exceeds this.
pub const BRIDGE_ALARM_GATE_SECS: f64 = 35.0;

/// Start of the rising phase.
pub const RISING_START_SECS: f64 = 10.0;

/// Start of the critical phase.
pub const CRITICAL_START_SECS: f64 = 30.0;

pub const STEADY_PRESSURE_BAR: f64 = 100.0;
pub const STEADY_TEMPERATURE_C: f64 = 110.0;
pub const STEADY_CONSUMPTION_LPM: f64 = 100.0;

pub const PRESSURE_RISE_BAR: f64 = 40.0;
pub const TEMPERATURE_RISE_C: f64 = 20.0;
pub const CONSUMPTION_RISE_LPM: f64 = 4.0;

/// Operator-facing text shown alongside a raised alarm.
pub const ALARM_MESSAGE: &str = "HIGH FUEL PRESSURE";
