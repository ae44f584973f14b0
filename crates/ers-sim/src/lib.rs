//! ---
//! ers_section: "11-simulation"
//! ers_subsection: "01-bootstrap"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Simulation core module exports and shared types."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
//! Engine-room telemetry manipulation scenario.
//!
//! One physical process ([`PhysicalModel`]) feeds two consumers: the engine
//! room sees the raw readings, the bridge sees a copy that has passed through
//! a transport delay and an exponential smoother ([`TelemetryFilter`]). The
//! [`SimulationClock`] steps time, evaluates both alarms and publishes an
//! immutable [`SimulationSnapshot`] per tick.

pub mod alarm;
pub mod clock;
pub mod constants;
pub mod delay;
pub mod filter;
pub mod model;
pub mod snapshot;
pub mod status;

pub use alarm::{bridge_alarm, engine_alarm, AlarmOnsets, AlarmTransition, Feed};
pub use clock::{SimulationClock, TickOutcome};
pub use constants::{ALPHA, DELAY_STEPS, DT, MAX_STEPS, MAX_TIME};
pub use delay::DelayLine;
pub use filter::{ChannelFilter, ChannelOutput, DelayedRaw, ExponentialSmoother, FilterOutput, TelemetryFilter};
pub use model::{Phase, PhysicalModel, Readings};
pub use snapshot::{format_clock, SimulationSnapshot};
pub use status::{GaugeBand, StatusLevel, PRESSURE_BAND, TEMPERATURE_BAND};
