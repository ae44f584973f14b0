//! ---
//! ers_section: "11-simulation"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Simulation clock, lifecycle state machine and tick evaluation."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use chrono::Utc;
use tracing::{info, trace, warn};

use crate::alarm::{bridge_alarm, engine_alarm, AlarmOnsets, AlarmTransition, Feed};
use crate::constants::{DT, MAX_STEPS, MAX_TIME};
use crate::filter::{DelayedRaw, TelemetryFilter};
use crate::model::{PhysicalModel, Readings};
use crate::snapshot::SimulationSnapshot;

/// What a call to [`SimulationClock::tick`] did.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// The clock was not running; nothing changed.
    Idle,
    /// Time advanced by one step and a new snapshot was published.
    Advanced { transitions: Vec<AlarmTransition> },
    /// The step would have reached the end of the session: time was clamped
    /// to `MAX_TIME` and the clock stopped.
    Finished,
}

/// Owns elapsed time, the bridge filter state and the published snapshot.
///
/// All mutation goes through `play`, `pause`, `reset` and `tick`. Time is
/// derived from an integer step count so that it lands exactly on the
/// scenario boundaries instead of accumulating rounding error.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    step: u32,
    running: bool,
    filter: TelemetryFilter,
    snapshot: SimulationSnapshot,
    delayed: DelayedRaw,
    onsets: AlarmOnsets,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationClock {
    pub fn new() -> Self {
        Self {
            step: 0,
            running: false,
            filter: TelemetryFilter::new(),
            snapshot: SimulationSnapshot::initial(),
            delayed: steady_delayed(),
            onsets: AlarmOnsets::default(),
        }
    }

    /// Start ticking. Returns `false` when the clock was already running.
    pub fn play(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        info!(time = self.snapshot.time, step = self.step, "simulation playing");
        true
    }

    /// Stop ticking, keeping all accumulated state. Returns `false` when
    /// the clock was already stopped.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        info!(time = self.snapshot.time, step = self.step, "simulation paused");
        true
    }

    /// Stop and return to the initial state.
    pub fn reset(&mut self) {
        self.running = false;
        self.step = 0;
        self.filter.reset();
        self.snapshot = SimulationSnapshot::initial();
        self.delayed = steady_delayed();
        self.onsets = AlarmOnsets::default();
        info!("simulation reset");
    }

    /// Advance by one step of `DT` if running.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        let next_step = self.step.saturating_add(1);
        if next_step >= MAX_STEPS {
            self.step = MAX_STEPS;
            self.snapshot.time = MAX_TIME;
            self.running = false;
            info!(
                time = MAX_TIME,
                engine_onset = ?self.onsets.engine,
                bridge_onset = ?self.onsets.bridge,
                "simulation reached end of session"
            );
            return TickOutcome::Finished;
        }

        self.step = next_step;
        let time = f64::from(next_step) * DT;
        let truth = PhysicalModel::evaluate(time);
        let filtered = self.filter.apply(&truth);
        self.delayed = filtered.delayed;

        let next = SimulationSnapshot {
            time,
            true_values: truth,
            engine_values: truth,
            bridge_values: filtered.bridge,
            engine_alarm: engine_alarm(&truth),
            bridge_alarm: bridge_alarm(time, &filtered.bridge),
        };

        let mut transitions = Vec::new();
        self.detect_edge(Feed::Engine, &next, &mut transitions);
        self.detect_edge(Feed::Bridge, &next, &mut transitions);

        trace!(
            step = next_step,
            time,
            true_pressure = truth.pressure_bar,
            bridge_pressure = filtered.bridge.pressure_bar,
            delayed_pressure = filtered.delayed.pressure_bar,
            engine_alarm = next.engine_alarm,
            bridge_alarm = next.bridge_alarm,
            "tick"
        );

        self.snapshot = next;
        TickOutcome::Advanced { transitions }
    }

    fn detect_edge(
        &mut self,
        feed: Feed,
        next: &SimulationSnapshot,
        transitions: &mut Vec<AlarmTransition>,
    ) {
        let (was, now, readings) = match feed {
            Feed::Engine => (self.snapshot.engine_alarm, next.engine_alarm, next.engine_values),
            Feed::Bridge => (self.snapshot.bridge_alarm, next.bridge_alarm, next.bridge_values),
        };
        if was == now {
            return;
        }
        if now {
            self.onsets.note(feed, next.time);
            warn!(
                feed = feed.as_str(),
                time = next.time,
                pressure_bar = readings.pressure_bar,
                "alarm raised"
            );
        } else {
            info!(
                feed = feed.as_str(),
                time = next.time,
                pressure_bar = readings.pressure_bar,
                "alarm cleared"
            );
        }
        transitions.push(AlarmTransition {
            feed,
            raised: now,
            time: next.time,
            pressure_bar: readings.pressure_bar,
            observed_at: Utc::now(),
        });
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SimulationSnapshot {
        self.snapshot
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True once the session has been clamped at `MAX_TIME`.
    pub fn is_finished(&self) -> bool {
        self.step >= MAX_STEPS
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn max_time(&self) -> f64 {
        MAX_TIME
    }

    /// Samples that entered the bridge smoothers on the latest tick.
    pub fn last_delayed(&self) -> DelayedRaw {
        self.delayed
    }

    pub fn alarm_onsets(&self) -> AlarmOnsets {
        self.onsets
    }

    pub fn filter(&self) -> &TelemetryFilter {
        &self.filter
    }
}

fn steady_delayed() -> DelayedRaw {
    let steady = Readings::STEADY_STATE;
    DelayedRaw {
        pressure_bar: steady.pressure_bar,
        temperature_c: steady.temperature_c,
    }
}
