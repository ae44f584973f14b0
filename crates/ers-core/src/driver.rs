//! ---
//! ers_section: "01-core-functionality"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Simulation driver and lifecycle management."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use std::sync::Arc;
use std::time::Duration;

use ers_common::config::DriverConfig;
use ers_common::metrics::LoopTimingReporter;
use ers_rt::RateLimiter;
use ers_sim::{
    AlarmOnsets, AlarmTransition, SimulationClock, SimulationSnapshot, TickOutcome, DT, MAX_TIME,
};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{DriverError, Result};

const ALARM_CHANNEL_CAPACITY: usize = 16;

/// Clock plus the epoch of the loop currently allowed to tick it.
///
/// Every lifecycle call that stops ticking bumps `epoch`; a loop whose epoch
/// no longer matches exits without touching the clock.
#[derive(Debug)]
struct DriverState {
    clock: SimulationClock,
    epoch: u64,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<DriverState>,
    snapshots: watch::Sender<SimulationSnapshot>,
    alarms: broadcast::Sender<AlarmTransition>,
}

impl Shared {
    /// Tick once on behalf of the loop tagged `epoch`. Returns whether the
    /// loop should keep running.
    fn step(&self, epoch: u64) -> bool {
        let mut state = self.state.lock();
        if state.epoch != epoch || !state.clock.is_running() {
            return false;
        }
        let outcome = state.clock.tick();
        self.snapshots.send_replace(state.clock.snapshot());
        match outcome {
            TickOutcome::Advanced { transitions } => {
                for transition in transitions {
                    let _ = self.alarms.send(transition);
                }
                true
            }
            TickOutcome::Finished | TickOutcome::Idle => false,
        }
    }
}

#[derive(Debug)]
struct LoopTask {
    epoch: u64,
    stop: broadcast::Sender<()>,
    handle: JoinHandle<()>,
}

/// Runs the simulation clock on a tokio task, one tick per `DT / speedup`.
///
/// The clock itself lives behind a lock shared with the loop; readers always
/// observe a whole snapshot, either before or after a tick.
#[derive(Debug)]
pub struct SimulationDriver {
    shared: Arc<Shared>,
    task: Mutex<Option<LoopTask>>,
    runtime: Handle,
    period: Duration,
    stop_timeout: Duration,
}

impl SimulationDriver {
    /// Create a stopped driver at the initial state. Must be called from
    /// within a tokio runtime; the loop task is spawned on that runtime.
    pub fn new(config: &DriverConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|err| DriverError::InvalidConfig(err.to_string()))?;
        let period = config
            .tick_period(DT)
            .map_err(|err| DriverError::InvalidConfig(err.to_string()))?;
        let runtime = Handle::try_current()?;
        let clock = SimulationClock::new();
        let (snapshots, _) = watch::channel(clock.snapshot());
        let (alarms, _) = broadcast::channel(ALARM_CHANNEL_CAPACITY);
        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(DriverState { clock, epoch: 0 }),
                snapshots,
                alarms,
            }),
            task: Mutex::new(None),
            runtime,
            period,
            stop_timeout: config.stop_timeout,
        })
    }

    /// Start ticking. Returns `false` when already running.
    pub fn play(&self) -> bool {
        let mut task = self.task.lock();
        let epoch = {
            let mut state = self.shared.state.lock();
            let live = task
                .as_ref()
                .is_some_and(|t| t.epoch == state.epoch && !t.handle.is_finished());
            let started = state.clock.play();
            if !started && live {
                return false;
            }
            state.epoch += 1;
            state.epoch
        };
        if let Some(previous) = task.take() {
            let _ = previous.stop.send(());
        }
        let (stop, stop_rx) = broadcast::channel(1);
        let handle = self.runtime.spawn(run_loop(
            self.shared.clone(),
            self.period,
            epoch,
            stop_rx,
        ));
        *task = Some(LoopTask {
            epoch,
            stop,
            handle,
        });
        debug!(epoch, period_us = self.period.as_micros() as u64, "scheduling loop spawned");
        true
    }

    /// Stop ticking and keep all state. No tick runs once this returns.
    pub fn pause(&self) -> bool {
        let task = self.task.lock();
        let paused = {
            let mut state = self.shared.state.lock();
            state.epoch += 1;
            state.clock.pause()
        };
        if let Some(task) = task.as_ref() {
            let _ = task.stop.send(());
        }
        paused
    }

    /// Stop the loop, wait for it to exit and return to the initial state.
    ///
    /// The state is reset even when the loop fails to stop in time; in that
    /// case the task is aborted and [`DriverError::StopTimedOut`] reported.
    pub async fn reset(&self) -> Result<()> {
        let task = self.halt();
        let joined = self.join(task).await;
        {
            let mut state = self.shared.state.lock();
            state.epoch += 1;
            state.clock.reset();
            self.shared.snapshots.send_replace(state.clock.snapshot());
        }
        info!("driver reset");
        joined
    }

    /// Stop ticking and wait for the loop to exit, keeping the state.
    pub async fn shutdown(&self) -> Result<()> {
        let task = self.halt();
        let joined = self.join(task).await;
        info!(time = self.snapshot().time, "driver shut down");
        joined
    }

    fn halt(&self) -> Option<LoopTask> {
        let mut task = self.task.lock();
        {
            let mut state = self.shared.state.lock();
            state.epoch += 1;
            state.clock.pause();
        }
        let task = task.take();
        if let Some(task) = task.as_ref() {
            let _ = task.stop.send(());
        }
        task
    }

    async fn join(&self, task: Option<LoopTask>) -> Result<()> {
        let Some(LoopTask { epoch, handle, .. }) = task else {
            return Ok(());
        };
        let abort = handle.abort_handle();
        match tokio::time::timeout(self.stop_timeout, handle).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) if err.is_cancelled() => Ok(()),
            Ok(Err(err)) => {
                error!(epoch, error = %err, "scheduling loop join error");
                Err(DriverError::TaskPanicked(err.to_string()))
            }
            Err(_) => {
                abort.abort();
                warn!(epoch, timeout_ms = self.stop_timeout.as_millis() as u64, "scheduling loop did not stop in time");
                Err(DriverError::StopTimedOut(self.stop_timeout))
            }
        }
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SimulationSnapshot {
        self.shared.state.lock().clock.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.shared.state.lock().clock.is_running()
    }

    pub fn alarm_onsets(&self) -> AlarmOnsets {
        self.shared.state.lock().clock.alarm_onsets()
    }

    /// Receiver that observes every published snapshot, newest wins.
    pub fn subscribe(&self) -> watch::Receiver<SimulationSnapshot> {
        self.shared.snapshots.subscribe()
    }

    /// Receiver for alarm raise/clear edges.
    pub fn alarm_events(&self) -> broadcast::Receiver<AlarmTransition> {
        self.shared.alarms.subscribe()
    }

    pub fn max_time(&self) -> f64 {
        MAX_TIME
    }

    pub fn tick_period(&self) -> Duration {
        self.period
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        self.shared.state.lock().epoch += 1;
        if let Some(task) = self.task.get_mut().take() {
            let _ = task.stop.send(());
            task.handle.abort();
        }
    }
}

async fn run_loop(
    shared: Arc<Shared>,
    period: Duration,
    epoch: u64,
    mut stop: broadcast::Receiver<()>,
) {
    let mut limiter = RateLimiter::new(period);
    let reporter = LoopTimingReporter::new(period);
    loop {
        tokio::select! {
            _ = stop.recv() => {
                debug!(epoch, "scheduling loop stop signal received");
                break;
            }
            _ = limiter.tick() => {
                reporter.record_tick();
                if !shared.step(epoch) {
                    debug!(epoch, "scheduling loop idle; exiting");
                    break;
                }
            }
        }
    }
    if let Some(summary) = reporter.histogram().summary() {
        debug!(
            epoch,
            target_us = reporter.target_interval().as_micros() as u64,
            samples = summary.samples,
            mean_us = summary.mean_us,
            std_dev_us = summary.std_dev_us,
            max_us = summary.max_us,
            "scheduling loop jitter summary"
        );
    }
}
