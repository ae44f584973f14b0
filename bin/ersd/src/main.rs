//! ---
//! ers_section: "01-core-functionality"
//! ers_subsection: "binary"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Binary entrypoint for the ersd headless session runner."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use std::future::Future;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use ers_common::config::{AppConfig, OutputFormat};
use ers_common::logging::init_tracing;
use ers_core::SimulationDriver;
use ers_sim::constants::ALARM_MESSAGE;
use ers_sim::{AlarmOnsets, SimulationClock, SimulationSnapshot, TickOutcome};
use tokio::signal;
use tracing::{info, warn};

mod output;

use output::SnapshotSink;

const DEFAULT_CONFIG: &str = "configs/ersd.toml";

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "Play an engine-room telemetry spoofing session and stream snapshots to stdout",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    /// Wall-clock multiplier applied to the tick rate
    #[arg(long)]
    speedup: Option<f64>,

    /// Snapshot output format on stdout
    #[arg(long, value_enum)]
    format: Option<CliFormat>,

    /// Emit every Nth step
    #[arg(long)]
    every: Option<u32>,

    /// Run the session synchronously without a timer
    #[arg(long)]
    instant: bool,

    /// Pause once simulated time reaches this many seconds
    #[arg(long, value_name = "SECONDS")]
    until: Option<f64>,

    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print version information and exit"
    )]
    version: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Json,
    Csv,
    None,
}

impl From<CliFormat> for OutputFormat {
    fn from(value: CliFormat) -> Self {
        match value {
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Csv => OutputFormat::Csv,
            CliFormat::None => OutputFormat::None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("ersd {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(anyhow!("config file {} not found", path.display()));
        }
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from(DEFAULT_CONFIG));

    let loaded = AppConfig::load_or_default(&candidates)?;
    let mut config = loaded.config;
    apply_overrides(&cli, &mut config)?;
    init_tracing("ersd", &config.logging)?;
    info!(
        source = ?loaded.source,
        speedup = config.driver.speedup,
        format = ?config.output.format,
        every = config.output.every,
        "configuration loaded"
    );

    if cli.instant {
        run_instant(&config, cli.until)
    } else {
        run_realtime(&config, cli.until).await
    }
}

fn apply_overrides(cli: &Cli, config: &mut AppConfig) -> Result<()> {
    if let Some(speedup) = cli.speedup {
        config.driver.speedup = speedup;
    }
    if let Some(format) = cli.format {
        config.output.format = format.into();
    }
    if let Some(every) = cli.every {
        config.output.every = every;
    }
    if let Some(until) = cli.until {
        if !until.is_finite() || until < 0.0 {
            return Err(anyhow!("--until must be a non-negative number of seconds"));
        }
    }
    config.validate().context("invalid command line overrides")
}

fn reached(until: Option<f64>, time: f64) -> bool {
    until.is_some_and(|limit| time >= limit - 1e-9)
}

fn run_instant(config: &AppConfig, until: Option<f64>) -> Result<()> {
    let mut clock = SimulationClock::new();
    let mut sink = SnapshotSink::new(config.output.format, config.output.every, io::stdout());
    sink.offer(&clock.snapshot())?;
    if !reached(until, clock.snapshot().time) {
        clock.play();
    }
    while let TickOutcome::Advanced { .. } = clock.tick() {
        let snapshot = clock.snapshot();
        sink.offer(&snapshot)?;
        if reached(until, snapshot.time) {
            clock.pause();
        }
    }
    let last = clock.snapshot();
    sink.finish(&last)?;
    let rows = sink.emitted();
    sink.into_inner()?;
    log_summary(&last, clock.alarm_onsets(), rows);
    Ok(())
}

async fn run_realtime(config: &AppConfig, until: Option<f64>) -> Result<()> {
    let driver = SimulationDriver::new(&config.driver)?;
    let mut sink = SnapshotSink::new(config.output.format, config.output.every, io::stdout());

    if !config.driver.autoplay {
        sink.offer(&driver.snapshot())?;
        info!("autoplay disabled; waiting for termination signal");
        signal::ctrl_c().await?;
        return Ok(());
    }

    let interrupted = stream_session(&driver, &mut sink, until, signal::ctrl_c()).await?;
    let rows = sink.emitted();
    sink.into_inner()?;
    log_summary(&driver.snapshot(), driver.alarm_onsets(), rows);

    if interrupted {
        info!("resetting session");
        driver.reset().await?;
    } else {
        driver.shutdown().await?;
    }
    Ok(())
}

/// Play `driver` and copy its snapshots into `sink` until the session ends,
/// `until` is reached or `interrupt` resolves. Returns whether it was
/// interrupted.
async fn stream_session<W, F>(
    driver: &SimulationDriver,
    sink: &mut SnapshotSink<W>,
    until: Option<f64>,
    interrupt: F,
) -> Result<bool>
where
    W: Write,
    F: Future<Output = io::Result<()>>,
{
    let mut snapshots = driver.subscribe();
    let initial = *snapshots.borrow_and_update();
    sink.offer(&initial)?;
    if !reached(until, initial.time) {
        driver.play();
    }

    tokio::pin!(interrupt);
    let mut interrupted = false;
    while driver.is_running() {
        tokio::select! {
            result = &mut interrupt => {
                result?;
                info!("ctrl-c received");
                interrupted = true;
                break;
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    warn!("snapshot channel closed");
                    break;
                }
                let snapshot = *snapshots.borrow_and_update();
                sink.offer(&snapshot)?;
                if reached(until, snapshot.time) {
                    driver.pause();
                    info!(time = snapshot.time, "requested stop time reached");
                }
            }
        }
    }
    sink.finish(&driver.snapshot())?;
    Ok(interrupted)
}

fn log_summary(last: &SimulationSnapshot, onsets: AlarmOnsets, rows: u64) {
    info!(
        time = last.time,
        rows,
        clock = %last.clock_label(),
        phase = last.phase().label(),
        engine_onset = ?onsets.engine,
        bridge_onset = ?onsets.bridge,
        bridge_lag = ?onsets.bridge_lag(),
        "session summary"
    );
    if let Some(lag) = onsets.bridge_lag() {
        warn!(lag_secs = lag, message = ALARM_MESSAGE, "bridge alarm trailed the engine room");
    } else if onsets.engine.is_some() {
        warn!(message = ALARM_MESSAGE, "engine room alarm never reached the bridge");
    }
}
