//! ---
//! ers_section: "01-core-functionality"
//! ers_subsection: "binary"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Snapshot row rendering for the ersd stdout stream."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use std::io::Write;

use anyhow::{anyhow, Context, Result};
use ers_common::config::OutputFormat;
use ers_sim::{SimulationSnapshot, StatusLevel, DT};
use serde::Serialize;

/// One flattened line of the snapshot stream.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotRow {
    pub time: f64,
    pub clock: String,
    pub phase: &'static str,
    pub true_pressure_bar: f64,
    pub true_temperature_c: f64,
    pub true_consumption_lpm: f64,
    pub engine_pressure_bar: f64,
    pub engine_temperature_c: f64,
    pub bridge_pressure_bar: f64,
    pub bridge_temperature_c: f64,
    pub bridge_consumption_lpm: f64,
    pub engine_pressure_status: StatusLevel,
    pub bridge_pressure_status: StatusLevel,
    pub engine_temperature_status: StatusLevel,
    pub bridge_temperature_status: StatusLevel,
    pub engine_alarm: bool,
    pub bridge_alarm: bool,
}

impl From<&SimulationSnapshot> for SnapshotRow {
    fn from(snapshot: &SimulationSnapshot) -> Self {
        Self {
            time: snapshot.time,
            clock: snapshot.clock_label(),
            phase: snapshot.phase().label(),
            true_pressure_bar: snapshot.true_values.pressure_bar,
            true_temperature_c: snapshot.true_values.temperature_c,
            true_consumption_lpm: snapshot.true_values.consumption_lpm,
            engine_pressure_bar: snapshot.engine_values.pressure_bar,
            engine_temperature_c: snapshot.engine_values.temperature_c,
            bridge_pressure_bar: snapshot.bridge_values.pressure_bar,
            bridge_temperature_c: snapshot.bridge_values.temperature_c,
            bridge_consumption_lpm: snapshot.bridge_values.consumption_lpm,
            engine_pressure_status: snapshot.engine_values.pressure_status(),
            bridge_pressure_status: snapshot.bridge_values.pressure_status(),
            engine_temperature_status: snapshot.engine_values.temperature_status(),
            bridge_temperature_status: snapshot.bridge_values.temperature_status(),
            engine_alarm: snapshot.engine_alarm,
            bridge_alarm: snapshot.bridge_alarm,
        }
    }
}

enum Encoder<W: Write> {
    Json(W),
    Csv(csv::Writer<W>),
    Discard(W),
}

/// Writes every `every`-th step of the session plus the last snapshot seen.
///
/// Decimation is keyed on the step index derived from `time`, so snapshots
/// coalesced by the driver's watch channel do not shift the emitted grid.
pub struct SnapshotSink<W: Write> {
    encoder: Encoder<W>,
    every: u64,
    last_emitted: Option<u64>,
    emitted: u64,
}

impl<W: Write> SnapshotSink<W> {
    pub fn new(format: OutputFormat, every: u32, writer: W) -> Self {
        let encoder = match format {
            OutputFormat::Json => Encoder::Json(writer),
            OutputFormat::Csv => Encoder::Csv(csv::Writer::from_writer(writer)),
            OutputFormat::None => Encoder::Discard(writer),
        };
        Self {
            encoder,
            every: u64::from(every.max(1)),
            last_emitted: None,
            emitted: 0,
        }
    }

    /// Emit `snapshot` if its step falls on the decimation grid.
    pub fn offer(&mut self, snapshot: &SimulationSnapshot) -> Result<bool> {
        let step = step_of(snapshot);
        if step % self.every != 0 || self.last_emitted == Some(step) {
            return Ok(false);
        }
        self.emit(step, snapshot)?;
        Ok(true)
    }

    /// Emit the closing snapshot unless it already went out.
    pub fn finish(&mut self, snapshot: &SimulationSnapshot) -> Result<()> {
        let step = step_of(snapshot);
        if self.last_emitted != Some(step) {
            self.emit(step, snapshot)?;
        }
        Ok(())
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn into_inner(self) -> Result<W> {
        match self.encoder {
            Encoder::Json(writer) | Encoder::Discard(writer) => Ok(writer),
            Encoder::Csv(writer) => writer
                .into_inner()
                .map_err(|err| anyhow!("failed to flush csv output: {}", err.error())),
        }
    }

    fn emit(&mut self, step: u64, snapshot: &SimulationSnapshot) -> Result<()> {
        let row = SnapshotRow::from(snapshot);
        match &mut self.encoder {
            Encoder::Json(writer) => {
                serde_json::to_writer(&mut *writer, &row)
                    .context("failed to encode snapshot as json")?;
                writer.write_all(b"\n")?;
                writer.flush()?;
            }
            Encoder::Csv(writer) => {
                writer
                    .serialize(&row)
                    .context("failed to encode snapshot as csv")?;
                writer.flush()?;
            }
            Encoder::Discard(_) => {}
        }
        self.last_emitted = Some(step);
        self.emitted += 1;
        Ok(())
    }
}

fn step_of(snapshot: &SimulationSnapshot) -> u64 {
    (snapshot.time / DT).round().max(0.0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ers_sim::SimulationClock;

    fn session(ticks: usize) -> Vec<SimulationSnapshot> {
        let mut clock = SimulationClock::new();
        clock.play();
        let mut out = vec![clock.snapshot()];
        for _ in 0..ticks {
            clock.tick();
            out.push(clock.snapshot());
        }
        out
    }

    #[test]
    fn json_lines_carry_flattened_fields() {
        let mut sink = SnapshotSink::new(OutputFormat::Json, 1, Vec::new());
        for snapshot in session(3) {
            sink.offer(&snapshot).unwrap();
        }
        let bytes = sink.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["time"], 0.0);
        assert_eq!(first["phase"], "Normal");
        assert_eq!(first["clock"], "00:00");
        assert_eq!(first["bridge_alarm"], false);
        assert_eq!(first["bridge_pressure_status"], "safe");
        assert_eq!(first["engine_temperature_status"], "safe");
    }

    #[test]
    fn csv_has_header_and_decimated_rows() {
        let mut sink = SnapshotSink::new(OutputFormat::Csv, 10, Vec::new());
        for snapshot in session(25) {
            sink.offer(&snapshot).unwrap();
        }
        assert_eq!(sink.emitted(), 3);
        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("time,clock,phase,true_pressure_bar"));
        assert_eq!(lines.count(), 3);
    }

    #[test]
    fn finish_emits_the_last_snapshot_once() {
        let snapshots = session(7);
        let mut sink = SnapshotSink::new(OutputFormat::Json, 5, Vec::new());
        for snapshot in &snapshots {
            sink.offer(snapshot).unwrap();
        }
        let last = snapshots.last().unwrap();
        sink.finish(last).unwrap();
        sink.finish(last).unwrap();
        assert_eq!(sink.emitted(), 3);
    }

    #[test]
    fn repeated_snapshot_is_not_duplicated() {
        let initial = SimulationSnapshot::initial();
        let mut sink = SnapshotSink::new(OutputFormat::Json, 1, Vec::new());
        assert!(sink.offer(&initial).unwrap());
        assert!(!sink.offer(&initial).unwrap());
    }

    #[test]
    fn none_format_writes_nothing() {
        let mut sink = SnapshotSink::new(OutputFormat::None, 1, Vec::new());
        for snapshot in session(5) {
            sink.offer(&snapshot).unwrap();
        }
        assert!(sink.into_inner().unwrap().is_empty());
    }
}
