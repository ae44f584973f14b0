//! ---
//! ers_section: "01-core-functionality"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Shared primitives and utilities for the simulator runtime."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
//! Shared primitives for the ERS workspace.
//! This crate exposes configuration loading, tracing initialisation and
//! loop timing metrics consumed by the driver and the CLI.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod time;

pub use config::{AppConfig, DriverConfig, LoadedAppConfig, LoggingConfig, OutputConfig, OutputFormat};
pub use logging::{init_tracing, LogFormat};
pub use metrics::{JitterHistogram, JitterSummary, LoopTimingReporter};
