//! ---
//! ers_section: "01-core-functionality"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Simulation driver and lifecycle management."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DriverError>;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("simulation driver must be created inside a tokio runtime")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
    #[error("invalid driver configuration: {0}")]
    InvalidConfig(String),
    #[error("scheduling loop panicked: {0}")]
    TaskPanicked(String),
    #[error("scheduling loop did not stop within {0:?}; task aborted")]
    StopTimedOut(Duration),
}
