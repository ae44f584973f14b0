//! ---
//! ers_section: "01-core-functionality"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Simulation driver and lifecycle management."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
//! Drives a [`ers_sim::SimulationClock`] from a periodic timer and exposes
//! play, pause and reset to presentation code.

pub mod driver;
pub mod error;

pub use driver::SimulationDriver;
pub use error::{DriverError, Result};
