//! ---
//! ers_section: "01-core-functionality"
//! ers_subsection: "module"
//! ers_type: "source"
//! ers_scope: "code"
//! ers_description: "Runtime helpers supporting the simulation driver."
//! ers_version: "v0.1.0"
//! ers_owner: "tbd"
//! ---
//! Real-time pacing helpers for the ERS runtime.

pub mod scheduling;

pub use scheduling::RateLimiter;
