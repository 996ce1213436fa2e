//! Axis-level shared types: states, error flags, configuration, and
//! the telemetry snapshot.

pub mod config;
pub mod error;
pub mod state;
pub mod telemetry;
