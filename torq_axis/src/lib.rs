//! # TORQ Axis Controller
//!
//! Per-axis real-time state machine for the TORQ brushless motor
//! drive. One [`axis::Axis`] owns the collaborators for one motor
//! (drive, encoder, sensorless estimator, controller, trajectory
//! planner, two endstops) and sequences them from power-on through
//! calibration, optional homing, and into closed-loop or sensorless
//! control, falling back to idle on any fault.
//!
//! ## Architecture
//!
//! - **Control loop driver** — the worker blocks on the
//!   current-measurement signal and runs estimator updates, safety
//!   checks and the active tick body once per sample.
//! - **Task chain** — external state requests expand into a bounded
//!   ordered chain of states; any handler failure falls to idle
//!   without advancing.
//! - **Homing sub-machine** — endstop seek phases plus a move-to-zero
//!   trajectory, hosted by the closed-loop tick body.
//! - **Shared surface** — everything visible outside the worker is a
//!   single-word atomic on [`shared::AxisShared`]; commands arrive
//!   solely as writes to the requested state.

pub mod axis;
pub mod chain;
pub mod config;
pub mod homing;
pub mod rt;
pub mod safety;
pub mod shared;
pub mod signal;
pub mod sim;
pub mod spin_up;
pub mod stats;
pub mod step_dir;
