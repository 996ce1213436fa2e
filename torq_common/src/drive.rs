//! Collaborator contracts consumed by the axis controller.
//!
//! The axis controller owns one implementation of each of these traits
//! and passes whatever context they need into the entry points each
//! tick; collaborators never hold a reference back to their axis.
//! Hardware builds implement them over the gate driver, encoder
//! peripheral and observer; simulation builds implement them over a
//! shared in-memory world.

use std::sync::Arc;

use crate::axis::config::EndstopConfig;
use crate::axis::state::ControlMode;
use crate::sync::FloatCell;

/// Motor PWM arm state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmedState {
    /// PWM outputs disabled.
    Disarmed,
    /// PWM outputs live.
    Armed,
}

/// Gate driver, current sensing and PWM generation for one motor.
pub trait MotorDrive: Send {
    /// One-time hardware bring-up.
    fn setup(&mut self);
    /// Enable PWM output. Returns false if arming was refused.
    fn arm(&mut self) -> bool;
    /// Disable PWM output. Safety-critical and synchronous: the
    /// outputs are off when this returns.
    fn disarm(&mut self);
    fn armed_state(&self) -> ArmedState;
    fn is_calibrated(&self) -> bool;
    /// Measure phase resistance and inductance. Blocks for the
    /// duration of the routine.
    fn run_calibration(&mut self) -> bool;
    /// Commit one current command at the given electrical phase.
    /// Returns false on a drive fault.
    fn update(&mut self, current_setpoint: f32, phase: f32) -> bool;
    /// Per-tick fault polling. Returns false if a fault is latched.
    fn do_checks(&mut self) -> bool;
}

/// Position encoder for one motor shaft.
pub trait Encoder: Send {
    fn setup(&mut self);
    /// Per-tick estimate update. Returns false on a decoding fault.
    fn update(&mut self) -> bool;
    /// Per-tick fault polling. Returns false if a fault is latched.
    fn do_checks(&mut self) -> bool;
    /// Rotate until the index pulse is seen. Blocks.
    fn run_index_search(&mut self) -> bool;
    /// Measure the encoder-to-phase offset. Blocks.
    fn run_offset_calibration(&mut self) -> bool;
    /// Overwrite the offset-applied signed count.
    fn set_linear_count(&mut self, count: i32);
    /// Offset-applied position estimate [counts].
    fn pos_estimate(&self) -> f32;
    /// Velocity estimate [counts/s].
    fn vel_estimate(&self) -> f32;
    /// Electrical phase estimate [rad].
    fn phase(&self) -> f32;
    /// Raw accumulated count before offset/wrap.
    fn shadow_count(&self) -> i32;
    /// True once offset calibration has produced a usable mapping.
    fn is_ready(&self) -> bool;
    /// Counts per mechanical revolution.
    fn cpr(&self) -> u32;
    /// Whether an index pulse is configured.
    fn use_index(&self) -> bool;
}

/// Back-EMF flux/phase observer for sensorless operation.
pub trait SensorlessEstimator: Send {
    /// Per-tick observer update. Returns false on divergence.
    fn update(&mut self) -> bool;
    /// PLL position estimate [rad].
    fn pll_pos(&self) -> f32;
    /// Velocity estimate [rad/s].
    fn vel_estimate(&self) -> f32;
    /// Electrical phase estimate [rad].
    fn phase(&self) -> f32;
}

/// Position/velocity/current controller for one axis.
pub trait Controller: Send {
    /// Run one control update from the given estimates. Returns the
    /// commanded current, or `None` on failure (e.g. setpoint out of
    /// range).
    fn update(&mut self, pos_estimate: f32, vel_estimate: f32) -> Option<f32>;
    /// Prepare the homing approach (velocity mode towards the min
    /// endstop). Returns false if the controller cannot home.
    fn home_axis(&mut self) -> bool;
    /// Zero all setpoints and integrators.
    fn reset(&mut self);
    fn set_pos_setpoint(&mut self, pos: f32, vel_feed_forward: f32, current_feed_forward: f32);
    fn set_vel_setpoint(&mut self, vel: f32, current_feed_forward: f32);
    fn set_vel_integrator_current(&mut self, value: f32);
    /// Handle to the position setpoint cell. Shared with the step/dir
    /// edge handler, which increments it from interrupt context.
    fn pos_setpoint(&self) -> Arc<FloatCell>;
    fn control_mode(&self) -> ControlMode;
    fn set_control_mode(&mut self, mode: ControlMode);
    /// Cruise velocity used for homing moves [counts/s].
    fn homing_speed(&self) -> f32;
    /// Record the tick at which the active trajectory started.
    fn set_traj_start_tick(&mut self, tick: u64);
    /// Allocate the anti-cogging map for `cpr` counts. Returns false
    /// if the allocation failed; the feature is then skipped.
    fn init_cogging_map(&mut self, cpr: u32) -> bool;
}

/// Trapezoidal trajectory generator.
pub trait TrajectoryPlanner: Send {
    /// Plan a move from the current state to `goal_pos`.
    #[allow(clippy::too_many_arguments)]
    fn plan_trapezoidal(
        &mut self,
        goal_pos: f32,
        current_pos: f32,
        current_vel: f32,
        vel_max: f32,
        accel_max: f32,
        decel_max: f32,
    );
}

/// One debounced mechanical endstop.
pub trait Endstop: Send {
    /// Per-tick debounce update. May consume loop-counter state set
    /// earlier in the same tick.
    fn update(&mut self, loop_counter: u64);
    /// Debounced switch state.
    fn is_pressed(&self) -> bool;
    fn config(&self) -> &EndstopConfig;
    /// Raw count captured or assigned at the homed position.
    fn offset_from_home(&self) -> i32;
    fn set_offset_from_home(&mut self, count: i32);
}

// ─── GPIO Subscription Service ──────────────────────────────────────

/// Pull resistor selection for a subscribed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinPull {
    None,
    Up,
    Down,
}

/// Edge selection for a subscribed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinEdge {
    Rising,
    Falling,
}

/// Callback invoked from interrupt context on a subscribed edge.
pub type EdgeCallback = Box<dyn Fn() + Send + Sync>;

/// Board GPIO interrupt subscription service.
pub trait GpioIntc: Send + Sync {
    /// Configure a plain input without edge detection.
    fn configure_input(&self, pin: u16, pull: PinPull);
    /// Register `callback` for edges on `pin`. Returns false if the
    /// pin already has a subscriber.
    fn subscribe(&self, pin: u16, pull: PinPull, edge: PinEdge, callback: EdgeCallback) -> bool;
    /// Remove any subscriber from `pin`.
    fn unsubscribe(&self, pin: u16);
    /// Sample the current pin level.
    fn read(&self, pin: u16) -> bool;
}
