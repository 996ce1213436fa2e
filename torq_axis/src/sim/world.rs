//! Shared state backing the simulated collaborators.
//!
//! One `SimWorld` stands in for the physical motor, shaft and wiring:
//! every simulated collaborator reads and writes it, and tests poke it
//! to stage scenarios (spin the shaft, press an endstop, inject a
//! fault) and to observe what the axis commanded.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use torq_common::sync::FloatCell;

/// Arguments of the last trapezoidal plan:
/// (goal_pos, current_pos, current_vel, vel_max, accel_max, decel_max).
pub type TrajPlan = (f32, f32, f32, f32, f32, f32);

/// In-memory stand-in for the motor, shaft, sensors and wiring.
#[derive(Debug, Default)]
pub struct SimWorld {
    // ── Shaft / encoder ─────────────────────────────────────────────
    /// Offset-applied position estimate [counts].
    pub encoder_pos: FloatCell,
    /// Velocity estimate [counts/s].
    pub encoder_vel: FloatCell,
    /// Electrical phase estimate [rad].
    pub encoder_phase: FloatCell,
    /// Raw accumulated count.
    shadow_count: AtomicI32,
    /// Last value written through `set_linear_count`.
    linear_count: AtomicI32,
    /// Set once offset calibration ran.
    pub encoder_ready: AtomicBool,
    /// Latched encoder fault, polled by `do_checks`.
    pub encoder_fault: AtomicBool,

    // ── Sensorless estimator ────────────────────────────────────────
    pub sensorless_pos: FloatCell,
    pub sensorless_vel: FloatCell,
    pub sensorless_phase: FloatCell,

    // ── Motor ───────────────────────────────────────────────────────
    pub motor_armed: AtomicBool,
    pub motor_calibrated: AtomicBool,
    /// Latched drive fault, polled by `do_checks`.
    pub motor_fault: AtomicBool,
    /// Force `MotorDrive::update` to fail.
    pub fail_motor_update: AtomicBool,
    /// Force `run_calibration` to fail.
    pub fail_motor_calibration: AtomicBool,
    motor_updates: AtomicU64,
    /// Current magnitude of the last motor update [A].
    pub last_motor_current: FloatCell,
    /// Electrical phase of the last motor update [rad].
    pub last_motor_phase: FloatCell,

    // ── Controller ──────────────────────────────────────────────────
    /// Position setpoint cell, shared with the step/dir edge handler.
    pub pos_setpoint: Arc<FloatCell>,
    pub vel_setpoint: FloatCell,
    pub vel_integrator_current: FloatCell,
    control_mode: AtomicU8,
    pub traj_start_tick: AtomicU64,
    /// Force `Controller::update` to fail.
    pub fail_controller: AtomicBool,

    // ── Trajectory planner ──────────────────────────────────────────
    traj_plans: AtomicU64,
    last_traj_plan: Mutex<TrajPlan>,

    // ── Endstops ────────────────────────────────────────────────────
    min_endstop_pressed: AtomicBool,
    max_endstop_pressed: AtomicBool,
    min_offset_from_home: AtomicI32,
    max_offset_from_home: AtomicI32,

    // ── Bookkeeping ─────────────────────────────────────────────────
    /// Blocking routine invocations, in call order.
    calls: Mutex<Vec<&'static str>>,
}

impl SimWorld {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // ── Shaft ───────────────────────────────────────────────────────

    pub fn set_shadow_count(&self, count: i32) {
        self.shadow_count.store(count, Ordering::Release);
    }

    pub fn shadow_count(&self) -> i32 {
        self.shadow_count.load(Ordering::Acquire)
    }

    pub(crate) fn set_linear_count(&self, count: i32) {
        self.linear_count.store(count, Ordering::Release);
    }

    pub fn linear_count(&self) -> i32 {
        self.linear_count.load(Ordering::Acquire)
    }

    // ── Endstops ────────────────────────────────────────────────────

    pub fn press_min_endstop(&self, pressed: bool) {
        self.min_endstop_pressed.store(pressed, Ordering::Release);
    }

    pub fn press_max_endstop(&self, pressed: bool) {
        self.max_endstop_pressed.store(pressed, Ordering::Release);
    }

    pub fn min_endstop_pressed(&self) -> bool {
        self.min_endstop_pressed.load(Ordering::Acquire)
    }

    pub fn max_endstop_pressed(&self) -> bool {
        self.max_endstop_pressed.load(Ordering::Acquire)
    }

    pub(crate) fn set_min_offset_from_home(&self, count: i32) {
        self.min_offset_from_home.store(count, Ordering::Release);
    }

    pub(crate) fn set_max_offset_from_home(&self, count: i32) {
        self.max_offset_from_home.store(count, Ordering::Release);
    }

    pub fn min_offset_from_home(&self) -> i32 {
        self.min_offset_from_home.load(Ordering::Acquire)
    }

    pub fn max_offset_from_home(&self) -> i32 {
        self.max_offset_from_home.load(Ordering::Acquire)
    }

    // ── Motor ───────────────────────────────────────────────────────

    pub fn motor_armed(&self) -> bool {
        self.motor_armed.load(Ordering::Acquire)
    }

    pub(crate) fn record_motor_update(&self, current: f32, phase: f32) {
        self.motor_updates.fetch_add(1, Ordering::AcqRel);
        self.last_motor_current.store(current);
        self.last_motor_phase.store(phase);
    }

    pub fn motor_updates(&self) -> u64 {
        self.motor_updates.load(Ordering::Acquire)
    }

    // ── Controller / trajectory ─────────────────────────────────────

    /// Stage or mirror the controller mode. Tests use this to put the
    /// simulated controller into a specific mode before a scenario.
    pub fn set_control_mode(&self, mode: u8) {
        self.control_mode.store(mode, Ordering::Release);
    }

    pub fn control_mode(&self) -> u8 {
        self.control_mode.load(Ordering::Acquire)
    }

    pub(crate) fn record_traj_plan(&self, plan: TrajPlan) {
        self.traj_plans.fetch_add(1, Ordering::AcqRel);
        *self.last_traj_plan.lock().expect("sim world mutex poisoned") = plan;
    }

    pub fn traj_plans(&self) -> u64 {
        self.traj_plans.load(Ordering::Acquire)
    }

    pub fn last_traj_plan(&self) -> TrajPlan {
        *self.last_traj_plan.lock().expect("sim world mutex poisoned")
    }

    // ── Bookkeeping ─────────────────────────────────────────────────

    pub(crate) fn record_call(&self, name: &'static str) {
        self.calls.lock().expect("sim world mutex poisoned").push(name);
    }

    /// Blocking routine invocations so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("sim world mutex poisoned").clone()
    }
}
