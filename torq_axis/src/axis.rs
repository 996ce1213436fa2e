//! Axis controller core.
//!
//! One `Axis` owns the collaborators for one motor and sequences them
//! from power-on through calibration, homing and control. The worker
//! thread runs `run_state_machine_loop` forever: it expands pending
//! state requests into a task chain, validates prerequisites,
//! dispatches handlers, and falls back to idle whenever a handler
//! fails. Control handlers run their tick bodies through
//! `run_control_loop`, synchronized to the current-measurement signal.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use torq_common::axis::config::{AxisConfig, AxisHardwareConfig, BoardConfig};
use torq_common::axis::error::AxisError;
use torq_common::axis::state::{AxisState, ControlMode, HomingState};
use torq_common::board::BoardContext;
use torq_common::consts::ADC_FULL_SCALE;
use torq_common::drive::{
    Controller, Encoder, Endstop, GpioIntc, MotorDrive, SensorlessEstimator, TrajectoryPlanner,
};

use crate::chain::TaskChain;
use crate::homing::{Homing, HomingIo};
use crate::rt;
use crate::safety::{endstop_guard, evaluate_axis_checks, SafetyCheckInput};
use crate::shared::AxisShared;
use crate::spin_up::{CurrentSpiral, PhaseAccel};
use crate::stats::TickStats;
use crate::step_dir::StepDirInput;

// ─── Construction ───────────────────────────────────────────────────

/// Everything an axis needs at construction time.
pub struct AxisParts {
    /// Axis index on the board, used for thread naming and logs.
    pub id: u8,
    pub config: AxisConfig,
    pub hw: AxisHardwareConfig,
    pub board_config: BoardConfig,
    pub board: Arc<BoardContext>,
    pub gpio: Arc<dyn GpioIntc>,
    pub motor: Box<dyn MotorDrive>,
    pub encoder: Box<dyn Encoder>,
    pub estimator: Box<dyn SensorlessEstimator>,
    pub controller: Box<dyn Controller>,
    pub trajectory: Box<dyn TrajectoryPlanner>,
    pub min_endstop: Box<dyn Endstop>,
    pub max_endstop: Box<dyn Endstop>,
}

/// Per-axis controller. Owned and driven by its worker thread; the
/// rest of the system talks to it through [`AxisShared`].
pub struct Axis {
    id: u8,
    config: AxisConfig,
    hw: AxisHardwareConfig,
    board_config: BoardConfig,
    board: Arc<BoardContext>,
    shared: Arc<AxisShared>,

    motor: Box<dyn MotorDrive>,
    encoder: Box<dyn Encoder>,
    estimator: Box<dyn SensorlessEstimator>,
    controller: Box<dyn Controller>,
    trajectory: Box<dyn TrajectoryPlanner>,
    min_endstop: Box<dyn Endstop>,
    max_endstop: Box<dyn Endstop>,

    step_dir: StepDirInput,
    homing: Homing,
    task_chain: TaskChain,
    stats: TickStats,
    loop_counter: u64,
}

impl Axis {
    pub fn new(parts: AxisParts) -> Self {
        let shared = AxisShared::new();
        let step_dir = StepDirInput::new(
            Arc::clone(&parts.gpio),
            parts.hw.step_pin,
            parts.hw.dir_pin,
            parts.config.counts_per_step,
            parts.controller.pos_setpoint(),
        );
        let homing = Homing::begin(0, parts.min_endstop.config().min_ms_homing);
        Self {
            id: parts.id,
            config: parts.config,
            hw: parts.hw,
            board_config: parts.board_config,
            board: parts.board,
            shared,
            motor: parts.motor,
            encoder: parts.encoder,
            estimator: parts.estimator,
            controller: parts.controller,
            trajectory: parts.trajectory,
            min_endstop: parts.min_endstop,
            max_endstop: parts.max_endstop,
            step_dir,
            homing,
            task_chain: TaskChain::new(),
            stats: TickStats::new(),
            loop_counter: 0,
        }
    }

    /// Handle for the property layer and the current-sense interrupt.
    pub fn shared(&self) -> Arc<AxisShared> {
        Arc::clone(&self.shared)
    }

    pub fn stats(&self) -> TickStats {
        self.stats
    }

    /// Bring up the axis hardware (encoder, then gate driver).
    pub fn setup(&mut self) {
        self.encoder.setup();
        self.motor.setup();
    }

    /// Motor temperature from the thermistor channel, via the
    /// configured conversion polynomial.
    pub fn get_temp(&self) -> f32 {
        let adc = self.board.adc(self.hw.thermistor_adc_ch);
        let normalized_voltage = adc / ADC_FULL_SCALE;
        horner(normalized_voltage, &self.hw.thermistor_poly_coeffs)
    }

    // ─── Per-Tick Updates & Checks ──────────────────────────────────

    #[inline]
    fn check_for_errors(&self) -> bool {
        self.shared.error().is_empty()
    }

    /// Update all estimators, then both endstops. The endstops come
    /// last so their debouncing can consume loop-counter state set
    /// earlier in the tick.
    fn do_updates(&mut self) -> bool {
        if !self.encoder.update() {
            self.shared.raise_error(AxisError::ENCODER_FAILED);
        }
        if !self.estimator.update() {
            self.shared.raise_error(AxisError::ESTIMATOR_FAILED);
        }
        self.min_endstop.update(self.loop_counter);
        self.max_endstop.update(self.loop_counter);
        self.check_for_errors()
    }

    /// Axis-level safety checks plus subcomponent fault polls.
    fn do_checks(&mut self) -> bool {
        let input = SafetyCheckInput {
            state: self.shared.current_state(),
            motor_armed: self.motor.armed_state(),
            vbus_voltage: self.board.vbus_voltage.load(),
            brake_resistor_armed: self.board.brake_resistor_armed(),
            undervoltage_trip_level: self.board_config.dc_bus_undervoltage_trip_level,
            overvoltage_trip_level: self.board_config.dc_bus_overvoltage_trip_level,
        };
        let error = evaluate_axis_checks(&input);
        if !error.is_empty() {
            self.shared.raise_error(error);
        }
        if !self.motor.do_checks() {
            self.shared.raise_error(AxisError::MOTOR_FAILED);
        }
        if !self.encoder.do_checks() {
            self.shared.raise_error(AxisError::ENCODER_FAILED);
        }
        self.check_for_errors()
    }

    // ─── Control Loop Driver ────────────────────────────────────────

    /// Drive `body` once per current-measurement signal.
    ///
    /// Tick order: wait, count, updates, checks, body. Returns when
    /// the body returns false, an error accumulated, a state request
    /// is pending, or shutdown was flagged. A missed wait outside
    /// idle is fatal; inside idle it just re-waits, which is what
    /// makes idle survive a stopped current loop.
    fn run_control_loop(&mut self, mut body: impl FnMut(&mut Self) -> bool) {
        loop {
            if self.shared.requested_state() != AxisState::Undefined
                || self.shared.shutdown_requested()
            {
                return;
            }
            if !self.shared.wait_current_meas() {
                self.stats.record_miss();
                if self.shared.current_state() == AxisState::Idle {
                    continue;
                }
                self.shared.raise_error(AxisError::CONTROL_LOOP_MISSED);
                return;
            }
            self.loop_counter += 1;
            self.shared.store_loop_counter(self.loop_counter);
            self.stats.record_tick();

            if !self.do_updates() {
                return;
            }
            if !self.do_checks() {
                return;
            }
            if !body(self) {
                return;
            }
        }
    }

    // ─── Control Handlers ───────────────────────────────────────────

    /// Open-loop spin-up: current spiral, then phase acceleration.
    /// Leaves the velocity setpoint at the hand-off velocity so the
    /// closed sensorless loop starts smoothly.
    fn run_sensorless_spin_up(&mut self) -> bool {
        let mut spiral = CurrentSpiral::new(&self.config);
        self.run_control_loop(move |axis| {
            let step = spiral.step();
            if !axis.motor.update(step.current, step.phase) {
                axis.shared.raise_error(AxisError::MOTOR_FAILED);
                return false;
            }
            !step.done
        });
        if !self.check_for_errors() {
            return false;
        }

        let mut accel = PhaseAccel::new(&self.config);
        self.run_control_loop(move |axis| {
            let step = accel.step();
            if !axis.motor.update(step.current, step.phase) {
                axis.shared.raise_error(AxisError::MOTOR_FAILED);
                return false;
            }
            !step.done
        });

        self.controller
            .set_vel_setpoint(self.config.spin_up_target_vel, 0.0);
        self.check_for_errors()
    }

    /// Closed sensorless loop: estimator feeds the controller, the
    /// controller feeds the motor. Position-class control modes are
    /// rejected since there is no position reference.
    fn run_sensorless_control_loop(&mut self) -> bool {
        self.step_dir.set_enabled(self.config.enable_step_dir);
        self.run_control_loop(|axis| {
            if axis.controller.control_mode() >= ControlMode::PositionControl {
                axis.shared
                    .raise_error(AxisError::POS_CTRL_DURING_SENSORLESS);
                return false;
            }
            let current_setpoint = match axis
                .controller
                .update(axis.estimator.pll_pos(), axis.estimator.vel_estimate())
            {
                Some(current) => current,
                None => {
                    axis.shared.raise_error(AxisError::CONTROLLER_FAILED);
                    return false;
                }
            };
            if !axis.motor.update(current_setpoint, axis.estimator.phase()) {
                axis.shared.raise_error(AxisError::MOTOR_FAILED);
                return false;
            }
            true
        });
        self.step_dir.set_enabled(false);
        self.check_for_errors()
    }

    /// Encoder-based closed loop. Hosts the homing sub-machine when a
    /// homing run is active; otherwise guards against endstop presses.
    fn run_closed_loop_control_loop(&mut self) -> bool {
        self.step_dir.set_enabled(self.config.enable_step_dir);
        self.homing = Homing::begin(self.loop_counter, self.min_endstop.config().min_ms_homing);
        self.run_control_loop(|axis| {
            let current_setpoint = match axis
                .controller
                .update(axis.encoder.pos_estimate(), axis.encoder.vel_estimate())
            {
                Some(current) => current,
                None => {
                    axis.shared.raise_error(AxisError::CONTROLLER_FAILED);
                    return false;
                }
            };
            if !axis.motor.update(current_setpoint, axis.encoder.phase()) {
                axis.shared.raise_error(AxisError::MOTOR_FAILED);
                return false;
            }

            let homing_state = axis.shared.homing_state();
            if homing_state != HomingState::Inactive {
                let loop_counter = axis.loop_counter;
                let Axis {
                    encoder,
                    controller,
                    trajectory,
                    min_endstop,
                    max_endstop,
                    homing,
                    shared,
                    ..
                } = axis;
                let mut io = HomingIo {
                    encoder: encoder.as_mut(),
                    controller: controller.as_mut(),
                    trajectory: trajectory.as_mut(),
                    min_endstop: min_endstop.as_mut(),
                    max_endstop: max_endstop.as_mut(),
                    loop_counter,
                };
                let next = homing.tick(homing_state, &mut io);
                if next != homing_state {
                    debug!(?next, "homing transition");
                    shared.set_homing_state(next);
                }
            } else {
                let guard =
                    endstop_guard(axis.min_endstop.as_ref(), axis.max_endstop.as_ref());
                if !guard.is_empty() {
                    axis.shared.raise_error(guard);
                    return false;
                }
            }
            true
        });
        self.step_dir.set_enabled(false);
        self.check_for_errors()
    }

    /// Idle: PWM off, wait for a request. Missed measurement signals
    /// are tolerated here and only here.
    fn run_idle_loop(&mut self) -> bool {
        self.motor.disarm();
        self.run_control_loop(|_| true);
        if self.shared.shutdown_requested() {
            return false;
        }
        // Done idling: try to arm for whatever comes next.
        self.motor.arm()
    }

    // ─── State Machine ──────────────────────────────────────────────

    /// Worker entry point. Never returns during normal operation;
    /// the shutdown flag is the teardown hook.
    pub fn run_state_machine_loop(&mut self) {
        if let Err(e) = rt::configure_worker_thread(self.hw.thread_priority) {
            warn!(axis = self.id, error = %e, "real-time setup failed, continuing unscheduled");
        }

        // The anti-cogging map is the one startup allocation; a
        // failure just disables the feature.
        let cpr = self.encoder.cpr();
        if !self.controller.init_cogging_map(cpr) {
            warn!(axis = self.id, cpr, "cogging map allocation failed, feature disabled");
        }

        self.shared.set_thread_valid(true);
        info!(axis = self.id, "axis state machine started");

        self.motor.arm();

        loop {
            if self.shared.shutdown_requested() {
                break;
            }

            // Load the task chain if a request is pending.
            let requested = self.shared.requested_state();
            if requested != AxisState::Undefined {
                expand_request(
                    requested,
                    &self.config,
                    self.encoder.use_index(),
                    &mut self.task_chain,
                );
                self.shared.clear_request();
                self.shared.clear_error_bits(AxisError::INVALID_STATE);
                debug!(axis = self.id, ?requested, "task chain loaded");
            }

            // Validate prerequisites before dispatch.
            let mut state = self.task_chain.current();
            if state.requires_calibrated_motor() && !self.motor.is_calibrated() {
                self.task_chain.set_current(AxisState::Undefined);
                state = AxisState::Undefined;
            }
            if state.requires_ready_encoder() && !self.encoder.is_ready() {
                self.task_chain.set_current(AxisState::Undefined);
                state = AxisState::Undefined;
            }
            self.shared.publish_current_state(state);

            // Handlers exit early when a new request is pending.
            let status = match state {
                AxisState::MotorCalibration => self.motor.run_calibration(),
                AxisState::EncoderIndexSearch => self.encoder.run_index_search(),
                AxisState::EncoderOffsetCalibration => self.encoder.run_offset_calibration(),
                AxisState::Homing => {
                    let status = self.controller.home_axis();
                    if status {
                        self.shared.set_homing_state(HomingState::Homing);
                    }
                    status
                }
                AxisState::SensorlessControl => {
                    let mut status = self.run_sensorless_spin_up();
                    if status {
                        status = self.run_sensorless_control_loop();
                    }
                    status
                }
                AxisState::ClosedLoopControl => self.run_closed_loop_control_loop(),
                AxisState::Idle => self.run_idle_loop(),
                _ => {
                    self.shared.raise_error(AxisError::INVALID_STATE);
                    false
                }
            };

            // Failure falls to idle without advancing; success
            // consumes exactly one chain entry.
            if !status {
                self.task_chain.set_current(AxisState::Idle);
            } else {
                self.task_chain.advance();
            }
        }

        self.shared.set_thread_valid(false);
        info!(
            axis = self.id,
            ticks = self.stats.ticks,
            missed = self.stats.missed_waits,
            "axis state machine stopped"
        );
    }
}

/// Evaluate the thermistor polynomial, highest-degree coefficient
/// first.
fn horner(x: f32, coeffs: &[f32]) -> f32 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}

// ─── Request Expansion ──────────────────────────────────────────────

/// Expand a requested state into the task chain.
///
/// Composite requests unroll into their ordered phases; any other
/// concrete state becomes itself followed by idle. The chain always
/// ends implicitly in `Undefined`.
pub(crate) fn expand_request(
    request: AxisState,
    config: &AxisConfig,
    encoder_use_index: bool,
    chain: &mut TaskChain,
) {
    chain.clear();
    match request {
        AxisState::StartupSequence => {
            if config.startup_motor_calibration {
                chain.push(AxisState::MotorCalibration);
            }
            if config.startup_encoder_index_search && encoder_use_index {
                chain.push(AxisState::EncoderIndexSearch);
            }
            if config.startup_encoder_offset_calibration {
                chain.push(AxisState::EncoderOffsetCalibration);
            }
            if config.startup_closed_loop_control {
                if config.startup_homing {
                    chain.push(AxisState::Homing);
                }
                chain.push(AxisState::ClosedLoopControl);
            } else if config.startup_sensorless_control {
                chain.push(AxisState::SensorlessControl);
            }
            chain.push(AxisState::Idle);
        }
        AxisState::Homing => {
            chain.push(AxisState::Homing);
            chain.push(AxisState::ClosedLoopControl);
            chain.push(AxisState::Idle);
        }
        AxisState::FullCalibrationSequence => {
            chain.push(AxisState::MotorCalibration);
            if encoder_use_index {
                chain.push(AxisState::EncoderIndexSearch);
            }
            chain.push(AxisState::EncoderOffsetCalibration);
            chain.push(AxisState::Idle);
        }
        AxisState::Undefined => {}
        other => {
            chain.push(other);
            chain.push(AxisState::Idle);
        }
    }
}

// ─── Worker Thread ──────────────────────────────────────────────────

/// Running axis worker. Dropping the handle shuts the worker down.
pub struct AxisHandle {
    shared: Arc<AxisShared>,
    join: Option<JoinHandle<Axis>>,
}

impl AxisHandle {
    pub fn shared(&self) -> &Arc<AxisShared> {
        &self.shared
    }

    pub fn request_state(&self, state: AxisState) {
        self.shared.request_state(state);
    }

    /// Stop the worker and get the axis back.
    pub fn shutdown(mut self) -> Axis {
        self.shared.request_shutdown();
        self.shared.wake_worker();
        self.join
            .take()
            .expect("axis worker already joined")
            .join()
            .expect("axis worker panicked")
    }
}

impl Drop for AxisHandle {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            self.shared.request_shutdown();
            self.shared.wake_worker();
            let _ = join.join();
        }
    }
}

/// Start the worker thread for `axis`.
pub fn start_axis_thread(axis: Axis) -> AxisHandle {
    let shared = axis.shared();
    let name = format!("axis{}", axis.id);
    let join = thread::Builder::new()
        .name(name)
        .spawn(move || {
            let mut axis = axis;
            axis.run_state_machine_loop();
            axis
        })
        .expect("failed to spawn axis worker");
    AxisHandle {
        shared,
        join: Some(join),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
