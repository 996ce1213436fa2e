//! Simulation backend.
//!
//! First-class simulated implementations of every collaborator trait,
//! backed by one shared [`world::SimWorld`]. The operator binary runs
//! against them when no hardware is present, and the integration
//! tests drive complete axis scenarios through them.

pub mod controller;
pub mod encoder;
pub mod endstop;
pub mod estimator;
pub mod gpio;
pub mod motor;
pub mod trajectory;
pub mod world;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use torq_common::axis::config::{AxisConfig, AxisHardwareConfig, BoardConfig, EndstopConfig};
use torq_common::board::BoardContext;
use torq_common::drive::GpioIntc;

use crate::axis::{start_axis_thread, Axis, AxisHandle, AxisParts};
use crate::config::AxisNodeConfig;
use crate::shared::AxisShared;

use controller::SimController;
use encoder::SimEncoder;
use endstop::{EndstopSide, SimEndstop};
use estimator::SimEstimator;
use gpio::SimGpio;
use motor::SimMotor;
use trajectory::SimTrajectory;
use world::SimWorld;

/// Homing cruise velocity reported by the simulated controller
/// [counts/s].
pub const SIM_HOMING_SPEED: f32 = 8_000.0;

/// Encoder resolution of the simulated shaft.
pub const SIM_ENCODER_CPR: u32 = 8_192;

/// Signal generator period standing in for the current-sense timer.
pub const SIM_TICK_PERIOD: Duration = Duration::from_millis(1);

// ─── Bindings ───────────────────────────────────────────────────────

/// The shared pieces a simulated axis hangs off: world, GPIO service
/// and board context, plus the endstop configs to build with.
pub struct SimBindings {
    pub world: Arc<SimWorld>,
    pub gpio: Arc<SimGpio>,
    pub board: Arc<BoardContext>,
    pub min_endstop: EndstopConfig,
    pub max_endstop: EndstopConfig,
    /// Whether the simulated encoder reports an index pulse.
    pub encoder_use_index: bool,
}

impl SimBindings {
    pub fn new(min_endstop: EndstopConfig, max_endstop: EndstopConfig) -> Self {
        Self {
            world: SimWorld::new(),
            gpio: SimGpio::new(),
            board: BoardContext::new(),
            min_endstop,
            max_endstop,
            encoder_use_index: false,
        }
    }
}

/// Assemble one axis over simulated collaborators.
pub fn build_sim_axis(
    id: u8,
    config: AxisConfig,
    hw: AxisHardwareConfig,
    board_config: BoardConfig,
    bindings: &SimBindings,
) -> Axis {
    let world = &bindings.world;
    Axis::new(AxisParts {
        id,
        config,
        hw,
        board_config,
        board: Arc::clone(&bindings.board),
        gpio: Arc::clone(&bindings.gpio) as Arc<dyn GpioIntc>,
        motor: Box::new(SimMotor::new(Arc::clone(world))),
        encoder: Box::new(SimEncoder::new(
            Arc::clone(world),
            SIM_ENCODER_CPR,
            bindings.encoder_use_index,
        )),
        estimator: Box::new(SimEstimator::new(Arc::clone(world))),
        controller: Box::new(SimController::new(Arc::clone(world), SIM_HOMING_SPEED)),
        trajectory: Box::new(SimTrajectory::new(Arc::clone(world))),
        min_endstop: Box::new(SimEndstop::new(
            Arc::clone(world),
            EndstopSide::Min,
            bindings.min_endstop.clone(),
        )),
        max_endstop: Box::new(SimEndstop::new(
            Arc::clone(world),
            EndstopSide::Max,
            bindings.max_endstop.clone(),
        )),
    })
}

// ─── Signal Ticker ──────────────────────────────────────────────────

/// Stand-in for the current-sense timer interrupt: posts the
/// measurement token to one axis at a fixed period.
pub struct SignalTicker {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl SignalTicker {
    pub fn start(shared: Arc<AxisShared>, period: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let join = thread::Builder::new()
            .name("current-meas-ticker".to_string())
            .spawn(move || {
                while !stop_flag.load(Ordering::Acquire) {
                    thread::sleep(period);
                    shared.signal_current_meas();
                }
            })
            .expect("failed to spawn signal ticker");
        Self {
            stop,
            join: Some(join),
        }
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for SignalTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── Rig ────────────────────────────────────────────────────────────

/// Knobs for [`SimRig::start_opts`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SimRigOptions {
    /// Axis index used for thread naming and logs.
    pub id: u8,
    /// Whether the simulated encoder reports an index pulse.
    pub encoder_use_index: bool,
}

/// A running simulated axis: worker thread plus signal generator.
pub struct SimRig {
    pub world: Arc<SimWorld>,
    pub gpio: Arc<SimGpio>,
    pub board: Arc<BoardContext>,
    pub shared: Arc<AxisShared>,
    handle: Option<AxisHandle>,
    ticker: Option<SignalTicker>,
}

impl SimRig {
    /// Build and start an axis from one config node, with the board
    /// powered inside the trip band and the signal generator running.
    pub fn start(node: &AxisNodeConfig, board_config: &BoardConfig) -> Self {
        Self::start_opts(node, board_config, SimRigOptions::default())
    }

    /// As [`SimRig::start`], with explicit options.
    pub fn start_opts(
        node: &AxisNodeConfig,
        board_config: &BoardConfig,
        options: SimRigOptions,
    ) -> Self {
        let mut bindings = SimBindings::new(node.min_endstop.clone(), node.max_endstop.clone());
        bindings.encoder_use_index = options.encoder_use_index;
        bindings.board.vbus_voltage.store(24.0);
        bindings.board.set_brake_resistor_armed(true);

        let mut axis = build_sim_axis(
            options.id,
            node.config.clone(),
            node.hw.clone(),
            board_config.clone(),
            &bindings,
        );
        axis.setup();

        let handle = start_axis_thread(axis);
        let shared = Arc::clone(handle.shared());
        let ticker = SignalTicker::start(Arc::clone(&shared), SIM_TICK_PERIOD);

        Self {
            world: bindings.world,
            gpio: bindings.gpio,
            board: bindings.board,
            shared,
            handle: Some(handle),
            ticker: Some(ticker),
        }
    }

    pub fn request_state(&self, state: torq_common::axis::state::AxisState) {
        self.shared.request_state(state);
    }

    /// Kill the signal generator, simulating a stopped current loop.
    pub fn stop_ticker(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.stop();
        }
    }

    /// Stop everything and return the axis for post-mortem access.
    pub fn shutdown(mut self) -> Option<Axis> {
        self.stop_ticker();
        self.handle.take().map(AxisHandle::shutdown)
    }
}
