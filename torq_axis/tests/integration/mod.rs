//! Shared scaffolding for the axis integration scenarios.

pub mod control_loop;
pub mod homing;
pub mod startup;
pub mod step_dir;

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use torq_axis::config::AxisNodeConfig;
use torq_axis::sim::SimRig;

/// Generous bound for worker-thread scenarios; each condition usually
/// lands within a few ticker periods.
pub const WAIT: Duration = Duration::from_secs(5);

/// Poll `cond` until it holds or `WAIT` elapses.
#[track_caller]
pub fn wait_for(what: &str, mut cond: impl FnMut() -> bool) {
    let start = Instant::now();
    while !cond() {
        if start.elapsed() > WAIT {
            panic!("timed out waiting for {what}");
        }
        std::thread::sleep(Duration::from_millis(2));
    }
}

/// Default single-axis config node.
pub fn default_node() -> AxisNodeConfig {
    AxisNodeConfig::default()
}

/// Mark the simulated motor calibrated and the encoder ready so the
/// control states pass prerequisite validation.
pub fn calibrate(rig: &SimRig) {
    rig.world.motor_calibrated.store(true, Ordering::Release);
    rig.world.encoder_ready.store(true, Ordering::Release);
}
