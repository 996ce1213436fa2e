//! Simulated shaft encoder.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use torq_common::drive::Encoder;

use super::world::SimWorld;

pub struct SimEncoder {
    world: Arc<SimWorld>,
    cpr: u32,
    use_index: bool,
}

impl SimEncoder {
    pub fn new(world: Arc<SimWorld>, cpr: u32, use_index: bool) -> Self {
        Self {
            world,
            cpr,
            use_index,
        }
    }
}

impl Encoder for SimEncoder {
    fn setup(&mut self) {}

    fn update(&mut self) -> bool {
        // Estimates are test-driven through the world; nothing to
        // integrate here.
        true
    }

    fn do_checks(&mut self) -> bool {
        !self.world.encoder_fault.load(Ordering::Acquire)
    }

    fn run_index_search(&mut self) -> bool {
        self.world.record_call("index_search");
        true
    }

    fn run_offset_calibration(&mut self) -> bool {
        self.world.record_call("offset_calibration");
        self.world.encoder_ready.store(true, Ordering::Release);
        true
    }

    fn set_linear_count(&mut self, count: i32) {
        self.world.set_linear_count(count);
    }

    fn pos_estimate(&self) -> f32 {
        self.world.encoder_pos.load()
    }

    fn vel_estimate(&self) -> f32 {
        self.world.encoder_vel.load()
    }

    fn phase(&self) -> f32 {
        self.world.encoder_phase.load()
    }

    fn shadow_count(&self) -> i32 {
        self.world.shadow_count()
    }

    fn is_ready(&self) -> bool {
        self.world.encoder_ready.load(Ordering::Acquire)
    }

    fn cpr(&self) -> u32 {
        self.cpr
    }

    fn use_index(&self) -> bool {
        self.use_index
    }
}
