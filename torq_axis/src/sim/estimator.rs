//! Simulated back-EMF estimator.

use std::sync::Arc;

use torq_common::drive::SensorlessEstimator;

use super::world::SimWorld;

pub struct SimEstimator {
    world: Arc<SimWorld>,
}

impl SimEstimator {
    pub fn new(world: Arc<SimWorld>) -> Self {
        Self { world }
    }
}

impl SensorlessEstimator for SimEstimator {
    fn update(&mut self) -> bool {
        true
    }

    fn pll_pos(&self) -> f32 {
        self.world.sensorless_pos.load()
    }

    fn vel_estimate(&self) -> f32 {
        self.world.sensorless_vel.load()
    }

    fn phase(&self) -> f32 {
        self.world.sensorless_phase.load()
    }
}
