//! Simulated mechanical endstop.
//!
//! The debounce window is collapsed: the world's pressed flag is the
//! debounced state.

use std::sync::Arc;

use torq_common::axis::config::EndstopConfig;
use torq_common::drive::Endstop;

use super::world::SimWorld;

/// Which travel limit an endstop instance guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndstopSide {
    Min,
    Max,
}

pub struct SimEndstop {
    world: Arc<SimWorld>,
    side: EndstopSide,
    config: EndstopConfig,
    offset_from_home: i32,
}

impl SimEndstop {
    pub fn new(world: Arc<SimWorld>, side: EndstopSide, config: EndstopConfig) -> Self {
        Self {
            world,
            side,
            config,
            offset_from_home: 0,
        }
    }
}

impl Endstop for SimEndstop {
    fn update(&mut self, _loop_counter: u64) {}

    fn is_pressed(&self) -> bool {
        match self.side {
            EndstopSide::Min => self.world.min_endstop_pressed(),
            EndstopSide::Max => self.world.max_endstop_pressed(),
        }
    }

    fn config(&self) -> &EndstopConfig {
        &self.config
    }

    fn offset_from_home(&self) -> i32 {
        self.offset_from_home
    }

    fn set_offset_from_home(&mut self, count: i32) {
        self.offset_from_home = count;
        match self.side {
            EndstopSide::Min => self.world.set_min_offset_from_home(count),
            EndstopSide::Max => self.world.set_max_offset_from_home(count),
        }
    }
}
