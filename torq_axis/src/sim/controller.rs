//! Simulated position/velocity controller.
//!
//! A proportional stand-in for the real control law: enough to close
//! the loop against the simulated motor. The control mode and every
//! setpoint write live in the world so tests can stage and observe
//! them.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use torq_common::axis::state::ControlMode;
use torq_common::drive::Controller;
use torq_common::sync::FloatCell;

use super::world::SimWorld;

pub struct SimController {
    world: Arc<SimWorld>,
    pos_setpoint: Arc<FloatCell>,
    homing_speed: f32,
    pos_gain: f32,
    cogging_map: Option<Vec<f32>>,
}

impl SimController {
    pub fn new(world: Arc<SimWorld>, homing_speed: f32) -> Self {
        let pos_setpoint = Arc::clone(&world.pos_setpoint);
        world.set_control_mode(ControlMode::PositionControl as u8);
        Self {
            world,
            pos_setpoint,
            homing_speed,
            pos_gain: 0.01,
            cogging_map: None,
        }
    }
}

impl Controller for SimController {
    fn update(&mut self, pos_estimate: f32, vel_estimate: f32) -> Option<f32> {
        if self.world.fail_controller.load(Ordering::Acquire) {
            return None;
        }
        let current = match self.control_mode() {
            ControlMode::CurrentControl => 0.0,
            ControlMode::VelocityControl => {
                (self.world.vel_setpoint.load() - vel_estimate) * self.pos_gain
            }
            ControlMode::PositionControl | ControlMode::TrajectoryControl => {
                (self.pos_setpoint.load() - pos_estimate) * self.pos_gain
            }
        };
        Some(current)
    }

    fn home_axis(&mut self) -> bool {
        // Approach the min endstop in velocity mode.
        self.set_control_mode(ControlMode::VelocityControl);
        self.set_vel_setpoint(-self.homing_speed, 0.0);
        true
    }

    fn reset(&mut self) {
        self.pos_setpoint.store(0.0);
        self.world.vel_setpoint.store(0.0);
        self.world.vel_integrator_current.store(0.0);
    }

    fn set_pos_setpoint(&mut self, pos: f32, vel_feed_forward: f32, _current_feed_forward: f32) {
        self.pos_setpoint.store(pos);
        self.world.vel_setpoint.store(vel_feed_forward);
    }

    fn set_vel_setpoint(&mut self, vel: f32, _current_feed_forward: f32) {
        self.world.vel_setpoint.store(vel);
    }

    fn set_vel_integrator_current(&mut self, value: f32) {
        self.world.vel_integrator_current.store(value);
    }

    fn pos_setpoint(&self) -> Arc<FloatCell> {
        Arc::clone(&self.pos_setpoint)
    }

    fn control_mode(&self) -> ControlMode {
        ControlMode::from_u8(self.world.control_mode())
            .unwrap_or(ControlMode::PositionControl)
    }

    fn set_control_mode(&mut self, mode: ControlMode) {
        self.world.set_control_mode(mode as u8);
    }

    fn homing_speed(&self) -> f32 {
        self.homing_speed
    }

    fn set_traj_start_tick(&mut self, tick: u64) {
        self.world.traj_start_tick.store(tick, Ordering::Release);
    }

    fn init_cogging_map(&mut self, cpr: u32) -> bool {
        self.cogging_map = Some(vec![0.0; cpr as usize]);
        true
    }
}
