//! Simulated gate driver / motor.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use torq_common::drive::{ArmedState, MotorDrive};

use super::world::SimWorld;

pub struct SimMotor {
    world: Arc<SimWorld>,
}

impl SimMotor {
    pub fn new(world: Arc<SimWorld>) -> Self {
        Self { world }
    }
}

impl MotorDrive for SimMotor {
    fn setup(&mut self) {}

    fn arm(&mut self) -> bool {
        self.world.motor_armed.store(true, Ordering::Release);
        true
    }

    fn disarm(&mut self) {
        self.world.motor_armed.store(false, Ordering::Release);
    }

    fn armed_state(&self) -> ArmedState {
        if self.world.motor_armed() {
            ArmedState::Armed
        } else {
            ArmedState::Disarmed
        }
    }

    fn is_calibrated(&self) -> bool {
        self.world.motor_calibrated.load(Ordering::Acquire)
    }

    fn run_calibration(&mut self) -> bool {
        self.world.record_call("motor_calibration");
        if self.world.fail_motor_calibration.load(Ordering::Acquire) {
            return false;
        }
        self.world.motor_calibrated.store(true, Ordering::Release);
        true
    }

    fn update(&mut self, current_setpoint: f32, phase: f32) -> bool {
        if self.world.fail_motor_update.load(Ordering::Acquire) {
            return false;
        }
        self.world.record_motor_update(current_setpoint, phase);
        true
    }

    fn do_checks(&mut self) -> bool {
        !self.world.motor_fault.load(Ordering::Acquire)
    }
}
