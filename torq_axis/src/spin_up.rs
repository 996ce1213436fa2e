//! Sensorless spin-up profile.
//!
//! Open-loop two-stage ramp that brings an unsensed rotor up to the
//! hand-off velocity: first a current spiral that builds torque while
//! sweeping the electrical angle, then a constant-current phase
//! acceleration. The axis drives one stage per control tick; the
//! steppers here are pure so the profile math is testable without a
//! motor.

use std::f32::consts::{PI, TAU};

use torq_common::axis::config::AxisConfig;
use torq_common::consts::TICK_PERIOD;

/// Wrap a radian value into `[-pi, +pi)`.
#[inline]
pub fn wrap_pm_pi(x: f32) -> f32 {
    (x + PI).rem_euclid(TAU) - PI
}

/// One tick of open-loop output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinUpStep {
    /// Electrical phase to command [rad].
    pub phase: f32,
    /// Current magnitude to command [A].
    pub current: f32,
    /// True once the stage has finished.
    pub done: bool,
}

/// Stage 1: spiral the current up while sweeping the phase.
#[derive(Debug)]
pub struct CurrentSpiral {
    x: f32,
    ramp_up_time: f32,
    ramp_up_distance: f32,
    spin_up_current: f32,
}

impl CurrentSpiral {
    pub fn new(config: &AxisConfig) -> Self {
        Self {
            x: 0.0,
            ramp_up_time: config.ramp_up_time,
            ramp_up_distance: config.ramp_up_distance,
            spin_up_current: config.spin_up_current,
        }
    }

    /// Advance one tick.
    pub fn step(&mut self) -> SpinUpStep {
        let phase = wrap_pm_pi(self.ramp_up_distance * self.x);
        let current = self.spin_up_current * self.x;
        self.x += TICK_PERIOD / self.ramp_up_time;
        SpinUpStep {
            phase,
            current,
            done: self.x >= 1.0,
        }
    }
}

/// Stage 2: accelerate the phase at constant current until the
/// hand-off velocity.
#[derive(Debug)]
pub struct PhaseAccel {
    vel: f32,
    phase: f32,
    spin_up_current: f32,
    spin_up_acceleration: f32,
    spin_up_target_vel: f32,
}

impl PhaseAccel {
    /// Continue from where the current spiral left off.
    pub fn new(config: &AxisConfig) -> Self {
        Self {
            vel: config.ramp_up_distance / config.ramp_up_time,
            phase: wrap_pm_pi(config.ramp_up_distance),
            spin_up_current: config.spin_up_current,
            spin_up_acceleration: config.spin_up_acceleration,
            spin_up_target_vel: config.spin_up_target_vel,
        }
    }

    /// Advance one tick.
    pub fn step(&mut self) -> SpinUpStep {
        self.vel += self.spin_up_acceleration * TICK_PERIOD;
        self.phase = wrap_pm_pi(self.phase + self.vel * TICK_PERIOD);
        SpinUpStep {
            phase: self.phase,
            current: self.spin_up_current,
            done: self.vel >= self.spin_up_target_vel,
        }
    }

    /// Current electrical velocity [rad/s].
    #[inline]
    pub fn vel(&self) -> f32 {
        self.vel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use torq_common::consts::TICK_HZ;

    fn test_config() -> AxisConfig {
        AxisConfig {
            ramp_up_time: 0.1,
            ramp_up_distance: 2.0,
            spin_up_current: 10.0,
            spin_up_acceleration: 400.0,
            spin_up_target_vel: 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn wrap_pm_pi_range() {
        assert!((wrap_pm_pi(0.0)).abs() < 1e-6);
        assert!((wrap_pm_pi(TAU) - 0.0).abs() < 1e-5);
        assert!((wrap_pm_pi(PI + 0.1) - (-PI + 0.1)).abs() < 1e-5);
        assert!((wrap_pm_pi(-PI - 0.1) - (PI - 0.1)).abs() < 1e-5);
        // -pi maps onto itself, +pi wraps to -pi.
        assert!((wrap_pm_pi(-PI) - (-PI)).abs() < 1e-6);
        assert!((wrap_pm_pi(PI) - (-PI)).abs() < 1e-5);
    }

    #[test]
    fn spiral_ramps_current_from_zero() {
        let cfg = test_config();
        let mut spiral = CurrentSpiral::new(&cfg);
        let first = spiral.step();
        assert_eq!(first.current, 0.0);
        assert_eq!(first.phase, 0.0);
        assert!(!first.done);

        let second = spiral.step();
        assert!(second.current > 0.0);
        assert!(second.current < cfg.spin_up_current);
    }

    #[test]
    fn spiral_finishes_after_ramp_up_time() {
        let cfg = test_config();
        let expected_ticks = (cfg.ramp_up_time * TICK_HZ as f32) as u32;
        let mut spiral = CurrentSpiral::new(&cfg);
        let mut ticks = 0;
        while !spiral.step().done {
            ticks += 1;
            assert!(ticks < 2 * expected_ticks, "spiral never finished");
        }
        // The final tick is the one that pushes x past 1.0.
        assert!(ticks.abs_diff(expected_ticks) <= 1);
    }

    #[test]
    fn accel_reaches_target_velocity() {
        let cfg = test_config();
        let mut accel = PhaseAccel::new(&cfg);
        assert_eq!(accel.vel(), cfg.ramp_up_distance / cfg.ramp_up_time);

        let mut ticks = 0u32;
        let mut last = accel.step();
        while !last.done {
            assert_eq!(last.current, cfg.spin_up_current);
            assert!(last.phase >= -PI && last.phase < PI);
            last = accel.step();
            ticks += 1;
            assert!(ticks < 10 * TICK_HZ, "acceleration never finished");
        }
        assert!(accel.vel() >= cfg.spin_up_target_vel);
    }

    #[test]
    fn accel_velocity_grows_monotonically() {
        let cfg = test_config();
        let mut accel = PhaseAccel::new(&cfg);
        let v0 = accel.vel();
        accel.step();
        let v1 = accel.vel();
        accel.step();
        let v2 = accel.vel();
        assert!(v0 < v1 && v1 < v2);
    }
}
