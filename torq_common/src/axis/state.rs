//! Axis state enums.
//!
//! All enums use `#[repr(u8)]` for compact telemetry transport and
//! provide `from_u8` for decoding property-layer writes.

use serde::{Deserialize, Serialize};

/// Top-level axis state, driven by the task chain sequencer.
///
/// `Undefined` doubles as the "no request" value of `requested_state`
/// and as the task chain terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AxisState {
    /// No state / chain terminator / no pending request.
    Undefined = 0,
    /// Motor PWM disarmed, waiting for a request.
    Idle = 1,
    /// Composite request: expands per the startup_* config flags.
    StartupSequence = 2,
    /// Composite request: motor + encoder calibration then idle.
    FullCalibrationSequence = 3,
    /// Measure motor phase resistance/inductance.
    MotorCalibration = 4,
    /// Scan for the encoder index pulse.
    EncoderIndexSearch = 5,
    /// Measure the encoder-to-phase offset.
    EncoderOffsetCalibration = 6,
    /// Locate mechanical zero via the endstops.
    Homing = 7,
    /// Encoder-based closed-loop control.
    ClosedLoopControl = 8,
    /// Back-EMF-estimator-based control.
    SensorlessControl = 9,
}

impl AxisState {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Undefined),
            1 => Some(Self::Idle),
            2 => Some(Self::StartupSequence),
            3 => Some(Self::FullCalibrationSequence),
            4 => Some(Self::MotorCalibration),
            5 => Some(Self::EncoderIndexSearch),
            6 => Some(Self::EncoderOffsetCalibration),
            7 => Some(Self::Homing),
            8 => Some(Self::ClosedLoopControl),
            9 => Some(Self::SensorlessControl),
            _ => None,
        }
    }

    /// States stricter than motor calibration: they may only run on a
    /// calibrated motor.
    #[inline]
    pub const fn requires_calibrated_motor(&self) -> bool {
        matches!(
            self,
            Self::EncoderIndexSearch
                | Self::EncoderOffsetCalibration
                | Self::Homing
                | Self::ClosedLoopControl
                | Self::SensorlessControl
        )
    }

    /// States stricter than encoder offset calibration: they may only
    /// run on a ready encoder. Sensorless control deliberately does
    /// not appear here.
    #[inline]
    pub const fn requires_ready_encoder(&self) -> bool {
        matches!(self, Self::Homing | Self::ClosedLoopControl)
    }
}

impl Default for AxisState {
    fn default() -> Self {
        Self::Undefined
    }
}

/// Sub-state of the homing procedure hosted by closed-loop control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HomingState {
    /// Not homing.
    Inactive = 0,
    /// Seeking the min (then optionally max) endstop.
    Homing = 1,
    /// Trajectory move back to the homed zero position.
    MoveToZero = 2,
}

impl HomingState {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Inactive),
            1 => Some(Self::Homing),
            2 => Some(Self::MoveToZero),
            _ => None,
        }
    }
}

impl Default for HomingState {
    fn default() -> Self {
        Self::Inactive
    }
}

/// Controller input mode. The ordering matters: sensorless operation
/// rejects any mode at or above position control.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum ControlMode {
    CurrentControl = 0,
    VelocityControl = 1,
    PositionControl = 2,
    TrajectoryControl = 3,
}

impl ControlMode {
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::CurrentControl),
            1 => Some(Self::VelocityControl),
            2 => Some(Self::PositionControl),
            3 => Some(Self::TrajectoryControl),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_state_roundtrip() {
        for v in 0..=9u8 {
            let state = AxisState::from_u8(v).unwrap();
            assert_eq!(state as u8, v);
        }
        assert!(AxisState::from_u8(10).is_none());
        assert!(AxisState::from_u8(255).is_none());
    }

    #[test]
    fn motor_calibration_prerequisites() {
        assert!(!AxisState::Undefined.requires_calibrated_motor());
        assert!(!AxisState::Idle.requires_calibrated_motor());
        assert!(!AxisState::MotorCalibration.requires_calibrated_motor());
        assert!(AxisState::EncoderOffsetCalibration.requires_calibrated_motor());
        assert!(AxisState::ClosedLoopControl.requires_calibrated_motor());
        assert!(AxisState::SensorlessControl.requires_calibrated_motor());
    }

    #[test]
    fn encoder_prerequisites_skip_sensorless() {
        assert!(AxisState::Homing.requires_ready_encoder());
        assert!(AxisState::ClosedLoopControl.requires_ready_encoder());
        assert!(!AxisState::SensorlessControl.requires_ready_encoder());
        assert!(!AxisState::EncoderOffsetCalibration.requires_ready_encoder());
    }

    #[test]
    fn homing_state_roundtrip() {
        for v in 0..=2u8 {
            assert_eq!(HomingState::from_u8(v).unwrap() as u8, v);
        }
        assert!(HomingState::from_u8(3).is_none());
    }

    #[test]
    fn control_mode_ordering() {
        assert!(ControlMode::CurrentControl < ControlMode::PositionControl);
        assert!(ControlMode::VelocityControl < ControlMode::PositionControl);
        assert!(ControlMode::TrajectoryControl >= ControlMode::PositionControl);
    }
}
