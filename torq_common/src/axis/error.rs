//! Axis error bitflags.
//!
//! Errors are accumulated with atomic OR, never thrown. All bits are
//! sticky until the property layer clears them; only `INVALID_STATE`
//! is auto-cleared when a fresh state request is loaded.

use bitflags::bitflags;

bitflags! {
    /// Axis-level error flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AxisError: u32 {
        /// Requested or dispatched state was not runnable.
        const INVALID_STATE            = 0x0001;
        /// Bus voltage below the configured trip level.
        const DC_BUS_UNDER_VOLTAGE     = 0x0002;
        /// Bus voltage above the configured trip level.
        const DC_BUS_OVER_VOLTAGE      = 0x0004;
        /// Brake resistor drive is not armed.
        const BRAKE_RESISTOR_DISARMED  = 0x0008;
        /// Motor reported disarmed outside the idle loop.
        const MOTOR_DISARMED           = 0x0010;
        /// Motor update or calibration failed.
        const MOTOR_FAILED             = 0x0020;
        /// Encoder update or check failed.
        const ENCODER_FAILED           = 0x0040;
        /// Sensorless estimator update failed.
        const ESTIMATOR_FAILED         = 0x0080;
        /// Controller update failed.
        const CONTROLLER_FAILED        = 0x0100;
        /// Current-measurement signal missed outside idle.
        const CONTROL_LOOP_MISSED      = 0x0200;
        /// Position or trajectory mode commanded during sensorless control.
        const POS_CTRL_DURING_SENSORLESS = 0x0400;
        /// Min endstop pressed during normal closed-loop operation.
        const MIN_ENDSTOP_PRESSED      = 0x0800;
        /// Max endstop pressed during normal closed-loop operation.
        const MAX_ENDSTOP_PRESSED      = 0x1000;
    }
}

impl Default for AxisError {
    fn default() -> Self {
        Self::empty()
    }
}
