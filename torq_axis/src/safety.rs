//! Per-tick axis safety evaluation.
//!
//! Pure functions over a snapshot of the inputs; the axis composes
//! them with the motor and encoder fault polls each tick and ORs the
//! result into the shared error mask.

use torq_common::axis::error::AxisError;
use torq_common::axis::state::AxisState;
use torq_common::drive::{ArmedState, Endstop};

/// Input snapshot for the board-level safety checks.
#[derive(Debug, Clone, Copy)]
pub struct SafetyCheckInput {
    /// State the axis is currently executing.
    pub state: AxisState,
    /// Motor arm state as reported by the drive.
    pub motor_armed: ArmedState,
    /// Latest bus voltage [V].
    pub vbus_voltage: f32,
    /// Whether the brake resistor drive is armed.
    pub brake_resistor_armed: bool,
    /// Undervoltage trip level [V].
    pub undervoltage_trip_level: f32,
    /// Overvoltage trip level [V].
    pub overvoltage_trip_level: f32,
}

/// Evaluate the board-level checks for one tick. Returns the error
/// bits to accumulate; empty means all checks passed.
pub fn evaluate_axis_checks(input: &SafetyCheckInput) -> AxisError {
    let mut error = AxisError::empty();

    if !input.brake_resistor_armed {
        error |= AxisError::BRAKE_RESISTOR_DISARMED;
    }
    // The idle loop disarms deliberately; anywhere else a disarmed
    // motor means something asynchronously killed the PWM.
    if input.state != AxisState::Idle && input.motor_armed == ArmedState::Disarmed {
        error |= AxisError::MOTOR_DISARMED;
    }
    if !(input.vbus_voltage >= input.undervoltage_trip_level) {
        error |= AxisError::DC_BUS_UNDER_VOLTAGE;
    }
    if !(input.vbus_voltage <= input.overvoltage_trip_level) {
        error |= AxisError::DC_BUS_OVER_VOLTAGE;
    }

    error
}

/// Normal (non-homing) closed-loop endstop guard: a pressed enabled
/// endstop is a fault.
pub fn endstop_guard(min_endstop: &dyn Endstop, max_endstop: &dyn Endstop) -> AxisError {
    if min_endstop.config().enabled && min_endstop.is_pressed() {
        AxisError::MIN_ENDSTOP_PRESSED
    } else if max_endstop.config().enabled && max_endstop.is_pressed() {
        AxisError::MAX_ENDSTOP_PRESSED
    } else {
        AxisError::empty()
    }
}
