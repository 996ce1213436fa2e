//! Telemetry snapshot of one axis.
//!
//! `#[repr(C)]` with a fixed 16-byte layout so the property layer can
//! ship it over the wire without conversion.

use static_assertions::const_assert_eq;

/// Point-in-time snapshot of the externally observable axis state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct AxisTelemetry {
    /// Current state (`AxisState` as u8).
    pub current_state: u8,
    /// Pending request (`AxisState` as u8, 0 = none).
    pub requested_state: u8,
    /// Homing sub-state (`HomingState` as u8).
    pub homing_state: u8,
    /// 1 while the worker thread is running the state machine loop.
    pub thread_valid: u8,
    /// Accumulated error bits (`AxisError`).
    pub error_bits: u32,
    /// Monotonic control tick count.
    pub loop_counter: u64,
}

const_assert_eq!(core::mem::size_of::<AxisTelemetry>(), 16);
