//! Cross-thread surface of one axis.
//!
//! `AxisShared` is the only state visible outside the worker thread:
//! the property layer writes `requested_state` and reads everything
//! else; the current-sense interrupt posts the measurement signal.
//! All fields are single-word atomics; the error mask accumulates
//! with atomic OR.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use torq_common::axis::error::AxisError;
use torq_common::axis::state::{AxisState, HomingState};
use torq_common::axis::telemetry::AxisTelemetry;
use torq_common::consts::CURRENT_MEAS_TIMEOUT_MS;

use crate::signal::CurrentMeasSignal;

/// Shared handle between the axis worker, the current-sense interrupt
/// and the property layer.
#[derive(Debug, Default)]
pub struct AxisShared {
    requested_state: AtomicU8,
    current_state: AtomicU8,
    homing_state: AtomicU8,
    error: AtomicU32,
    loop_counter: AtomicU64,
    thread_valid: AtomicBool,
    shutdown: AtomicBool,
    signal: CurrentMeasSignal,
}

impl AxisShared {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // ── Requested state ─────────────────────────────────────────────

    /// Request a state change. Observed by the worker at the top of
    /// its next iteration, at most one tick later.
    pub fn request_state(&self, state: AxisState) {
        self.requested_state.store(state as u8, Ordering::Release);
    }

    #[inline]
    pub fn requested_state(&self) -> AxisState {
        AxisState::from_u8(self.requested_state.load(Ordering::Acquire))
            .unwrap_or(AxisState::Undefined)
    }

    /// Worker side: consume the pending request.
    pub(crate) fn clear_request(&self) {
        self.requested_state
            .store(AxisState::Undefined as u8, Ordering::Release);
    }

    // ── Current / homing state ──────────────────────────────────────

    #[inline]
    pub fn current_state(&self) -> AxisState {
        AxisState::from_u8(self.current_state.load(Ordering::Acquire))
            .unwrap_or(AxisState::Undefined)
    }

    pub(crate) fn publish_current_state(&self, state: AxisState) {
        self.current_state.store(state as u8, Ordering::Release);
    }

    #[inline]
    pub fn homing_state(&self) -> HomingState {
        HomingState::from_u8(self.homing_state.load(Ordering::Acquire))
            .unwrap_or(HomingState::Inactive)
    }

    pub(crate) fn set_homing_state(&self, state: HomingState) {
        self.homing_state.store(state as u8, Ordering::Release);
    }

    // ── Error mask ──────────────────────────────────────────────────

    /// Accumulate error bits (atomic OR).
    pub fn raise_error(&self, error: AxisError) {
        self.error.fetch_or(error.bits(), Ordering::AcqRel);
    }

    #[inline]
    pub fn error(&self) -> AxisError {
        AxisError::from_bits_truncate(self.error.load(Ordering::Acquire))
    }

    /// Clear specific error bits. The property layer uses this to
    /// acknowledge faults; the worker uses it for the `INVALID_STATE`
    /// auto-clear.
    pub fn clear_error_bits(&self, error: AxisError) {
        self.error.fetch_and(!error.bits(), Ordering::AcqRel);
    }

    // ── Loop counter ────────────────────────────────────────────────

    #[inline]
    pub fn loop_counter(&self) -> u64 {
        self.loop_counter.load(Ordering::Acquire)
    }

    pub(crate) fn store_loop_counter(&self, value: u64) {
        self.loop_counter.store(value, Ordering::Release);
    }

    // ── Worker lifecycle ────────────────────────────────────────────

    #[inline]
    pub fn thread_valid(&self) -> bool {
        self.thread_valid.load(Ordering::Acquire)
    }

    pub(crate) fn set_thread_valid(&self, valid: bool) {
        self.thread_valid.store(valid, Ordering::Release);
    }

    /// Ask the worker to leave its run loop. Clean-exit hook for
    /// teardown; normal operation never sets this.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    #[inline]
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    // ── Measurement signal ──────────────────────────────────────────

    /// Interrupt side: post a measurement token to the worker.
    /// Dropped while no worker is running the state machine loop.
    /// Returns whether the token was delivered.
    pub fn signal_current_meas(&self) -> bool {
        if !self.thread_valid() {
            return false;
        }
        self.signal.notify();
        true
    }

    /// Worker side: block until the next measurement token.
    pub(crate) fn wait_current_meas(&self) -> bool {
        self.signal.wait(Duration::from_millis(CURRENT_MEAS_TIMEOUT_MS))
    }

    /// Unconditional worker wakeup, used to shorten shutdown latency.
    pub(crate) fn wake_worker(&self) {
        self.signal.notify();
    }

    // ── Telemetry ───────────────────────────────────────────────────

    /// Produce a snapshot for the property layer.
    pub fn snapshot(&self) -> AxisTelemetry {
        AxisTelemetry {
            current_state: self.current_state.load(Ordering::Acquire),
            requested_state: self.requested_state.load(Ordering::Acquire),
            homing_state: self.homing_state.load(Ordering::Acquire),
            thread_valid: self.thread_valid() as u8,
            error_bits: self.error.load(Ordering::Acquire),
            loop_counter: self.loop_counter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_and_clear() {
        let shared = AxisShared::new();
        assert_eq!(shared.requested_state(), AxisState::Undefined);
        shared.request_state(AxisState::ClosedLoopControl);
        assert_eq!(shared.requested_state(), AxisState::ClosedLoopControl);
        shared.clear_request();
        assert_eq!(shared.requested_state(), AxisState::Undefined);
    }

    #[test]
    fn errors_accumulate_and_clear_selectively() {
        let shared = AxisShared::new();
        shared.raise_error(AxisError::INVALID_STATE);
        shared.raise_error(AxisError::MOTOR_FAILED);
        assert_eq!(
            shared.error(),
            AxisError::INVALID_STATE | AxisError::MOTOR_FAILED
        );
        shared.clear_error_bits(AxisError::INVALID_STATE);
        assert_eq!(shared.error(), AxisError::MOTOR_FAILED);
    }

    #[test]
    fn signal_gated_on_thread_valid() {
        let shared = AxisShared::new();
        assert!(!shared.signal_current_meas());
        shared.set_thread_valid(true);
        assert!(shared.signal_current_meas());
        assert!(shared.wait_current_meas());
    }

    #[test]
    fn snapshot_reflects_state() {
        let shared = AxisShared::new();
        shared.publish_current_state(AxisState::Idle);
        shared.set_homing_state(HomingState::MoveToZero);
        shared.raise_error(AxisError::CONTROL_LOOP_MISSED);
        shared.store_loop_counter(99);

        let snap = shared.snapshot();
        assert_eq!(snap.current_state, AxisState::Idle as u8);
        assert_eq!(snap.homing_state, HomingState::MoveToZero as u8);
        assert_eq!(snap.error_bits, AxisError::CONTROL_LOOP_MISSED.bits());
        assert_eq!(snap.loop_counter, 99);
        assert_eq!(snap.thread_valid, 0);
    }
}
