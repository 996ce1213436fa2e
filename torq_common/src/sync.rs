//! Lock-free float cell shared between the control loop and interrupt
//! handlers.
//!
//! The step/dir edge handler increments the position setpoint from
//! interrupt context while the control loop reads it; the contract is
//! "no torn value, no lost update", which a CAS loop over the f32 bit
//! pattern provides on any platform with 32-bit atomics.

use std::sync::atomic::{AtomicU32, Ordering};

/// An `f32` with atomic load/store and add, stored as its bit pattern.
#[derive(Debug)]
pub struct FloatCell(AtomicU32);

impl FloatCell {
    /// Create a cell holding `value`.
    pub const fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    /// Atomically read the current value.
    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    /// Atomically replace the current value.
    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }

    /// Atomically add `delta`, returning the previous value.
    ///
    /// Implemented as a compare-exchange loop so that concurrent
    /// increments from interrupt context are never lost.
    pub fn fetch_add(&self, delta: f32) -> f32 {
        let mut current = self.0.load(Ordering::Acquire);
        loop {
            let next = (f32::from_bits(current) + delta).to_bits();
            match self.0.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(prev) => return f32::from_bits(prev),
                Err(observed) => current = observed,
            }
        }
    }
}

impl Default for FloatCell {
    fn default() -> Self {
        Self::new(0.0)
    }
}
