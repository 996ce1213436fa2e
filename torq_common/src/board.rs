//! Board-wide measurement context.
//!
//! The supply monitor and ADC sampling live outside the axis core; the
//! axis only reads their latest values. Lifting them into one handle
//! (instead of process globals) keeps the safety checks and the
//! thermistor reader testable in isolation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::consts::ADC_CHANNEL_COUNT;
use crate::sync::FloatCell;

/// Shared board state written by the supply monitor and ADC ISRs,
/// read by every axis each tick.
#[derive(Debug, Default)]
pub struct BoardContext {
    /// Latest DC bus voltage measurement [V].
    pub vbus_voltage: FloatCell,
    /// Whether the brake resistor drive is armed.
    pub brake_resistor_armed: AtomicBool,
    /// Latest raw ADC readings, one cell per channel.
    pub adc_measurements: [FloatCell; ADC_CHANNEL_COUNT],
}

impl BoardContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Latest raw reading for `channel`, or 0.0 for an out-of-range
    /// channel index.
    #[inline]
    pub fn adc(&self, channel: usize) -> f32 {
        self.adc_measurements
            .get(channel)
            .map_or(0.0, FloatCell::load)
    }

    #[inline]
    pub fn brake_resistor_armed(&self) -> bool {
        self.brake_resistor_armed.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set_brake_resistor_armed(&self, armed: bool) {
        self.brake_resistor_armed.store(armed, Ordering::Release);
    }
}
