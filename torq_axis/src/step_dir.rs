//! Step/direction input.
//!
//! Stepper-compatible motion interface: each falling edge on the step
//! pin nudges the controller's position setpoint by `counts_per_step`,
//! signed by the direction pin. The edge handler runs in interrupt
//! context, so the setpoint lives in a shared atomic cell.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use torq_common::drive::{GpioIntc, PinEdge, PinPull};
use torq_common::sync::FloatCell;

/// Step/dir subscription state for one axis.
pub struct StepDirInput {
    gpio: Arc<dyn GpioIntc>,
    step_pin: u16,
    dir_pin: u16,
    counts_per_step: f32,
    pos_setpoint: Arc<FloatCell>,
    /// Shared with the edge handler so a disable takes effect even if
    /// an edge is already in flight.
    enabled: Arc<AtomicBool>,
}

impl StepDirInput {
    pub fn new(
        gpio: Arc<dyn GpioIntc>,
        step_pin: u16,
        dir_pin: u16,
        counts_per_step: f32,
        pos_setpoint: Arc<FloatCell>,
    ) -> Self {
        Self {
            gpio,
            step_pin,
            dir_pin,
            counts_per_step,
            pos_setpoint,
            enabled: Arc::new(AtomicBool::new(false)),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Enable or disable the step input. Idempotent: re-entering the
    /// current state is a no-op.
    pub fn set_enabled(&mut self, enable: bool) {
        if enable == self.is_enabled() {
            return;
        }
        if enable {
            self.gpio.configure_input(self.dir_pin, PinPull::None);

            let gpio = Arc::clone(&self.gpio);
            let enabled = Arc::clone(&self.enabled);
            let pos_setpoint = Arc::clone(&self.pos_setpoint);
            let dir_pin = self.dir_pin;
            let counts_per_step = self.counts_per_step;
            self.gpio.subscribe(
                self.step_pin,
                PinPull::Down,
                PinEdge::Falling,
                Box::new(move || {
                    if !enabled.load(Ordering::Acquire) {
                        return;
                    }
                    let dir = if gpio.read(dir_pin) { 1.0 } else { -1.0 };
                    pos_setpoint.fetch_add(dir * counts_per_step);
                }),
            );
            self.enabled.store(true, Ordering::Release);
        } else {
            self.enabled.store(false, Ordering::Release);
            self.gpio.unsubscribe(self.step_pin);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::gpio::SimGpio;

    const STEP: u16 = 3;
    const DIR: u16 = 4;

    fn input(gpio: &Arc<SimGpio>, counts_per_step: f32) -> (StepDirInput, Arc<FloatCell>) {
        let cell = Arc::new(FloatCell::new(0.0));
        let input = StepDirInput::new(
            Arc::clone(gpio) as Arc<dyn GpioIntc>,
            STEP,
            DIR,
            counts_per_step,
            Arc::clone(&cell),
        );
        (input, cell)
    }

    #[test]
    fn positive_direction_increments_by_counts_per_step() {
        let gpio = SimGpio::new();
        let (mut input, cell) = input(&gpio, 12.5);
        input.set_enabled(true);

        gpio.set_level(DIR, true);
        for _ in 0..3 {
            gpio.pulse(STEP);
        }
        assert_eq!(cell.load(), 37.5);
    }

    #[test]
    fn negative_direction_decrements() {
        let gpio = SimGpio::new();
        let (mut input, cell) = input(&gpio, 2.0);
        input.set_enabled(true);

        gpio.set_level(DIR, false);
        gpio.pulse(STEP);
        gpio.pulse(STEP);
        assert_eq!(cell.load(), -4.0);
    }

    #[test]
    fn disabled_input_ignores_edges() {
        let gpio = SimGpio::new();
        let (mut input, cell) = input(&gpio, 1.0);

        gpio.set_level(DIR, true);
        gpio.pulse(STEP);
        assert_eq!(cell.load(), 0.0);

        input.set_enabled(true);
        gpio.pulse(STEP);
        assert_eq!(cell.load(), 1.0);

        input.set_enabled(false);
        gpio.pulse(STEP);
        assert_eq!(cell.load(), 1.0);
        assert!(!gpio.is_subscribed(STEP));
    }

    #[test]
    fn re_enabling_is_idempotent() {
        let gpio = SimGpio::new();
        let (mut input, cell) = input(&gpio, 1.0);
        input.set_enabled(true);
        input.set_enabled(true);

        gpio.set_level(DIR, true);
        gpio.pulse(STEP);
        // A double subscription would have doubled the increment.
        assert_eq!(cell.load(), 1.0);
    }
}
