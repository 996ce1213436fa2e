//! Simulated GPIO subscription service.
//!
//! Pin levels and subscriptions live behind separate locks so an edge
//! callback can sample other pins (the step handler reads the dir
//! pin) without re-entering the subscriber table.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use torq_common::drive::{EdgeCallback, GpioIntc, PinEdge, PinPull};

#[derive(Default)]
pub struct SimGpio {
    levels: Mutex<HashMap<u16, bool>>,
    subscribers: Mutex<HashMap<u16, EdgeCallback>>,
}

impl SimGpio {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Drive a pin level from the test side.
    pub fn set_level(&self, pin: u16, level: bool) {
        self.levels
            .lock()
            .expect("sim gpio mutex poisoned")
            .insert(pin, level);
    }

    /// Fire one edge on `pin`, invoking its subscriber if any.
    pub fn pulse(&self, pin: u16) {
        let subscribers = self.subscribers.lock().expect("sim gpio mutex poisoned");
        if let Some(callback) = subscribers.get(&pin) {
            callback();
        }
    }

    pub fn is_subscribed(&self, pin: u16) -> bool {
        self.subscribers
            .lock()
            .expect("sim gpio mutex poisoned")
            .contains_key(&pin)
    }
}

impl GpioIntc for SimGpio {
    fn configure_input(&self, pin: u16, _pull: PinPull) {
        self.levels
            .lock()
            .expect("sim gpio mutex poisoned")
            .entry(pin)
            .or_insert(false);
    }

    fn subscribe(
        &self,
        pin: u16,
        _pull: PinPull,
        _edge: PinEdge,
        callback: EdgeCallback,
    ) -> bool {
        let mut subscribers = self.subscribers.lock().expect("sim gpio mutex poisoned");
        if subscribers.contains_key(&pin) {
            return false;
        }
        subscribers.insert(pin, callback);
        true
    }

    fn unsubscribe(&self, pin: u16) {
        self.subscribers
            .lock()
            .expect("sim gpio mutex poisoned")
            .remove(&pin);
    }

    fn read(&self, pin: u16) -> bool {
        self.levels
            .lock()
            .expect("sim gpio mutex poisoned")
            .get(&pin)
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn pulse_reaches_the_subscriber() {
        let gpio = SimGpio::new();
        let hits = Arc::new(AtomicU32::new(0));
        let hits_cb = Arc::clone(&hits);
        assert!(gpio.subscribe(
            1,
            PinPull::Down,
            PinEdge::Falling,
            Box::new(move || {
                hits_cb.fetch_add(1, Ordering::AcqRel);
            }),
        ));
        gpio.pulse(1);
        gpio.pulse(1);
        gpio.pulse(2); // unsubscribed pin, no effect
        assert_eq!(hits.load(Ordering::Acquire), 2);
    }

    #[test]
    fn double_subscribe_is_rejected() {
        let gpio = SimGpio::new();
        assert!(gpio.subscribe(1, PinPull::Down, PinEdge::Falling, Box::new(|| {})));
        assert!(!gpio.subscribe(1, PinPull::Down, PinEdge::Falling, Box::new(|| {})));
        gpio.unsubscribe(1);
        assert!(!gpio.is_subscribed(1));
    }

    #[test]
    fn levels_default_low() {
        let gpio = SimGpio::new();
        assert!(!gpio.read(7));
        gpio.set_level(7, true);
        assert!(gpio.read(7));
    }
}
