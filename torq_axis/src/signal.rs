//! Current-measurement signal.
//!
//! The current-sense interrupt unblocks the axis worker once per
//! sample. The signal is a capacity-one lossy token: posting while a
//! token is already pending is a no-op, and a token posted while the
//! worker is not waiting makes the next wait return immediately, at
//! most once.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// Capacity-one lossy wakeup token.
#[derive(Debug, Default)]
pub struct CurrentMeasSignal {
    pending: Mutex<bool>,
    cond: Condvar,
}

impl CurrentMeasSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a token. Lossy: a token that is already pending is not
    /// duplicated.
    pub fn notify(&self) {
        let mut pending = self.pending.lock().expect("signal mutex poisoned");
        *pending = true;
        self.cond.notify_one();
    }

    /// Block until a token is available or `timeout` elapses.
    /// Consumes the token and returns true on success; returns false
    /// on timeout.
    pub fn wait(&self, timeout: Duration) -> bool {
        let pending = self.pending.lock().expect("signal mutex poisoned");
        let (mut pending, result) = self
            .cond
            .wait_timeout_while(pending, timeout, |p| !*p)
            .expect("signal mutex poisoned");
        if result.timed_out() && !*pending {
            return false;
        }
        *pending = false;
        true
    }
}
