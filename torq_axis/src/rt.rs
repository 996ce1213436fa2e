//! Real-time setup for the axis worker thread.
//!
//! With the `rt` feature the worker locks its pages and switches to
//! SCHED_FIFO at the configured priority; without it every call is a
//! no-op so simulation builds and tests need no privileges.

use thiserror::Error;

/// Error raised by the real-time setup calls.
#[derive(Debug, Error)]
pub enum RtError {
    #[error("mlockall failed: {0}")]
    LockMemory(String),
    #[error("sched_setscheduler(SCHED_FIFO, {priority}) failed: {reason}")]
    SetScheduler { priority: i32, reason: String },
}

/// Lock current and future pages so the control loop never faults.
#[cfg(feature = "rt")]
fn lock_memory() -> Result<(), RtError> {
    use nix::sys::mman::{mlockall, MlockAllFlags};
    mlockall(MlockAllFlags::MCL_CURRENT | MlockAllFlags::MCL_FUTURE)
        .map_err(|e| RtError::LockMemory(e.to_string()))
}

#[cfg(not(feature = "rt"))]
fn lock_memory() -> Result<(), RtError> {
    Ok(())
}

/// Switch the calling thread to SCHED_FIFO at `priority`.
#[cfg(feature = "rt")]
fn set_fifo_priority(priority: i32) -> Result<(), RtError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        return Err(RtError::SetScheduler {
            priority,
            reason: std::io::Error::last_os_error().to_string(),
        });
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn set_fifo_priority(_priority: i32) -> Result<(), RtError> {
    Ok(())
}

/// Full worker setup. A priority of zero (or below) leaves scheduling
/// untouched and only locks memory.
pub fn configure_worker_thread(priority: i32) -> Result<(), RtError> {
    lock_memory()?;
    if priority > 0 {
        set_fifo_priority(priority)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_rt_feature_setup_is_a_noop() {
        #[cfg(not(feature = "rt"))]
        {
            assert!(configure_worker_thread(0).is_ok());
            assert!(configure_worker_thread(80).is_ok());
        }
    }
}
