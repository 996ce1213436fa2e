//! Task chain: the ordered sequence of pending axis states.
//!
//! A bounded deque where the front entry is the state currently being
//! executed. Advancing pops the front; an empty chain reads as
//! `Undefined`, which is the chain terminator.

use heapless::Deque;

use torq_common::axis::state::AxisState;
use torq_common::consts::TASK_CHAIN_CAP;

/// Bounded ordered sequence of pending axis states.
#[derive(Debug)]
pub struct TaskChain {
    queue: Deque<AxisState, TASK_CHAIN_CAP>,
}

impl Default for TaskChain {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskChain {
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
        }
    }

    /// The state at the front of the chain; `Undefined` when empty.
    #[inline]
    pub fn current(&self) -> AxisState {
        self.queue.front().copied().unwrap_or(AxisState::Undefined)
    }

    /// Overwrite the front entry in place, without advancing. Used to
    /// force the running state to `Undefined` (failed prerequisite) or
    /// `Idle` (failed handler).
    pub fn set_current(&mut self, state: AxisState) {
        if self.queue.is_empty() {
            // An empty chain already reads as Undefined; anything else
            // must become a real front entry.
            if state != AxisState::Undefined {
                let _ = self.queue.push_front(state);
            }
            return;
        }
        if let Some(front) = self.queue.front_mut() {
            *front = state;
        }
    }

    /// Consume the front entry and return the new current state.
    pub fn advance(&mut self) -> AxisState {
        self.queue.pop_front();
        self.current()
    }

    /// Append a state. Silently drops the entry if the chain is full;
    /// capacity exceeds the longest request expansion.
    pub fn push(&mut self, state: AxisState) {
        let _ = self.queue.push_back(state);
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Iterate front to back.
    pub fn iter(&self) -> impl Iterator<Item = AxisState> + '_ {
        self.queue.iter().copied()
    }
}
