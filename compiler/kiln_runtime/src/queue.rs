//! Trampoline of ready continuations.
//!
//! Receivers never call each other. Anything that becomes runnable is
//! pushed here and `Runtime::run` pops and executes pairs one at a time, so
//! native stack depth stays constant regardless of how long a dependency
//! chain is. Pairs pushed by the same resolution run in push order (FIFO).

use std::collections::VecDeque;

use crate::receiver::Receiver;
use crate::value::Value;

/// Queue of `(Receiver, Value)` pairs ready to run.
#[derive(Default)]
pub struct WorkQueue {
    ready: VecDeque<(Receiver, Value)>,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, receiver: Receiver, value: Value) {
        self.ready.push_back((receiver, value));
    }

    #[inline]
    pub fn pop(&mut self) -> Option<(Receiver, Value)> {
        self.ready.pop_front()
    }

    pub fn len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }
}
