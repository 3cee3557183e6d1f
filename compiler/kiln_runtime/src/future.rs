//! Single-assignment future slots and the force/resolve protocol.
//!
//! A slot is either pending with a list of waiting receivers, or resolved
//! with exactly one value. Resolution never runs receivers directly: each
//! waiter is pushed onto the [`WorkQueue`] in registration order, so the
//! native stack stays flat however long a dependency chain gets.

use std::fmt;

use smallvec::SmallVec;

use crate::heap::Heap;
use crate::queue::WorkQueue;
use crate::receiver::Receiver;
use crate::value::Value;

/// Index of a future slot in the [`Heap`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FutureId(u32);

impl FutureId {
    #[inline]
    pub(crate) fn new(index: u32) -> Self {
        FutureId(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FutureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "future#{}", self.0)
    }
}

/// State of one future.
pub enum FutureSlot {
    /// Not yet resolved; receivers fire in this order on resolution.
    Pending(SmallVec<[Receiver; 1]>),
    /// Resolved; never reassigned.
    Resolved(Value),
}

impl FutureSlot {
    pub(crate) fn pending() -> Self {
        FutureSlot::Pending(SmallVec::new())
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            FutureSlot::Resolved(v) => Some(v),
            FutureSlot::Pending(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, FutureSlot::Resolved(_))
    }

    /// Number of receivers waiting on this slot.
    pub fn waiters(&self) -> usize {
        match self {
            FutureSlot::Pending(waiters) => waiters.len(),
            FutureSlot::Resolved(_) => 0,
        }
    }
}

impl fmt::Debug for FutureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FutureSlot::Pending(waiters) => write!(f, "Pending({} waiters)", waiters.len()),
            FutureSlot::Resolved(v) => write!(f, "Resolved({v:?})"),
        }
    }
}

/// Engine bug detected at runtime. Not part of the user-visible failure
/// taxonomy; callers that do not want to inspect it should panic.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("{0} resolved twice")]
    DoubleResolve(FutureId),
}

/// Hand `future`'s value to `receiver`.
///
/// If the future is resolved the pair goes straight onto the queue;
/// otherwise the receiver joins the pending list and runs exactly once when
/// the future resolves.
pub fn force(heap: &mut Heap, queue: &mut WorkQueue, future: FutureId, receiver: Receiver) {
    match heap.slot_mut(future) {
        FutureSlot::Resolved(value) => queue.push(receiver, value.clone()),
        FutureSlot::Pending(waiters) => waiters.push(receiver),
    }
}

/// Assign `value` to `future` and schedule every pending receiver.
///
/// Fails with [`InvariantViolation::DoubleResolve`] if the future already
/// holds a value; the stored value is left untouched.
pub fn resolve(
    heap: &mut Heap,
    queue: &mut WorkQueue,
    future: FutureId,
    value: Value,
) -> Result<(), InvariantViolation> {
    let slot = heap.slot_mut(future);
    match std::mem::replace(slot, FutureSlot::Resolved(value.clone())) {
        FutureSlot::Resolved(previous) => {
            *slot = FutureSlot::Resolved(previous);
            Err(InvariantViolation::DoubleResolve(future))
        }
        FutureSlot::Pending(waiters) => {
            tracing::trace!(%future, waiters = waiters.len(), "resolved");
            for receiver in waiters {
                queue.push(receiver, value.clone());
            }
            Ok(())
        }
    }
}
