//! Continuations.
//!
//! A receiver is owned by exactly one place at a time: a future's pending
//! list or the work queue. Running it consumes it, so it fires once.

use std::fmt;

use crate::future::FutureId;
use crate::prim::PendingCall;
use crate::runtime::Runtime;
use crate::value::Value;

/// Continuation supplied by the host (the front-end evaluator).
pub type HostFn = Box<dyn FnOnce(&mut Runtime, Value)>;

/// What to do with a value once it is available.
pub enum Receiver {
    /// Resolve another future with the value.
    Fill(FutureId),
    /// Drop the value.
    Discard,
    /// A primitive call collecting its arguments.
    Call(Box<PendingCall>),
    /// Evaluator-defined continuation.
    Host(HostFn),
}

impl Receiver {
    /// Wrap a host closure.
    pub fn host(f: impl FnOnce(&mut Runtime, Value) + 'static) -> Self {
        Receiver::Host(Box::new(f))
    }

    pub(crate) fn run(self, rt: &mut Runtime, value: Value) {
        match self {
            Receiver::Fill(target) => rt.resolve(target, value),
            Receiver::Discard => {}
            Receiver::Call(call) => call.advance(rt, value),
            Receiver::Host(f) => f(rt, value),
        }
    }
}

impl fmt::Debug for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Receiver::Fill(target) => write!(f, "Fill({target})"),
            Receiver::Discard => write!(f, "Discard"),
            Receiver::Call(call) => write!(f, "Call({})", call.name()),
            Receiver::Host(_) => write!(f, "Host"),
        }
    }
}
