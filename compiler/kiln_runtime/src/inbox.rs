//! The cross-thread completion boundary.
//!
//! Work that runs off the evaluator thread (build jobs) is given a
//! [`Promise`] for a future. Fulfilling the promise sends a delivery down a
//! channel that `Runtime::run` drains; the evaluator thread alone turns
//! deliveries into resolutions. This channel is the only shared mutable
//! state between job threads and evaluation.
//!
//! The inbox counts live promises. While any are outstanding the run loop
//! may block waiting for them. A promise dropped without being fulfilled
//! delivers an `Abandoned` failure, so no waiter hangs forever.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam::channel::{self, Receiver as ChannelReceiver, Sender, TryRecvError};

use crate::failure::{Failure, FailureCause};
use crate::future::FutureId;
use crate::value::Value;

/// Result carried by a delivery.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// Resolve to this exact value.
    Value(Value),
    /// Resolve to `Pass(value)`.
    Pass(Value),
    /// Resolve to `Fail(Error(..))`.
    Fail(Failure),
}

#[derive(Debug)]
pub(crate) struct Delivery {
    pub(crate) target: FutureId,
    pub(crate) payload: Payload,
}

/// Evaluator-side end of the completion channel.
pub struct Inbox {
    tx: Sender<Delivery>,
    rx: ChannelReceiver<Delivery>,
    outstanding: Arc<AtomicUsize>,
}

impl Inbox {
    pub fn new() -> Self {
        let (tx, rx) = channel::unbounded();
        Inbox {
            tx,
            rx,
            outstanding: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A `Send` handle for issuing promises.
    pub fn sender(&self) -> InboxSender {
        InboxSender {
            tx: self.tx.clone(),
            outstanding: Arc::clone(&self.outstanding),
        }
    }

    /// Promises issued but not yet received by the evaluator.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    pub(crate) fn try_next(&self) -> Option<Delivery> {
        match self.rx.try_recv() {
            Ok(delivery) => Some(self.received(delivery)),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Block until a delivery arrives. Only call with promises outstanding.
    pub(crate) fn next_blocking(&self) -> Option<Delivery> {
        self.rx.recv().ok().map(|delivery| self.received(delivery))
    }

    // The count drops on receipt, not on send, so `outstanding() == 0` with
    // an empty channel really means nothing is in flight.
    fn received(&self, delivery: Delivery) -> Delivery {
        self.outstanding.fetch_sub(1, Ordering::AcqRel);
        delivery
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Inbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inbox")
            .field("outstanding", &self.outstanding())
            .field("queued", &self.rx.len())
            .finish()
    }
}

/// Thread-safe handle for creating promises.
#[derive(Clone)]
pub struct InboxSender {
    tx: Sender<Delivery>,
    outstanding: Arc<AtomicUsize>,
}

impl InboxSender {
    /// Promise to deliver exactly one result for `target`.
    pub fn promise(&self, target: FutureId) -> Promise {
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        Promise {
            target,
            tx: Some(self.tx.clone()),
        }
    }
}

impl fmt::Debug for InboxSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboxSender").finish_non_exhaustive()
    }
}

/// Obligation to resolve one future from another thread.
///
/// Consumed by [`Promise::fulfil`]; dropping it unfulfilled delivers an
/// `Abandoned` failure instead.
#[must_use = "a dropped promise resolves its future to an abandoned failure"]
pub struct Promise {
    target: FutureId,
    tx: Option<Sender<Delivery>>,
}

impl Promise {
    pub fn target(&self) -> FutureId {
        self.target
    }

    /// Deliver the result.
    pub fn fulfil(mut self, payload: Payload) {
        self.send(payload);
    }

    fn send(&mut self, payload: Payload) {
        if let Some(tx) = self.tx.take() {
            // The receiving end lives as long as the runtime; if it is gone
            // there is nobody left to tell.
            let _ = tx.send(Delivery {
                target: self.target,
                payload,
            });
        }
    }
}

impl Drop for Promise {
    fn drop(&mut self) {
        if self.tx.is_some() {
            tracing::debug!(future = %self.target, "promise dropped unfulfilled");
            let cause = FailureCause::Abandoned(self.target.to_string());
            self.send(Payload::Fail(Failure::with_stack(cause, Vec::new())));
        }
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("target", &self.target)
            .field("fulfilled", &self.tx.is_none())
            .finish()
    }
}
