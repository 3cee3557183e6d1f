//! The evaluator state and its run loop.
//!
//! `Runtime` owns the heap, the work queue and the inbox. Everything that
//! touches futures runs on the thread that owns the runtime; other threads
//! only reach it through [`InboxSender`] promises.

use crate::future::{self, FutureId, InvariantViolation};
use crate::heap::Heap;
use crate::inbox::{Delivery, Inbox, InboxSender, Payload};
use crate::prim::{make_failure, make_result, SharedRegistry};
use crate::queue::WorkQueue;
use crate::receiver::Receiver;
use crate::value::Value;

/// Counters from one call to [`Runtime::run`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Receivers executed.
    pub executed: usize,
    /// Inbox deliveries turned into resolutions.
    pub delivered: usize,
}

/// Builder for [`Runtime`].
#[derive(Debug, Default)]
pub struct RuntimeBuilder {
    tuples: usize,
    futures: usize,
    registry: Option<SharedRegistry>,
    inbox: Option<Inbox>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size the heap.
    #[must_use]
    pub fn heap_capacity(mut self, tuples: usize, futures: usize) -> Self {
        self.tuples = tuples;
        self.futures = futures;
        self
    }

    /// Primitives available to [`Runtime::call_named`].
    #[must_use]
    pub fn registry(mut self, registry: SharedRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use an inbox created ahead of the runtime, for hosts that hand out
    /// its sender before the runtime exists.
    #[must_use]
    pub fn inbox(mut self, inbox: Inbox) -> Self {
        self.inbox = Some(inbox);
        self
    }

    pub fn build(self) -> Runtime {
        Runtime {
            heap: Heap::with_capacity(self.tuples, self.futures),
            queue: WorkQueue::new(),
            inbox: self.inbox.unwrap_or_default(),
            registry: self.registry,
        }
    }
}

/// Evaluator state: heap, ready queue and completion inbox.
pub struct Runtime {
    heap: Heap,
    queue: WorkQueue,
    inbox: Inbox,
    registry: Option<SharedRegistry>,
}

impl Runtime {
    pub fn new() -> Self {
        RuntimeBuilder::new().build()
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn registry(&self) -> Option<&SharedRegistry> {
        self.registry.as_ref()
    }

    /// Handle for issuing promises from other threads.
    pub fn inbox_sender(&self) -> InboxSender {
        self.inbox.sender()
    }

    /// Promises not yet delivered.
    pub fn outstanding(&self) -> usize {
        self.inbox.outstanding()
    }

    /// Number of ready pairs waiting to run.
    pub fn ready(&self) -> usize {
        self.queue.len()
    }

    /// Allocate a fresh pending future.
    pub fn future(&mut self) -> FutureId {
        self.heap.alloc_future()
    }

    /// Allocate a future that is already resolved.
    pub fn resolved(&mut self, value: Value) -> FutureId {
        let id = self.heap.alloc_future();
        self.resolve(id, value);
        id
    }

    /// The value of `future`, if resolved.
    pub fn value(&self, future: FutureId) -> Option<&Value> {
        self.heap.value(future)
    }

    /// Register `receiver` to run once `future` has a value.
    pub fn force(&mut self, future: FutureId, receiver: Receiver) {
        future::force(&mut self.heap, &mut self.queue, future, receiver);
    }

    /// Resolve `future`.
    ///
    /// # Panics
    ///
    /// Panics if the future is already resolved; that is an engine bug.
    pub fn resolve(&mut self, future: FutureId, value: Value) {
        if let Err(violation) = self.try_resolve(future, value) {
            panic!("invariant violation: {violation}");
        }
    }

    /// Resolve `future`, reporting a double resolution instead of panicking.
    pub fn try_resolve(
        &mut self,
        future: FutureId,
        value: Value,
    ) -> Result<(), InvariantViolation> {
        future::resolve(&mut self.heap, &mut self.queue, future, value)
    }

    /// Queue `receiver` to run with `value`.
    pub fn schedule(&mut self, receiver: Receiver, value: Value) {
        self.queue.push(receiver, value);
    }

    /// Run until no work is ready and no promise is outstanding.
    ///
    /// Blocks on the inbox while promises are outstanding and nothing else
    /// can make progress.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn run(&mut self) -> RunStats {
        self.drive(true)
    }

    /// Run until no work is ready, without waiting for outstanding promises.
    pub fn run_until_idle(&mut self) -> RunStats {
        self.drive(false)
    }

    fn drive(&mut self, wait: bool) -> RunStats {
        let mut stats = RunStats::default();
        loop {
            while let Some((receiver, value)) = self.queue.pop() {
                stats.executed += 1;
                receiver.run(self, value);
            }
            if let Some(delivery) = self.inbox.try_next() {
                stats.delivered += 1;
                self.deliver(delivery);
                continue;
            }
            if !wait || self.inbox.outstanding() == 0 {
                break;
            }
            tracing::trace!(outstanding = self.inbox.outstanding(), "waiting on inbox");
            match self.inbox.next_blocking() {
                Some(delivery) => {
                    stats.delivered += 1;
                    self.deliver(delivery);
                }
                None => break,
            }
        }
        tracing::debug!(
            executed = stats.executed,
            delivered = stats.delivered,
            "run loop quiescent"
        );
        stats
    }

    fn deliver(&mut self, delivery: Delivery) {
        let Delivery { target, payload } = delivery;
        let value = match payload {
            Payload::Value(value) => value,
            Payload::Pass(value) => make_result(&mut self.heap, true, value),
            Payload::Fail(failure) => make_failure(&mut self.heap, &failure),
        };
        self.resolve(target, value);
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
