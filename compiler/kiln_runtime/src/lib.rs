//! Kiln Runtime - continuation-passing evaluation core for the Kiln build runtime.
//!
//! Values are computed lazily. Every structured value lives in the [`Heap`]
//! as a [`Tuple`] of single-assignment [`FutureId`] slots. Computations that
//! need a value which is not there yet register a [`Receiver`] on its future
//! and hand control back to the [`Runtime`] loop instead of blocking.
//!
//! # Architecture
//!
//! - `Heap`: arena owning tuples, future slots and the constructor table
//! - `WorkQueue`: trampoline of ready `(Receiver, Value)` pairs, drained
//!   iteratively so native stack depth never tracks dependency depth
//! - `Inbox`: the one cross-thread boundary; external work (build jobs)
//!   fulfils a [`Promise`] and the runtime loop turns it into a resolution
//! - `prim`: primitive descriptors, the registry, and the
//!   validate-or-settle helpers every primitive is written with
//!
//! Failures are values. Arity, type, `require` and job failures resolve the
//! caller's completion to the canonical `Fail(Error(cause, stack))` shape;
//! only engine invariant violations panic.

mod binding;
mod failure;
mod future;
mod heap;
mod inbox;
mod logging;
pub mod prim;
mod queue;
mod receiver;
mod runtime;
mod stack;
mod tuple;
pub mod value;

pub use binding::Binding;
pub use failure::{Failure, FailureCause};
pub use future::{force, resolve, FutureId, FutureSlot, InvariantViolation};
pub use heap::{Heap, Reservation};
pub use inbox::{Inbox, InboxSender, Payload, Promise};
pub use logging::init_tracing;
pub use prim::{
    cast_data, cast_double, cast_integer, cast_list, cast_regexp, cast_string, cast_string_list,
    expect_args, make_bool, make_error, make_failure, make_list, make_order, make_pair,
    make_result, make_unit, require, Checked, Completion, PrimData, PrimDesc, PrimFlags, PrimFn,
    PrimRegistry, PrimType, RegistryError, Settled, SharedRegistry, Ty,
};
pub use queue::WorkQueue;
pub use receiver::{HostFn, Receiver};
pub use runtime::{RunStats, Runtime, RuntimeBuilder};
pub use stack::ensure_sufficient_stack;
pub use tuple::{ExprId, Tuple, TupleId, TupleMeta, TupleShape};
pub use value::{Constructor, ConstructorId, ConstructorTable, Shared, Value, ValueKind};
