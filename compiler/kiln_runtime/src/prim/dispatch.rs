//! Primitive dispatch: force the arguments, then call.
//!
//! Arguments are forced one at a time through the work queue. Unless the
//! primitive is `SHALLOW`, every future reachable from an argument tuple is
//! forced as well, so the primitive only ever sees fully resolved data.

use rustc_hash::FxHashSet;

use crate::binding::Binding;
use crate::failure::{Failure, FailureCause};
use crate::future::FutureId;
use crate::receiver::Receiver;
use crate::runtime::Runtime;
use crate::tuple::TupleId;
use crate::value::Value;

use super::check::Completion;
use super::desc::{PrimData, PrimDesc, PrimFn};
use super::make::make_failure;

/// A primitive call still collecting its arguments.
pub struct PendingCall {
    name: &'static str,
    func: PrimFn,
    data: PrimData,
    shallow: bool,
    binding: Binding,
    /// Direct arguments not yet forced, in call order.
    args: std::vec::IntoIter<FutureId>,
    values: Vec<Value>,
    /// Nested futures still to force (deep calls only).
    walk: Vec<FutureId>,
    visited: FxHashSet<TupleId>,
    /// The outstanding force is for a direct argument.
    awaiting_arg: bool,
    completion: Receiver,
}

impl PendingCall {
    fn new(desc: &PrimDesc, binding: Binding, args: Vec<FutureId>, completion: Receiver) -> Self {
        PendingCall {
            name: desc.name(),
            func: desc.func(),
            data: desc.data().clone(),
            shallow: desc.is_shallow(),
            binding,
            values: Vec::with_capacity(args.len()),
            args: args.into_iter(),
            walk: Vec::new(),
            visited: FxHashSet::default(),
            awaiting_arg: false,
            completion,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Receive the value of the future this call was waiting on.
    pub(crate) fn advance(mut self: Box<Self>, rt: &mut Runtime, value: Value) {
        let is_arg = self.awaiting_arg;
        self.absorb(rt, value, is_arg);
        self.step(rt);
    }

    fn absorb(&mut self, rt: &Runtime, value: Value, is_arg: bool) {
        if !self.shallow {
            if let Value::Tuple(id) = value {
                if self.visited.insert(id) {
                    self.walk.extend(rt.heap().tuple(id).fields());
                }
            }
        }
        if is_arg {
            self.values.push(value);
        }
    }

    /// Absorb everything already resolved; park on the first pending future
    /// or call the primitive once nothing is left.
    fn step(mut self: Box<Self>, rt: &mut Runtime) {
        loop {
            let (next, is_arg) = match self.args.next() {
                Some(arg) => (arg, true),
                None => match self.walk.pop() {
                    Some(nested) => (nested, false),
                    None => break,
                },
            };
            match rt.value(next).cloned() {
                Some(value) => self.absorb(rt, value, is_arg),
                None => {
                    self.awaiting_arg = is_arg;
                    rt.force(next, Receiver::Call(self));
                    return;
                }
            }
        }
        self.invoke(rt);
    }

    fn invoke(self: Box<Self>, rt: &mut Runtime) {
        let PendingCall {
            name,
            func,
            data,
            binding,
            values,
            completion,
            ..
        } = *self;
        tracing::trace!(prim = name, args = values.len(), "invoking primitive");
        let _settled = func(rt, Completion::new(completion, name), &binding, &values, &data);
    }
}

impl Runtime {
    /// Call `desc` with `args`, delivering its result to `completion`.
    ///
    /// A call with the wrong number of arguments fails without forcing any
    /// of them.
    #[tracing::instrument(level = "debug", skip_all, fields(prim = desc.name()))]
    pub fn call(
        &mut self,
        desc: &PrimDesc,
        binding: Binding,
        args: Vec<FutureId>,
        completion: Receiver,
    ) {
        let expected = desc.ty().arity();
        if args.len() != expected {
            let cause = FailureCause::Arity {
                prim: desc.name().to_string(),
                expected,
                got: args.len(),
            };
            let value = make_failure(self.heap_mut(), &Failure::new(cause, &binding));
            self.schedule(completion, value);
            return;
        }
        Box::new(PendingCall::new(desc, binding, args, completion)).step(self);
    }

    /// Call the registered primitive `name`.
    ///
    /// An unknown name fails the completion like any other call failure.
    pub fn call_named(
        &mut self,
        name: &str,
        binding: Binding,
        args: Vec<FutureId>,
        completion: Receiver,
    ) {
        let registry = self.registry().cloned();
        match registry.as_ref().and_then(|registry| registry.get(name)) {
            Some(desc) => self.call(desc, binding, args, completion),
            None => {
                let cause = FailureCause::Require {
                    prim: name.to_string(),
                    message: "no such primitive".to_string(),
                };
                let value = make_failure(self.heap_mut(), &Failure::new(cause, &binding));
                self.schedule(completion, value);
            }
        }
    }
}
