//! Completions and the validate-or-settle helpers.

use std::fmt;

use num_bigint::BigInt;
use regex::Regex;

use crate::binding::Binding;
use crate::failure::{Failure, FailureCause};
use crate::future::FutureId;
use crate::receiver::Receiver;
use crate::runtime::Runtime;
use crate::value::{ConstructorId, Value, ValueKind};

use super::make::make_failure;

/// Proof that a completion has been handed off.
///
/// Only this crate can create one, and only by consuming a [`Completion`].
#[must_use = "a primitive must return the proof that its completion was settled"]
#[derive(Debug)]
pub struct Settled(());

/// Outcome of a validation helper: the value to continue with, or the proof
/// that the completion was already resolved to a failure.
pub type Checked<T> = Result<T, Settled>;

/// "What to do with my result", owned by a primitive for one call.
pub struct Completion {
    receiver: Receiver,
    prim: &'static str,
}

impl Completion {
    /// Completion for a call of the primitive named `prim`.
    pub fn new(receiver: Receiver, prim: &'static str) -> Self {
        Completion { receiver, prim }
    }

    /// Name of the primitive this completion belongs to.
    pub fn name(&self) -> &'static str {
        self.prim
    }

    /// Deliver the result. Runs later, from the work queue.
    pub fn resolve(self, rt: &mut Runtime, value: Value) -> Settled {
        rt.schedule(self.receiver, value);
        Settled(())
    }

    /// Deliver `Fail(Error(..))` for `failure`.
    pub fn fail(self, rt: &mut Runtime, failure: Failure) -> Settled {
        tracing::debug!(prim = self.prim, cause = %failure.cause, "primitive failed");
        let value = make_failure(rt.heap_mut(), &failure);
        self.resolve(rt, value)
    }

    /// Hand the completion to `future`: it receives that future's value.
    pub fn await_future(self, rt: &mut Runtime, future: FutureId) -> Settled {
        rt.force(future, self.receiver);
        Settled(())
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("prim", &self.prim)
            .field("receiver", &self.receiver)
            .finish()
    }
}

/// Check that exactly `expected` arguments were passed.
pub fn expect_args(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    expected: usize,
) -> Checked<Completion> {
    if args.len() == expected {
        return Ok(completion);
    }
    let cause = FailureCause::Arity {
        prim: completion.name().to_string(),
        expected,
        got: args.len(),
    };
    Err(completion.fail(rt, Failure::new(cause, binding)))
}

/// Generic precondition: fail with `message` unless `ok`.
pub fn require(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    ok: bool,
    message: impl Into<String>,
) -> Checked<Completion> {
    if ok {
        return Ok(completion);
    }
    let cause = FailureCause::Require {
        prim: completion.name().to_string(),
        message: message.into(),
    };
    Err(completion.fail(rt, Failure::new(cause, binding)))
}

fn cast<'a, T: ?Sized>(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &'a [Value],
    index: usize,
    expected: ValueKind,
    narrow: impl FnOnce(&'a Value) -> Option<&'a T>,
) -> Checked<(Completion, &'a T)> {
    let Some(value) = args.get(index) else {
        let cause = FailureCause::Arity {
            prim: completion.name().to_string(),
            expected: index + 1,
            got: args.len(),
        };
        return Err(completion.fail(rt, Failure::new(cause, binding)));
    };
    match narrow(value) {
        Some(narrowed) => Ok((completion, narrowed)),
        None => {
            let cause = FailureCause::Type {
                prim: completion.name().to_string(),
                position: index,
                expected,
                got: value.kind(),
            };
            Err(completion.fail(rt, Failure::new(cause, binding)))
        }
    }
}

/// Narrow argument `index` to a string.
pub fn cast_string<'a>(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &'a [Value],
    index: usize,
) -> Checked<(Completion, &'a str)> {
    cast(rt, completion, binding, args, index, ValueKind::String, Value::as_str)
}

/// Narrow argument `index` to an integer.
pub fn cast_integer<'a>(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &'a [Value],
    index: usize,
) -> Checked<(Completion, &'a BigInt)> {
    cast(rt, completion, binding, args, index, ValueKind::Integer, Value::as_integer)
}

/// Narrow argument `index` to a double.
pub fn cast_double<'a>(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &'a [Value],
    index: usize,
) -> Checked<(Completion, &'a f64)> {
    cast(rt, completion, binding, args, index, ValueKind::Double, Value::as_double)
}

/// Narrow argument `index` to a regular expression.
pub fn cast_regexp<'a>(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &'a [Value],
    index: usize,
) -> Checked<(Completion, &'a Regex)> {
    cast(rt, completion, binding, args, index, ValueKind::RegExp, Value::as_regexp)
}

/// Narrow argument `index` to opaque data.
pub fn cast_data<'a>(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &'a [Value],
    index: usize,
) -> Checked<(Completion, &'a [u8])> {
    cast(rt, completion, binding, args, index, ValueKind::Data, Value::as_data)
}

/// Read argument `index` as a fully resolved list.
///
/// Fails with a type error unless the argument is a `Nil` or `Cons` tuple,
/// and with a `require` failure if the list is cyclic or part of it is
/// still unresolved (the primitive should have been registered without
/// `SHALLOW`).
pub fn cast_list(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    index: usize,
) -> Checked<(Completion, Vec<Value>)> {
    let is_list = args.get(index).is_some_and(|value| {
        rt.heap()
            .constructor_of(value)
            .is_some_and(|ctor| ctor == ConstructorId::NIL || ctor == ConstructorId::CONS)
    });
    let (completion, value) =
        cast(rt, completion, binding, args, index, ValueKind::List, |v| is_list.then_some(v))?;
    let items = rt.heap().read_list(value);
    let completion = require(
        rt,
        completion,
        binding,
        items.is_some(),
        format!("argument {index} is cyclic or not fully evaluated"),
    )?;
    Ok((completion, items.unwrap_or_default()))
}

/// Read argument `index` as a fully resolved list of strings.
pub fn cast_string_list(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    index: usize,
) -> Checked<(Completion, Vec<String>)> {
    let (completion, items) = cast_list(rt, completion, binding, args, index)?;
    let strings: Option<Vec<String>> = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect();
    let completion = require(
        rt,
        completion,
        binding,
        strings.is_some(),
        format!("argument {index} expected List String"),
    )?;
    Ok((completion, strings.unwrap_or_default()))
}
