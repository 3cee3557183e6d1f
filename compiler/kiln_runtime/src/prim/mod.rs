//! Primitive calling convention.
//!
//! A primitive is a plain function:
//!
//! ```text
//! fn prim(rt: &mut Runtime, completion: Completion, binding: &Binding,
//!         args: &[Value], data: &PrimData) -> Settled
//! ```
//!
//! It must hand its completion off exactly once: resolve it with a result,
//! fail it, or delegate it to a future. [`Settled`] is the proof of that
//! hand-off and cannot be constructed outside this crate, so a primitive
//! that forgets its completion does not compile.
//!
//! Validation helpers either give the completion back (with the narrowed
//! argument) or consume it by resolving it to a failure:
//!
//! ```text
//! let completion = checked!(expect_args(rt, completion, binding, args, 2));
//! let (completion, a) = checked!(cast_integer(rt, completion, binding, args, 0));
//! ```

mod check;
mod desc;
mod dispatch;
mod make;
mod registry;

pub use check::{
    cast_data, cast_double, cast_integer, cast_list, cast_regexp, cast_string, cast_string_list,
    expect_args, require, Checked, Completion, Settled,
};
pub use desc::{PrimData, PrimDesc, PrimFlags, PrimFn, PrimType, Ty};
pub use dispatch::PendingCall;
pub use make::{
    make_bool, make_error, make_failure, make_list, make_order, make_pair, make_result,
    make_unit,
};
pub use registry::{PrimRegistry, RegistryError, SharedRegistry};

/// Unwrap a [`Checked`] value or return its [`Settled`] proof from the
/// enclosing primitive.
#[macro_export]
macro_rules! checked {
    ($e:expr) => {
        match $e {
            ::core::result::Result::Ok(value) => value,
            ::core::result::Result::Err(settled) => return settled,
        }
    };
}
