//! Arbitrary-precision integer primitives.

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use kiln_runtime::{
    cast_integer, checked, expect_args, make_order, require, Binding, Completion, PrimData,
    PrimFlags, PrimRegistry, PrimType, RegistryError, Runtime, Settled, Ty, Value,
};

pub fn register_integer(registry: &mut PrimRegistry) -> Result<(), RegistryError> {
    let binary = || PrimType::new(vec![Ty::Integer, Ty::Integer], Ty::Integer);
    let pure = PrimFlags::PURE;
    registry.register("iadd", prim_iadd, binary(), pure, PrimData::none())?;
    registry.register("isub", prim_isub, binary(), pure, PrimData::none())?;
    registry.register("imul", prim_imul, binary(), pure, PrimData::none())?;
    registry.register("idiv", prim_idiv, binary(), pure, PrimData::none())?;
    registry.register(
        "icmp",
        prim_icmp,
        PrimType::new(vec![Ty::Integer, Ty::Integer], Ty::Order),
        pure,
        PrimData::none(),
    )?;
    registry.register(
        "istr",
        prim_istr,
        PrimType::new(vec![Ty::Integer, Ty::Integer], Ty::String),
        pure,
        PrimData::none(),
    )?;
    Ok(())
}

fn binary_op(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    op: impl FnOnce(&BigInt, &BigInt) -> BigInt,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 2));
    let (completion, a) = checked!(cast_integer(rt, completion, binding, args, 0));
    let (completion, b) = checked!(cast_integer(rt, completion, binding, args, 1));
    completion.resolve(rt, Value::integer(op(a, b)))
}

fn prim_iadd(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    binary_op(rt, completion, binding, args, |a, b| a + b)
}

fn prim_isub(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    binary_op(rt, completion, binding, args, |a, b| a - b)
}

fn prim_imul(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    binary_op(rt, completion, binding, args, |a, b| a * b)
}

/// Truncating division.
fn prim_idiv(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 2));
    let (completion, a) = checked!(cast_integer(rt, completion, binding, args, 0));
    let (completion, b) = checked!(cast_integer(rt, completion, binding, args, 1));
    let completion = checked!(require(rt, completion, binding, !b.is_zero(), "division by zero"));
    completion.resolve(rt, Value::integer(a / b))
}

fn prim_icmp(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 2));
    let (completion, a) = checked!(cast_integer(rt, completion, binding, args, 0));
    let (completion, b) = checked!(cast_integer(rt, completion, binding, args, 1));
    let order = make_order(rt.heap_mut(), a.cmp(b));
    completion.resolve(rt, order)
}

/// `istr base n`: `n` written in `base` (2 to 36), lower-case digits.
fn prim_istr(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 2));
    let (completion, base) = checked!(cast_integer(rt, completion, binding, args, 0));
    let (completion, n) = checked!(cast_integer(rt, completion, binding, args, 1));
    let radix = base.to_u32().filter(|r| (2..=36).contains(r));
    let completion = checked!(require(
        rt,
        completion,
        binding,
        radix.is_some(),
        format!("base {base} out of range"),
    ));
    let text = n.to_str_radix(radix.unwrap_or(10));
    completion.resolve(rt, Value::string(text))
}
