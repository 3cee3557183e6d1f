//! Double-precision float primitives.

use kiln_runtime::{
    cast_double, checked, expect_args, make_order, Binding, Completion, Failure, FailureCause,
    PrimData, PrimFlags, PrimRegistry, PrimType, RegistryError, Runtime, Settled, Ty, Value,
};

pub fn register_double(registry: &mut PrimRegistry) -> Result<(), RegistryError> {
    let binary = || PrimType::new(vec![Ty::Double, Ty::Double], Ty::Double);
    let pure = PrimFlags::PURE;
    registry.register("dadd", prim_dadd, binary(), pure, PrimData::none())?;
    registry.register("dmul", prim_dmul, binary(), pure, PrimData::none())?;
    registry.register(
        "dcmp",
        prim_dcmp,
        PrimType::new(vec![Ty::Double, Ty::Double], Ty::Order),
        pure,
        PrimData::none(),
    )?;
    registry.register(
        "dstr",
        prim_dstr,
        PrimType::new(vec![Ty::Double], Ty::String),
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
    op: fn(f64, f64) -> f64,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 2));
    let (completion, a) = checked!(cast_double(rt, completion, binding, args, 0));
    let (completion, b) = checked!(cast_double(rt, completion, binding, args, 1));
    completion.resolve(rt, Value::double(op(*a, *b)))
}

fn prim_dadd(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    binary_op(rt, completion, binding, args, |a, b| a + b)
}

fn prim_dmul(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    binary_op(rt, completion, binding, args, |a, b| a * b)
}

/// Fails if either side is NaN.
fn prim_dcmp(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 2));
    let (completion, a) = checked!(cast_double(rt, completion, binding, args, 0));
    let (completion, b) = checked!(cast_double(rt, completion, binding, args, 1));
    let Some(ordering) = a.partial_cmp(b) else {
        let cause = FailureCause::Require {
            prim: completion.name().to_string(),
            message: "comparison with NaN".to_string(),
        };
        return completion.fail(rt, Failure::new(cause, binding));
    };
    let order = make_order(rt.heap_mut(), ordering);
    completion.resolve(rt, order)
}

/// Shortest text that reads back as the same double.
fn prim_dstr(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 1));
    let (completion, d) = checked!(cast_double(rt, completion, binding, args, 0));
    completion.resolve(rt, Value::string(format!("{d:?}")))
}
