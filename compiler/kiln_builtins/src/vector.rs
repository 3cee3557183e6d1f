//! Sequence primitives over lists.

use num_traits::ToPrimitive;

use kiln_runtime::{
    cast_integer, cast_list, checked, expect_args, make_list, make_result, require, Binding,
    Completion, PrimData, PrimFlags, PrimRegistry, PrimType, RegistryError, Runtime, Settled, Ty,
    Value,
};

pub fn register_vector(registry: &mut PrimRegistry) -> Result<(), RegistryError> {
    let list = || Ty::list(Ty::Var('a'));
    let pure = PrimFlags::PURE;
    registry.register(
        "vlen",
        prim_vlen,
        PrimType::new(vec![list()], Ty::Integer),
        pure,
        PrimData::none(),
    )?;
    registry.register(
        "vget",
        prim_vget,
        PrimType::new(vec![list(), Ty::Integer], Ty::result(Ty::Var('a'))),
        pure,
        PrimData::none(),
    )?;
    registry.register(
        "vrev",
        prim_vrev,
        PrimType::new(vec![list()], list()),
        pure,
        PrimData::none(),
    )?;
    Ok(())
}

fn prim_vlen(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 1));
    let (completion, items) = checked!(cast_list(rt, completion, binding, args, 0));
    completion.resolve(rt, Value::integer(items.len()))
}

/// Zero-based element access.
fn prim_vget(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 2));
    let (completion, mut items) = checked!(cast_list(rt, completion, binding, args, 0));
    let (completion, index) = checked!(cast_integer(rt, completion, binding, args, 1));
    let slot = index.to_usize().filter(|&i| i < items.len());
    let completion = checked!(require(
        rt,
        completion,
        binding,
        slot.is_some(),
        format!("index {index} out of bounds for length {}", items.len()),
    ));
    let item = slot.map_or(Value::Unit, |i| items.swap_remove(i));
    let result = make_result(rt.heap_mut(), true, item);
    completion.resolve(rt, result)
}

fn prim_vrev(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 1));
    let (completion, mut items) = checked!(cast_list(rt, completion, binding, args, 0));
    items.reverse();
    let list = make_list(rt.heap_mut(), items);
    completion.resolve(rt, list)
}
