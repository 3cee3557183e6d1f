//! String primitives.

use kiln_runtime::{
    cast_string, cast_string_list, checked, expect_args, make_list, make_order, Binding,
    Completion, PrimData, PrimFlags, PrimRegistry, PrimType, RegistryError, Runtime, Settled, Ty,
    Value,
};

pub fn register_string(registry: &mut PrimRegistry, version: &str) -> Result<(), RegistryError> {
    let pure = PrimFlags::PURE;
    registry.register(
        "strlen",
        prim_strlen,
        PrimType::new(vec![Ty::String], Ty::Integer),
        pure,
        PrimData::none(),
    )?;
    registry.register(
        "cat",
        prim_cat,
        PrimType::new(vec![Ty::list(Ty::String)], Ty::String),
        pure,
        PrimData::none(),
    )?;
    registry.register(
        "explode",
        prim_explode,
        PrimType::new(vec![Ty::String], Ty::list(Ty::String)),
        pure,
        PrimData::none(),
    )?;
    registry.register(
        "version",
        prim_version,
        PrimType::new(vec![Ty::Unit], Ty::String),
        pure,
        PrimData::new(version.to_string()),
    )?;
    registry.register(
        "scmp",
        prim_scmp,
        PrimType::new(vec![Ty::String, Ty::String], Ty::Order),
        pure,
        PrimData::none(),
    )?;
    Ok(())
}

/// Length in bytes.
fn prim_strlen(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 1));
    let (completion, s) = checked!(cast_string(rt, completion, binding, args, 0));
    completion.resolve(rt, Value::integer(s.len()))
}

fn prim_cat(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 1));
    let (completion, parts) = checked!(cast_string_list(rt, completion, binding, args, 0));
    completion.resolve(rt, Value::string(parts.concat()))
}

/// One string per Unicode scalar value.
fn prim_explode(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 1));
    let (completion, s) = checked!(cast_string(rt, completion, binding, args, 0));
    let chars = s.chars().map(|c| Value::string(c.to_string())).collect();
    let list = make_list(rt.heap_mut(), chars);
    completion.resolve(rt, list)
}

fn prim_version(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 1));
    let version = data.downcast::<String>().map_or("unknown", String::as_str);
    completion.resolve(rt, Value::string(version))
}

/// Byte-wise comparison.
fn prim_scmp(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 2));
    let (completion, a) = checked!(cast_string(rt, completion, binding, args, 0));
    let (completion, b) = checked!(cast_string(rt, completion, binding, args, 1));
    let order = make_order(rt.heap_mut(), a.cmp(b));
    completion.resolve(rt, order)
}
