//! JSON encoding primitives.

use num_traits::ToPrimitive;
use rustc_hash::FxHashSet;
use serde_json::{Number, Value as Json};

use kiln_runtime::{
    cast_string, checked, ensure_sufficient_stack, expect_args, make_result, Binding, Completion,
    ConstructorId, Failure, FailureCause, Heap, PrimData, PrimFlags, PrimRegistry, PrimType,
    RegistryError, Runtime, Settled, TupleId, Ty, Value,
};

pub fn register_json(registry: &mut PrimRegistry) -> Result<(), RegistryError> {
    let pure = PrimFlags::PURE;
    registry.register(
        "json_str",
        prim_json_str,
        PrimType::new(vec![Ty::String], Ty::String),
        pure,
        PrimData::none(),
    )?;
    registry.register(
        "json_format",
        prim_json_format,
        PrimType::new(vec![Ty::Var('a')], Ty::result(Ty::String)),
        pure,
        PrimData::none(),
    )?;
    Ok(())
}

/// Quote a string as a JSON string literal.
fn prim_json_str(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 1));
    let (completion, s) = checked!(cast_string(rt, completion, binding, args, 0));
    completion.resolve(rt, Value::string(Json::from(s).to_string()))
}

/// Encode a resolved value as compact JSON.
///
/// Lists become arrays, pairs two-element arrays, `Unit` is `null`.
/// Integers outside the 64-bit range, non-finite doubles, values that
/// contain themselves and any other structured value are rejected.
fn prim_json_format(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 1));
    match encode(rt.heap(), &args[0], &mut FxHashSet::default()) {
        Ok(json) => {
            let result = make_result(rt.heap_mut(), true, Value::string(json.to_string()));
            completion.resolve(rt, result)
        }
        Err(message) => {
            let cause = FailureCause::Require {
                prim: completion.name().to_string(),
                message,
            };
            completion.fail(rt, Failure::new(cause, binding))
        }
    }
}

/// `path` holds the tuples currently being encoded.
fn encode(heap: &Heap, value: &Value, path: &mut FxHashSet<TupleId>) -> Result<Json, String> {
    ensure_sufficient_stack(|| match value {
        Value::Unit => Ok(Json::Null),
        Value::Bool(b) => Ok(Json::Bool(*b)),
        Value::Integer(n) => n
            .to_i64()
            .map(Json::from)
            .or_else(|| n.to_u64().map(Json::from))
            .ok_or_else(|| format!("integer {n} does not fit in JSON")),
        Value::Double(d) => Number::from_f64(*d)
            .map(Json::Number)
            .ok_or_else(|| format!("{d} is not a finite number")),
        Value::String(s) => Ok(Json::String(s.to_string())),
        Value::Tuple(id) => {
            if !path.insert(*id) {
                return Err(format!("cannot encode cyclic value {}", heap.render(value)));
            }
            let json = encode_tuple(heap, value, path);
            path.remove(id);
            json
        }
        other => Err(format!("cannot encode {}", other.kind())),
    })
}

fn encode_tuple(
    heap: &Heap,
    value: &Value,
    path: &mut FxHashSet<TupleId>,
) -> Result<Json, String> {
    if let Some(items) = heap.read_list(value) {
        return items
            .iter()
            .map(|item| encode(heap, item, path))
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array);
    }
    if heap.constructor_of(value) == Some(ConstructorId::PAIR) {
        if let Some((first, second)) = heap.read_pair(value) {
            let first = encode(heap, &first, path)?;
            let second = encode(heap, &second, path)?;
            return Ok(Json::Array(vec![first, second]));
        }
    }
    Err(format!("cannot encode {}", heap.render(value)))
}

#[cfg(test)]
mod tests {
    use kiln_runtime::{make_list, make_pair, TupleMeta};
    use num_bigint::BigInt;
    use pretty_assertions::assert_eq;

    use crate::test_helpers::{eval, failure_cause, passed};

    use super::*;

    #[test]
    fn test_json_str_escapes() {
        let (_, v) = eval("json_str", |_| vec![Value::string("a\"b\n")]);
        assert_eq!(v, Value::string(r#""a\"b\n""#));
    }

    #[test]
    fn test_json_format_nested() {
        let (rt, v) = eval("json_format", |rt| {
            let pair = make_pair(rt.heap_mut(), Value::string("k"), Value::Bool(true));
            let items = vec![Value::integer(1), Value::double(0.5), Value::Unit, pair];
            vec![make_list(rt.heap_mut(), items)]
        });
        assert_eq!(passed(&rt, &v), Value::string(r#"[1,0.5,null,["k",true]]"#));
    }

    #[test]
    fn test_json_format_rejects_huge_integer() {
        let huge = BigInt::from(u64::MAX) * 4;
        let (rt, v) = eval("json_format", |_| vec![Value::integer(huge)]);
        assert_eq!(
            failure_cause(&rt, &v),
            "json_format: integer 73786976294838206460 does not fit in JSON"
        );
    }

    #[test]
    fn test_json_format_rejects_cycles() {
        let (rt, v) = eval("json_format", |rt| {
            let pair = rt
                .heap_mut()
                .alloc(TupleMeta::Constructor(ConstructorId::PAIR), 2);
            let first = rt.heap().tuple(pair).field(0);
            let second = rt.heap().tuple(pair).field(1);
            rt.resolve(first, Value::Tuple(pair));
            rt.resolve(second, Value::integer(1));
            vec![Value::Tuple(pair)]
        });
        assert_eq!(
            failure_cause(&rt, &v),
            "json_format: cannot encode cyclic value Pair(<cycle>, 1)"
        );
    }

    #[test]
    fn test_json_format_rejects_data() {
        let (rt, v) = eval("json_format", |_| vec![Value::data(vec![1u8])]);
        assert_eq!(failure_cause(&rt, &v), "json_format: cannot encode Data");
    }
}
