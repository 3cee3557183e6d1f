//! Regular expression primitives.

use regex::Regex;

use kiln_runtime::{
    cast_regexp, cast_string, checked, expect_args, make_result, Binding, Completion, Failure,
    FailureCause, PrimData, PrimFlags, PrimRegistry, PrimType, RegistryError, Runtime, Settled,
    Ty, Value,
};

pub fn register_regexp(registry: &mut PrimRegistry) -> Result<(), RegistryError> {
    let pure = PrimFlags::PURE;
    registry.register(
        "re2",
        prim_re2,
        PrimType::new(vec![Ty::String], Ty::result(Ty::RegExp)),
        pure,
        PrimData::none(),
    )?;
    registry.register(
        "match",
        prim_match,
        PrimType::new(vec![Ty::RegExp, Ty::String], Ty::Bool),
        pure,
        PrimData::none(),
    )?;
    registry.register(
        "quote",
        prim_quote,
        PrimType::new(vec![Ty::String], Ty::String),
        pure,
        PrimData::none(),
    )?;
    Ok(())
}

/// Compile a pattern. A malformed pattern is a `Fail` carrying the parser
/// message.
fn prim_re2(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 1));
    let (completion, pattern) = checked!(cast_string(rt, completion, binding, args, 0));
    match Regex::new(pattern) {
        Ok(re) => {
            let result = make_result(rt.heap_mut(), true, Value::regexp(re));
            completion.resolve(rt, result)
        }
        Err(e) => {
            let cause = FailureCause::Require {
                prim: completion.name().to_string(),
                message: e.to_string(),
            };
            completion.fail(rt, Failure::new(cause, binding))
        }
    }
}

/// True if the expression matches anywhere in the string.
fn prim_match(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 2));
    let (completion, re) = checked!(cast_regexp(rt, completion, binding, args, 0));
    let (completion, s) = checked!(cast_string(rt, completion, binding, args, 1));
    completion.resolve(rt, Value::Bool(re.is_match(s)))
}

/// Escape every metacharacter so the string matches itself literally.
fn prim_quote(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 1));
    let (completion, s) = checked!(cast_string(rt, completion, binding, args, 0));
    completion.resolve(rt, Value::string(regex::escape(s)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::test_helpers::{eval, failure_cause, passed};

    use super::*;

    fn compiled(pattern: &str) -> Value {
        Value::regexp(Regex::new(pattern).unwrap_or_else(|e| panic!("{e}")))
    }

    #[test]
    fn test_re2_passes_compiled_expression() {
        let (rt, v) = eval("re2", |_| vec![Value::string("a+b")]);
        let re = passed(&rt, &v);
        assert_eq!(re.as_regexp().map(Regex::as_str), Some("a+b"));
    }

    #[test]
    fn test_re2_malformed_pattern_fails() {
        let (rt, v) = eval("re2", |_| vec![Value::string("(")]);
        assert!(failure_cause(&rt, &v).starts_with("re2: "));
    }

    #[test]
    fn test_match() {
        let (_, v) = eval("match", |_| vec![compiled(r"\.c$"), Value::string("main.c")]);
        assert_eq!(v, Value::Bool(true));
        let (_, v) = eval("match", |_| vec![compiled(r"\.c$"), Value::string("main.h")]);
        assert_eq!(v, Value::Bool(false));
    }

    #[test]
    fn test_quote_matches_literally() {
        let (_, v) = eval("quote", |_| vec![Value::string("a.b*")]);
        let quoted = v.as_str().map(str::to_string).unwrap_or_default();
        assert_eq!(quoted, r"a\.b\*");
        let (_, v) = eval("match", |_| vec![compiled(&quoted), Value::string("axb*")]);
        assert_eq!(v, Value::Bool(false));
    }
}
