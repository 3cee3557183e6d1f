//! Explicitly raised failures.

use kiln_runtime::{
    cast_string, checked, expect_args, Binding, Completion, Failure, FailureCause, PrimData,
    PrimFlags, PrimRegistry, PrimType, RegistryError, Runtime, Settled, Ty, Value,
};

pub fn register_exception(registry: &mut PrimRegistry) -> Result<(), RegistryError> {
    registry.register(
        "raise",
        prim_raise,
        PrimType::new(vec![Ty::String], Ty::Var('a')),
        PrimFlags::empty(),
        PrimData::none(),
    )
}

/// `raise message`: always `Fail`, attributed to the calling binding.
fn prim_raise(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    _data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 1));
    let (completion, message) = checked!(cast_string(rt, completion, binding, args, 0));
    let failure = Failure::new(FailureCause::Raised(message.to_string()), binding);
    completion.fail(rt, failure)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::test_helpers::eval;

    use super::*;

    #[test]
    fn test_raise_carries_message_and_stack() {
        let (rt, v) = eval("raise", |_| vec![Value::string("no compiler found")]);
        assert_eq!(
            rt.heap().read_failure(&v),
            Some(("no compiler found".to_string(), vec!["test".to_string()]))
        );
    }
}
