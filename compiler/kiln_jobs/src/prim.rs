//! The job primitive family.

use kiln_runtime::{
    cast_string, cast_string_list, checked, expect_args, Binding, Completion, Failure,
    FailureCause, PrimData, PrimFlags, PrimRegistry, PrimType, RegistryError, Runtime, Settled,
    Ty, Value,
};

use crate::spec::JobSpec;
use crate::table::JobTable;

/// Register `job_launch` against `table`.
pub fn register_job(registry: &mut PrimRegistry, table: JobTable) -> Result<(), RegistryError> {
    let strings = || Ty::list(Ty::String);
    registry.register(
        "job_launch",
        prim_job_launch,
        PrimType::new(
            vec![strings(), strings(), Ty::String, Ty::String],
            Ty::result(Ty::String),
        ),
        PrimFlags::empty(),
        PrimData::new(table),
    )
}

/// `job_launch cmd env dir stdin`: run a build step.
///
/// Resolves to `Pass stdout` when the step exits with status 0, and to a
/// `Fail` carrying its stderr otherwise. The completion waits on a fresh
/// future that the job table resolves from whichever thread sees the
/// process finish.
fn prim_job_launch(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 4));
    let (completion, command) = checked!(cast_string_list(rt, completion, binding, args, 0));
    let (completion, env) = checked!(cast_string_list(rt, completion, binding, args, 1));
    let (completion, dir) = checked!(cast_string(rt, completion, binding, args, 2));
    let (completion, stdin) = checked!(cast_string(rt, completion, binding, args, 3));
    let Some(table) = data.downcast::<JobTable>() else {
        let cause = FailureCause::Require {
            prim: completion.name().to_string(),
            message: "no job table registered".to_string(),
        };
        return completion.fail(rt, Failure::new(cause, binding));
    };

    let spec = JobSpec::new(command).env(env).dir(dir).stdin(stdin);
    let target = rt.future();
    match table.submit(spec.clone(), binding, target) {
        Ok(_) => completion.await_future(rt, target),
        Err(e) => {
            let cause = FailureCause::Job {
                command: spec.display_command(),
                reason: format!("rejected: {e}"),
                diagnostics: String::new(),
            };
            completion.fail(rt, Failure::new(cause, binding))
        }
    }
}
