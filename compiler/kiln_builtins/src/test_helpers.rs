//! Harness for calling a registered primitive on literal arguments.

use kiln_runtime::{Binding, PrimRegistry, Receiver, Runtime, Value};

use crate::register_builtins;

pub const VERSION: &str = "1.2.3";

pub fn fixture_sources() -> Vec<String> {
    [
        "src/main.c",
        "src/util.c",
        "src/util.h",
        "src/sub/deep.c",
        "test/check.c",
        "README.md",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Call `name` on the arguments built by `args` and run to quiescence.
pub fn eval(name: &str, args: impl FnOnce(&mut Runtime) -> Vec<Value>) -> (Runtime, Value) {
    let mut registry = PrimRegistry::new();
    if let Err(e) = register_builtins(&mut registry, VERSION, fixture_sources()) {
        panic!("{e}");
    }
    let mut rt = Runtime::builder().registry(registry.share()).build();
    let values = args(&mut rt);
    let futures = values.into_iter().map(|v| rt.resolved(v)).collect();
    let out = rt.future();
    rt.call_named(name, Binding::root().call("test"), futures, Receiver::Fill(out));
    rt.run();
    let value = rt
        .value(out)
        .cloned()
        .unwrap_or_else(|| panic!("{name} left its result unresolved"));
    (rt, value)
}

/// The cause of a `Fail` result, or a panic describing what came back.
pub fn failure_cause(rt: &Runtime, value: &Value) -> String {
    match rt.heap().read_failure(value) {
        Some((cause, _)) => cause,
        None => panic!("expected a failure, got {}", rt.heap().render(value)),
    }
}

/// The payload of a `Pass` result.
pub fn passed(rt: &Runtime, value: &Value) -> Value {
    match rt.heap().read_result(value) {
        Some((true, payload)) => payload,
        _ => panic!("expected Pass, got {}", rt.heap().render(value)),
    }
}

pub fn strings(values: &[&str]) -> Vec<Value> {
    values.iter().map(|s| Value::string(*s)).collect()
}
