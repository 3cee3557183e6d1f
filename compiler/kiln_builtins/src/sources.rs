//! Source file discovery.
//!
//! The source list is a snapshot taken by the host before evaluation
//! starts, so `sources` is pure: the same query always gives the same
//! answer within one run.

use std::sync::Arc;

use kiln_runtime::{
    cast_regexp, cast_string, checked, expect_args, make_list, Binding, Completion, PrimData,
    PrimFlags, PrimRegistry, PrimType, RegistryError, Runtime, Settled, Ty, Value,
};

pub fn register_sources(
    registry: &mut PrimRegistry,
    mut sources: Vec<String>,
) -> Result<(), RegistryError> {
    sources.sort_unstable();
    sources.dedup();
    tracing::debug!(count = sources.len(), "source snapshot");
    registry.register(
        "sources",
        prim_sources,
        PrimType::new(vec![Ty::String, Ty::RegExp], Ty::list(Ty::String)),
        PrimFlags::PURE,
        PrimData::shared(Arc::new(sources)),
    )
}

/// Whether `path` lies under `dir`. `""` and `"."` contain everything.
fn under(dir: &str, path: &str) -> bool {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() || dir == "." {
        return true;
    }
    path.strip_prefix(dir)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// `sources dir regexp`: every known source under `dir` whose path matches
/// `regexp`, sorted.
fn prim_sources(
    rt: &mut Runtime,
    completion: Completion,
    binding: &Binding,
    args: &[Value],
    data: &PrimData,
) -> Settled {
    let completion = checked!(expect_args(rt, completion, binding, args, 2));
    let (completion, dir) = checked!(cast_string(rt, completion, binding, args, 0));
    let (completion, re) = checked!(cast_regexp(rt, completion, binding, args, 1));
    let known = data.downcast::<Vec<String>>().map_or(&[][..], Vec::as_slice);
    let found = known
        .iter()
        .filter(|path| under(dir, path) && re.is_match(path))
        .map(|path| Value::string(path.as_str()))
        .collect();
    let list = make_list(rt.heap_mut(), found);
    completion.resolve(rt, list)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use regex::Regex;

    use crate::test_helpers::{eval, strings};

    use super::*;

    fn query(dir: &str, pattern: &str) -> Vec<Value> {
        let re = Regex::new(pattern).unwrap_or_else(|e| panic!("{e}"));
        let (rt, v) = eval("sources", |_| vec![Value::string(dir), Value::regexp(re)]);
        rt.heap()
            .read_list(&v)
            .unwrap_or_else(|| panic!("not a list: {}", rt.heap().render(&v)))
    }

    #[test]
    fn test_under() {
        assert!(under("src", "src/main.c"));
        assert!(under("src/", "src/sub/deep.c"));
        assert!(!under("src", "srcx/main.c"));
        assert!(under(".", "README.md"));
    }

    #[test]
    fn test_sources_filters_by_dir_and_pattern() {
        assert_eq!(
            query("src", r"\.c$"),
            strings(&["src/main.c", "src/sub/deep.c", "src/util.c"])
        );
        assert_eq!(query("src/sub", r"\.h$"), Vec::<Value>::new());
        assert_eq!(query(".", r"^README"), strings(&["README.md"]));
    }
}
