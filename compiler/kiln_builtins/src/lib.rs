//! Built-in primitive families for the Kiln build runtime.
//!
//! Each family has its own registration entry point that populates a
//! [`PrimRegistry`]. All primitives follow the same calling convention
//! (see [`kiln_runtime::prim`]): validate with the `checked!` helpers,
//! then resolve the completion exactly once.
//!
//! Primitives declared to return `Result a` resolve to `Pass value` on
//! success. Every primitive, whatever its declared type, resolves to
//! `Fail (Error cause stack)` when its arguments are unusable.

mod double;
mod exception;
mod integer;
mod json;
mod regexp;
mod sources;
mod string;
mod vector;

#[cfg(test)]
mod test_helpers;

use kiln_runtime::{PrimRegistry, RegistryError};

pub use double::register_double;
pub use exception::register_exception;
pub use integer::register_integer;
pub use json::register_json;
pub use regexp::register_regexp;
pub use sources::register_sources;
pub use string::register_string;
pub use vector::register_vector;

/// Register every family in this crate.
///
/// `version` is reported by the `version` primitive; `sources` is the
/// snapshot of source files searched by `sources`.
pub fn register_builtins(
    registry: &mut PrimRegistry,
    version: &str,
    sources: Vec<String>,
) -> Result<(), RegistryError> {
    register_string(registry, version)?;
    register_vector(registry)?;
    register_integer(registry)?;
    register_double(registry)?;
    register_exception(registry)?;
    register_regexp(registry)?;
    register_json(registry)?;
    register_sources(registry, sources)?;
    tracing::debug!(count = registry.len(), "registered builtin primitives");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_builtins_twice_is_rejected() {
        let mut registry = PrimRegistry::new();
        assert_eq!(register_builtins(&mut registry, "0.1.0", Vec::new()), Ok(()));
        assert_eq!(
            register_string(&mut registry, "0.1.0"),
            Err(RegistryError::Duplicate("strlen"))
        );
    }

    #[test]
    fn test_every_family_is_present() {
        let mut registry = PrimRegistry::new();
        assert_eq!(register_builtins(&mut registry, "0.1.0", Vec::new()), Ok(()));
        for name in [
            "strlen", "cat", "explode", "version", "scmp", "iadd", "isub", "imul", "idiv", "icmp",
            "istr", "dadd", "dmul", "dcmp", "dstr", "re2", "match", "quote", "raise", "vlen",
            "vget", "vrev", "json_str", "json_format", "sources",
        ] {
            assert!(registry.contains(name), "missing {name}");
        }
    }
}
