//! Primitive registry.
//!
//! Built once during start-up by the grouped `register_*` entry points,
//! then frozen into a [`SharedRegistry`] and passed by reference to
//! whatever needs lookups.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::desc::{PrimData, PrimDesc, PrimFlags, PrimFn, PrimType};

/// Registration failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("primitive `{0}` is already registered")]
    Duplicate(&'static str),
}

/// Map from primitive name to descriptor.
#[derive(Default)]
pub struct PrimRegistry {
    prims: FxHashMap<&'static str, PrimDesc>,
}

impl PrimRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name`. Registering an existing name is an error.
    pub fn register(
        &mut self,
        name: &'static str,
        func: PrimFn,
        ty: PrimType,
        flags: PrimFlags,
        data: PrimData,
    ) -> Result<(), RegistryError> {
        if self.prims.contains_key(name) {
            return Err(RegistryError::Duplicate(name));
        }
        tracing::trace!(name, ty = %ty, ?flags, "registered primitive");
        self.prims.insert(name, PrimDesc::new(name, func, ty, flags, data));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PrimDesc> {
        self.prims.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.prims.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.prims.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.prims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prims.is_empty()
    }

    /// Freeze the registry for shared read-only use.
    pub fn share(self) -> SharedRegistry {
        SharedRegistry(Arc::new(self))
    }
}

impl fmt::Debug for PrimRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimRegistry")
            .field("prims", &self.names())
            .finish()
    }
}

/// Thread-safe shared registry wrapper (immutable).
///
/// Uses `Arc` internally for thread-safe reference counting.
/// The wrapped registry is immutable after creation.
#[derive(Clone, Debug)]
pub struct SharedRegistry(Arc<PrimRegistry>);

impl std::ops::Deref for SharedRegistry {
    type Target = PrimRegistry;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
