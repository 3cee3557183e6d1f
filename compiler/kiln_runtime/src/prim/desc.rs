//! Primitive descriptors.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::binding::Binding;
use crate::runtime::Runtime;
use crate::value::Value;

use super::check::{Completion, Settled};

/// Native primitive function.
pub type PrimFn = fn(&mut Runtime, Completion, &Binding, &[Value], &PrimData) -> Settled;

bitflags! {
    /// Evaluation hints consulted by the caller, not by the primitive.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct PrimFlags: u8 {
        /// No side effects: the call may be duplicated or removed.
        const PURE = 1 << 0;
        /// Only the direct arguments need to be resolved, not the
        /// futures inside them.
        const SHALLOW = 1 << 1;
    }
}

/// Declared type of a primitive argument or result.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Unit,
    Bool,
    Integer,
    Double,
    String,
    RegExp,
    Data,
    Order,
    List(Box<Ty>),
    Pair(Box<Ty>, Box<Ty>),
    Result(Box<Ty>),
    /// Type variable, for polymorphic primitives.
    Var(char),
}

impl Ty {
    pub fn list(elem: Ty) -> Ty {
        Ty::List(Box::new(elem))
    }

    pub fn pair(first: Ty, second: Ty) -> Ty {
        Ty::Pair(Box::new(first), Box::new(second))
    }

    pub fn result(ok: Ty) -> Ty {
        Ty::Result(Box::new(ok))
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Unit => write!(f, "Unit"),
            Ty::Bool => write!(f, "Boolean"),
            Ty::Integer => write!(f, "Integer"),
            Ty::Double => write!(f, "Double"),
            Ty::String => write!(f, "String"),
            Ty::RegExp => write!(f, "RegExp"),
            Ty::Data => write!(f, "Data"),
            Ty::Order => write!(f, "Order"),
            Ty::List(elem) => write!(f, "List {elem}"),
            Ty::Pair(a, b) => write!(f, "Pair {a} {b}"),
            Ty::Result(ok) => write!(f, "Result {ok} Error"),
            Ty::Var(c) => write!(f, "{c}"),
        }
    }
}

/// Declared signature of a primitive.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrimType {
    params: Vec<Ty>,
    ret: Ty,
}

impl PrimType {
    pub fn new(params: Vec<Ty>, ret: Ty) -> Self {
        PrimType { params, ret }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[Ty] {
        &self.params
    }

    pub fn ret(&self) -> &Ty {
        &self.ret
    }
}

impl fmt::Display for PrimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for param in &self.params {
            write!(f, "{param} => ")?;
        }
        write!(f, "{}", self.ret)
    }
}

/// Opaque per-registration data handed to a primitive on every call.
#[derive(Clone, Default)]
pub struct PrimData(Option<Arc<dyn Any + Send + Sync>>);

impl PrimData {
    pub fn none() -> Self {
        PrimData(None)
    }

    pub fn new<T: Any + Send + Sync>(data: T) -> Self {
        Self::shared(Arc::new(data))
    }

    pub fn shared<T: Any + Send + Sync>(data: Arc<T>) -> Self {
        let data: Arc<dyn Any + Send + Sync> = data;
        PrimData(Some(data))
    }

    /// The registration data, if present and of type `T`.
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        self.0.as_deref()?.downcast_ref::<T>()
    }
}

impl fmt::Debug for PrimData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => write!(f, "PrimData(..)"),
            None => write!(f, "PrimData(None)"),
        }
    }
}

/// A registered primitive. Immutable once registered.
#[derive(Clone)]
pub struct PrimDesc {
    name: &'static str,
    func: PrimFn,
    ty: PrimType,
    flags: PrimFlags,
    data: PrimData,
}

impl PrimDesc {
    pub fn new(
        name: &'static str,
        func: PrimFn,
        ty: PrimType,
        flags: PrimFlags,
        data: PrimData,
    ) -> Self {
        PrimDesc {
            name,
            func,
            ty,
            flags,
            data,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn func(&self) -> PrimFn {
        self.func
    }

    pub fn ty(&self) -> &PrimType {
        &self.ty
    }

    pub fn flags(&self) -> PrimFlags {
        self.flags
    }

    pub fn data(&self) -> &PrimData {
        &self.data
    }

    pub fn is_pure(&self) -> bool {
        self.flags.contains(PrimFlags::PURE)
    }

    pub fn is_shallow(&self) -> bool {
        self.flags.contains(PrimFlags::SHALLOW)
    }
}

impl fmt::Debug for PrimDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimDesc")
            .field("name", &self.name)
            .field("ty", &self.ty.to_string())
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
