//! Runtime values.
//!
//! # Shape
//!
//! Scalar variants (`Unit`, `Bool`, `Integer`, `Double`, `String`, `RegExp`,
//! `Data`) carry their payload directly. Everything structured - lists,
//! pairs, results, orderings, user types and closures - is a
//! [`Value::Tuple`] pointing into the [`Heap`](crate::Heap), whose fields are
//! futures that may still be unresolved.
//!
//! Values are immutable once published to a future, so cloning is always a
//! reference-count bump and sharing across waiters is safe.
//!
//! ## Correct Usage
//!
//! ```text
//! let s = Value::string("hello");      // OK
//! let n = Value::integer(42);          // OK
//! let list = make_list(heap, vec![n]); // structured values go through the heap
//! ```

mod constructor;
mod shared;

use std::fmt;

use num_bigint::BigInt;
use regex::Regex;

use crate::tuple::TupleId;

pub use constructor::{Constructor, ConstructorId, ConstructorTable};
pub use shared::Shared;

/// Runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    /// The unit value.
    Unit,
    /// Boolean value.
    Bool(bool),
    /// Arbitrary precision integer.
    Integer(Shared<BigInt>),
    /// Floating-point value.
    Double(f64),
    /// UTF-8 string.
    String(Shared<String>),
    /// Compiled regular expression.
    RegExp(Shared<Regex>),
    /// Opaque binary blob.
    Data(Shared<Vec<u8>>),
    /// Heap tuple: constructor application or closure.
    Tuple(TupleId),
}

/// Variant tag of a [`Value`], used in type-mismatch diagnostics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Unit,
    Bool,
    Integer,
    Double,
    String,
    RegExp,
    Data,
    Tuple,
    /// A `Nil`/`Cons` tuple. Only ever expected, never reported by
    /// [`Value::kind`].
    List,
}

impl ValueKind {
    /// Human-readable name, as it appears in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Unit => "Unit",
            ValueKind::Bool => "Boolean",
            ValueKind::Integer => "Integer",
            ValueKind::Double => "Double",
            ValueKind::String => "String",
            ValueKind::RegExp => "RegExp",
            ValueKind::Data => "Data",
            ValueKind::Tuple => "Tuple",
            ValueKind::List => "List",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Factory Methods

impl Value {
    /// Create an integer value.
    #[inline]
    pub fn integer(n: impl Into<BigInt>) -> Self {
        Value::Integer(Shared::new(n.into()))
    }

    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Shared::new(s.into()))
    }

    /// Wrap a compiled regular expression.
    #[inline]
    pub fn regexp(re: Regex) -> Self {
        Value::RegExp(Shared::new(re))
    }

    /// Create an opaque data value.
    #[inline]
    pub fn data(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Data(Shared::new(bytes.into()))
    }

    /// Create a double value.
    #[inline]
    pub fn double(d: f64) -> Self {
        Value::Double(d)
    }
}

// Accessors

impl Value {
    /// The variant tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Unit => ValueKind::Unit,
            Value::Bool(_) => ValueKind::Bool,
            Value::Integer(_) => ValueKind::Integer,
            Value::Double(_) => ValueKind::Double,
            Value::String(_) => ValueKind::String,
            Value::RegExp(_) => ValueKind::RegExp,
            Value::Data(_) => ValueKind::Data,
            Value::Tuple(_) => ValueKind::Tuple,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            Value::Integer(n) => Some(n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_double(&self) -> Option<&f64> {
        match self {
            Value::Double(d) => Some(d),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_regexp(&self) -> Option<&Regex> {
        match self {
            Value::RegExp(re) => Some(re),
            _ => None,
        }
    }

    #[inline]
    pub fn as_data(&self) -> Option<&[u8]> {
        match self {
            Value::Data(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    #[inline]
    pub fn as_tuple(&self) -> Option<TupleId> {
        match self {
            Value::Tuple(id) => Some(*id),
            _ => None,
        }
    }
}

/// Structural equality for scalars, identity for tuples.
///
/// Regular expressions compare by source pattern. Tuples compare by heap
/// identity; structural comparison needs the heap (see `Heap::read_list`).
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::RegExp(a), Value::RegExp(b)) => a.as_str() == b.as_str(),
            (Value::Data(a), Value::Data(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => write!(f, "Unit"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Double(d) => write!(f, "{d:?}"),
            Value::String(s) => write!(f, "{:?}", s.as_str()),
            Value::RegExp(re) => write!(f, "`{}`", re.as_str()),
            Value::Data(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Value::Tuple(id) => write!(f, "<{id}>"),
        }
    }
}

#[cfg(test)]
mod tests;
