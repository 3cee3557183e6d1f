//! Heap tuples.
//!
//! A tuple is a fixed-length run of future slots plus a tag saying what
//! produced it. Its size never changes after construction, and every index
//! in `0..size()` names a valid slot (which may still be unresolved).

use std::fmt;

use crate::future::FutureId;
use crate::heap::Reservation;
use crate::value::ConstructorId;

/// Index of a tuple in the [`Heap`](crate::Heap).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TupleId(u32);

impl TupleId {
    #[inline]
    pub(crate) fn new(index: u32) -> Self {
        TupleId(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TupleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tuple#{}", self.0)
    }
}

/// Opaque id of an expression in the front end's expression graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExprId(u32);

impl ExprId {
    pub const fn new(raw: u32) -> Self {
        ExprId(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// What produced a tuple.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TupleMeta {
    /// A data constructor application; fields are the constructor arguments.
    Constructor(ConstructorId),
    /// A closure over a lambda expression; fields are the captured values.
    Closure(ExprId),
}

/// Coarse classification of a tuple, for pattern matching fast paths.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TupleShape {
    Record,
    ListCell,
    Closure,
}

/// A heap tuple.
#[derive(Clone, Debug)]
pub struct Tuple {
    meta: TupleMeta,
    first: u32,
    len: u32,
}

impl Tuple {
    pub(crate) fn new(meta: TupleMeta, first: u32, len: u32) -> Self {
        Tuple { meta, first, len }
    }

    /// Capacity needed to claim one tuple of `size` fields.
    #[inline]
    pub fn reserve(size: usize) -> Reservation {
        Reservation::tuple(size)
    }

    #[inline]
    pub fn meta(&self) -> TupleMeta {
        self.meta
    }

    /// The constructor, if this tuple is a constructor application.
    pub fn constructor(&self) -> Option<ConstructorId> {
        match self.meta {
            TupleMeta::Constructor(id) => Some(id),
            TupleMeta::Closure(_) => None,
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.len as usize
    }

    /// The future backing field `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.size()`.
    pub fn field(&self, i: usize) -> FutureId {
        assert!(
            i < self.size(),
            "field {i} out of range for tuple of size {}",
            self.size()
        );
        let offset = u32::try_from(i).unwrap_or(u32::MAX);
        FutureId::new(self.first + offset)
    }

    /// The futures backing all fields, in order.
    pub fn fields(&self) -> impl Iterator<Item = FutureId> {
        (self.first..self.first + self.len).map(FutureId::new)
    }

    pub fn shape(&self) -> TupleShape {
        match self.meta {
            TupleMeta::Closure(_) => TupleShape::Closure,
            TupleMeta::Constructor(ConstructorId::NIL | ConstructorId::CONS) => {
                TupleShape::ListCell
            }
            TupleMeta::Constructor(_) => TupleShape::Record,
        }
    }
}
