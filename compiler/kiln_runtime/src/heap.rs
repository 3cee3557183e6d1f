//! Arena owning every tuple and future slot.
//!
//! Allocation is split into `reserve` and `claim`: a caller that is about to
//! build many tuples (a whole list, a record and its fields) reserves the
//! total capacity once and then claims tuples from it without further
//! growth checks. Claiming more than was reserved, or finishing a batch
//! with future slots left over, is an engine bug and panics. Running out of
//! memory aborts the process, as for any `Vec`.

use std::cmp::Ordering;
use std::fmt::Write as _;
use std::ops::{Add, AddAssign};

use rustc_hash::FxHashSet;

use crate::future::{FutureId, FutureSlot};
use crate::stack::ensure_sufficient_stack;
use crate::tuple::{Tuple, TupleId, TupleMeta};
use crate::value::{ConstructorId, ConstructorTable, Value};

/// Capacity token: how many tuples and future slots a batch will claim.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Reservation {
    tuples: usize,
    futures: usize,
}

impl Reservation {
    /// Capacity for a single tuple of `size` fields.
    pub fn tuple(size: usize) -> Self {
        Reservation {
            tuples: 1,
            futures: size,
        }
    }

    /// This reservation repeated `n` times.
    #[must_use]
    pub fn repeat(self, n: usize) -> Self {
        Reservation {
            tuples: self.tuples * n,
            futures: self.futures * n,
        }
    }

    pub fn tuples(self) -> usize {
        self.tuples
    }

    pub fn futures(self) -> usize {
        self.futures
    }
}

impl Add for Reservation {
    type Output = Reservation;

    fn add(self, rhs: Reservation) -> Reservation {
        Reservation {
            tuples: self.tuples + rhs.tuples,
            futures: self.futures + rhs.futures,
        }
    }
}

impl AddAssign for Reservation {
    fn add_assign(&mut self, rhs: Reservation) {
        *self = *self + rhs;
    }
}

/// The runtime heap.
#[derive(Debug)]
pub struct Heap {
    futures: Vec<FutureSlot>,
    tuples: Vec<Tuple>,
    constructors: ConstructorTable,
    /// Capacity reserved but not yet claimed.
    reserved: Reservation,
}

impl Heap {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create a heap with room for `tuples` tuples and `futures` slots.
    pub fn with_capacity(tuples: usize, futures: usize) -> Self {
        Heap {
            futures: Vec::with_capacity(futures),
            tuples: Vec::with_capacity(tuples),
            constructors: ConstructorTable::new(),
            reserved: Reservation::default(),
        }
    }

    // Allocation

    /// Guarantee that subsequent claims totalling `reservation` will not
    /// reallocate.
    pub fn reserve(&mut self, reservation: Reservation) {
        self.reserved += reservation;
        self.tuples.reserve(self.reserved.tuples);
        self.futures.reserve(self.reserved.futures);
    }

    /// Construct a tuple of `size` pending fields from reserved capacity.
    ///
    /// # Panics
    ///
    /// Panics if fewer than one tuple and `size` slots are reserved, or if
    /// this is the last reserved tuple and `size` does not use up the
    /// reserved slots.
    pub fn claim(&mut self, meta: TupleMeta, size: usize) -> TupleId {
        self.take_reserved(size);
        let first = self.next_future_index();
        self.futures.extend(std::iter::repeat_with(FutureSlot::pending).take(size));
        self.push_tuple(meta, first, size)
    }

    /// Construct a tuple whose fields are already resolved, from reserved
    /// capacity.
    pub fn claim_resolved(&mut self, meta: TupleMeta, values: Vec<Value>) -> TupleId {
        let size = values.len();
        self.take_reserved(size);
        let first = self.next_future_index();
        self.futures.extend(values.into_iter().map(FutureSlot::Resolved));
        self.push_tuple(meta, first, size)
    }

    /// Reserve and claim a single tuple.
    pub fn alloc(&mut self, meta: TupleMeta, size: usize) -> TupleId {
        self.reserve(Tuple::reserve(size));
        self.claim(meta, size)
    }

    /// Build a constructor application from resolved field values.
    pub fn construct(&mut self, ctor: ConstructorId, values: Vec<Value>) -> Value {
        self.reserve(Tuple::reserve(values.len()));
        Value::Tuple(self.claim_resolved(TupleMeta::Constructor(ctor), values))
    }

    /// Allocate a standalone pending future.
    pub fn alloc_future(&mut self) -> FutureId {
        let id = FutureId::new(self.next_future_index());
        self.futures.push(FutureSlot::pending());
        id
    }

    fn take_reserved(&mut self, size: usize) {
        assert!(
            self.reserved.tuples >= 1 && self.reserved.futures >= size,
            "claim of a {size}-field tuple exceeds reservation ({:?})",
            self.reserved
        );
        assert!(
            self.reserved.tuples > 1 || self.reserved.futures == size,
            "claim of a {size}-field tuple leaves {} reserved slots unclaimed",
            self.reserved.futures - size
        );
        self.reserved.tuples -= 1;
        self.reserved.futures -= size;
    }

    fn next_future_index(&self) -> u32 {
        u32::try_from(self.futures.len()).unwrap_or_else(|_| panic!("future arena exhausted"))
    }

    fn push_tuple(&mut self, meta: TupleMeta, first: u32, size: usize) -> TupleId {
        let index =
            u32::try_from(self.tuples.len()).unwrap_or_else(|_| panic!("tuple arena exhausted"));
        let len = u32::try_from(size).unwrap_or_else(|_| panic!("tuple of {size} fields"));
        self.tuples.push(Tuple::new(meta, first, len));
        TupleId::new(index)
    }

    // Access

    pub fn tuple(&self, id: TupleId) -> &Tuple {
        &self.tuples[id.index()]
    }

    pub fn slot(&self, id: FutureId) -> &FutureSlot {
        &self.futures[id.index()]
    }

    pub(crate) fn slot_mut(&mut self, id: FutureId) -> &mut FutureSlot {
        &mut self.futures[id.index()]
    }

    /// The value of `future`, if resolved.
    pub fn value(&self, future: FutureId) -> Option<&Value> {
        self.slot(future).value()
    }

    /// The value of field `i` of `tuple`, if resolved.
    pub fn field_value(&self, tuple: TupleId, i: usize) -> Option<&Value> {
        self.value(self.tuple(tuple).field(i))
    }

    pub fn tuple_count(&self) -> usize {
        self.tuples.len()
    }

    pub fn future_count(&self) -> usize {
        self.futures.len()
    }

    pub fn constructors(&self) -> &ConstructorTable {
        &self.constructors
    }

    pub fn constructors_mut(&mut self) -> &mut ConstructorTable {
        &mut self.constructors
    }

    /// The constructor of `value`, if it is a constructor application.
    pub fn constructor_of(&self, value: &Value) -> Option<ConstructorId> {
        self.tuple(value.as_tuple()?).constructor()
    }

    // Readers for the canonical shapes. All return `None` if the value has
    // a different shape or a needed field is still unresolved.

    /// Elements of a fully resolved, finite list.
    pub fn read_list(&self, value: &Value) -> Option<Vec<Value>> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        let mut cursor = value.clone();
        loop {
            let id = cursor.as_tuple()?;
            if !seen.insert(id) {
                return None;
            }
            let tuple = self.tuple(id);
            match tuple.constructor()? {
                ConstructorId::NIL => return Some(out),
                ConstructorId::CONS => {
                    out.push(self.value(tuple.field(0))?.clone());
                    cursor = self.value(tuple.field(1))?.clone();
                }
                _ => return None,
            }
        }
    }

    /// `(ok, payload)` of a `Pass`/`Fail` result.
    pub fn read_result(&self, value: &Value) -> Option<(bool, Value)> {
        let tuple = self.tuple(value.as_tuple()?);
        let ok = match tuple.constructor()? {
            ConstructorId::PASS => true,
            ConstructorId::FAIL => false,
            _ => return None,
        };
        Some((ok, self.value(tuple.field(0))?.clone()))
    }

    pub fn read_pair(&self, value: &Value) -> Option<(Value, Value)> {
        let tuple = self.tuple(value.as_tuple()?);
        if tuple.constructor()? != ConstructorId::PAIR {
            return None;
        }
        let first = self.value(tuple.field(0))?.clone();
        let second = self.value(tuple.field(1))?.clone();
        Some((first, second))
    }

    pub fn read_order(&self, value: &Value) -> Option<Ordering> {
        match self.constructor_of(value)? {
            ConstructorId::LT => Some(Ordering::Less),
            ConstructorId::EQ => Some(Ordering::Equal),
            ConstructorId::GT => Some(Ordering::Greater),
            _ => None,
        }
    }

    /// `(cause, stack)` of a `Fail(Error(cause, stack))` value.
    pub fn read_failure(&self, value: &Value) -> Option<(String, Vec<String>)> {
        let (false, error) = self.read_result(value)? else {
            return None;
        };
        let tuple = self.tuple(error.as_tuple()?);
        if tuple.constructor()? != ConstructorId::ERROR {
            return None;
        }
        let cause = self.value(tuple.field(0))?.as_str()?.to_string();
        let stack = self
            .read_list(self.value(tuple.field(1))?)?
            .iter()
            .map(|frame| frame.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()?;
        Some((cause, stack))
    }

    /// Render a value with its tuple structure, for diagnostics.
    ///
    /// Unresolved fields print as `_`, a tuple nested inside itself as
    /// `<cycle>`.
    pub fn render(&self, value: &Value) -> String {
        let mut out = String::new();
        self.render_into(value, &mut out, &mut FxHashSet::default());
        out
    }

    /// `path` holds the tuples currently being rendered.
    fn render_into(&self, value: &Value, out: &mut String, path: &mut FxHashSet<TupleId>) {
        ensure_sufficient_stack(|| {
            let Value::Tuple(id) = value else {
                let _ = write!(out, "{value}");
                return;
            };
            if !path.insert(*id) {
                out.push_str("<cycle>");
                return;
            }
            self.render_tuple(*id, value, out, path);
            path.remove(id);
        });
    }

    fn render_tuple(
        &self,
        id: TupleId,
        value: &Value,
        out: &mut String,
        path: &mut FxHashSet<TupleId>,
    ) {
        if let Some(items) = self.read_list(value) {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                self.render_into(item, out, path);
            }
            out.push(']');
            return;
        }
        let tuple = self.tuple(id);
        match tuple.meta() {
            TupleMeta::Constructor(ctor) => out.push_str(&self.constructors.get(ctor).name),
            TupleMeta::Closure(expr) => {
                let _ = write!(out, "<closure {}>", expr.raw());
                return;
            }
        }
        if tuple.size() == 0 {
            return;
        }
        out.push('(');
        for (i, field) in tuple.fields().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            match self.value(field) {
                Some(v) => self.render_into(v, out, path),
                None => out.push('_'),
            }
        }
        out.push(')');
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
