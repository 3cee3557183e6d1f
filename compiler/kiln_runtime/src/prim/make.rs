//! Canonical value constructors.
//!
//! Every primitive builds its results with these so the rest of the system
//! sees one shape per concept: comparisons yield `LT`/`EQ`/`GT`, fallible
//! operations yield `Pass value` or `Fail (Error cause stack)`.

use std::cmp::Ordering;

use crate::failure::Failure;
use crate::heap::Heap;
use crate::tuple::{Tuple, TupleMeta};
use crate::value::{ConstructorId, Value};

pub fn make_unit() -> Value {
    Value::Unit
}

pub fn make_bool(b: bool) -> Value {
    Value::Bool(b)
}

/// Three-way ordering value.
pub fn make_order(heap: &mut Heap, ordering: Ordering) -> Value {
    let ctor = match ordering {
        Ordering::Less => ConstructorId::LT,
        Ordering::Equal => ConstructorId::EQ,
        Ordering::Greater => ConstructorId::GT,
    };
    heap.construct(ctor, Vec::new())
}

pub fn make_pair(heap: &mut Heap, first: Value, second: Value) -> Value {
    heap.construct(ConstructorId::PAIR, vec![first, second])
}

/// A list of `values`, in order. The whole spine is reserved up front.
pub fn make_list(heap: &mut Heap, values: Vec<Value>) -> Value {
    heap.reserve(Tuple::reserve(0) + Tuple::reserve(2).repeat(values.len()));
    let nil = heap.claim_resolved(TupleMeta::Constructor(ConstructorId::NIL), Vec::new());
    values.into_iter().rev().fold(Value::Tuple(nil), |tail, head| {
        let meta = TupleMeta::Constructor(ConstructorId::CONS);
        Value::Tuple(heap.claim_resolved(meta, vec![head, tail]))
    })
}

/// `Pass value` if `ok`, otherwise `Fail value`.
pub fn make_result(heap: &mut Heap, ok: bool, value: Value) -> Value {
    let ctor = if ok {
        ConstructorId::PASS
    } else {
        ConstructorId::FAIL
    };
    heap.construct(ctor, vec![value])
}

/// `Error cause stack`.
pub fn make_error(heap: &mut Heap, cause: impl Into<String>, stack: &[String]) -> Value {
    let frames = stack.iter().map(|site| Value::string(site.as_str())).collect();
    let stack = make_list(heap, frames);
    heap.construct(ConstructorId::ERROR, vec![Value::string(cause), stack])
}

/// `Fail (Error cause stack)` for `failure`.
pub fn make_failure(heap: &mut Heap, failure: &Failure) -> Value {
    let error = make_error(heap, failure.message(), &failure.stack);
    make_result(heap, false, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::FailureCause;
    use pretty_assertions::assert_eq;

    #[test]
    fn result_round_trips_flag_and_payload() {
        let mut heap = Heap::new();
        for ok in [true, false] {
            let payload = Value::string("payload");
            let result = make_result(&mut heap, ok, payload.clone());
            assert_eq!(heap.read_result(&result), Some((ok, payload)));
        }
    }

    #[test]
    fn list_preserves_order() {
        let mut heap = Heap::new();
        let values: Vec<Value> = (1..=4).map(Value::integer).collect();
        let list = make_list(&mut heap, values.clone());
        assert_eq!(heap.read_list(&list), Some(values));
        assert_eq!(heap.render(&list), "[1, 2, 3, 4]");
    }

    #[test]
    fn empty_list_is_nil() {
        let mut heap = Heap::new();
        let list = make_list(&mut heap, Vec::new());
        assert_eq!(heap.constructor_of(&list), Some(ConstructorId::NIL));
        assert_eq!(heap.read_list(&list), Some(Vec::new()));
    }

    #[test]
    fn order_shapes() {
        let mut heap = Heap::new();
        for ordering in [Ordering::Less, Ordering::Equal, Ordering::Greater] {
            let v = make_order(&mut heap, ordering);
            assert_eq!(heap.read_order(&v), Some(ordering));
        }
    }

    #[test]
    fn pair_and_scalars() {
        let mut heap = Heap::new();
        let pair = make_pair(&mut heap, make_unit(), make_bool(true));
        assert_eq!(heap.read_pair(&pair), Some((Value::Unit, Value::Bool(true))));
        assert_eq!(heap.render(&pair), "Pair(Unit, True)");
    }

    #[test]
    fn failure_carries_cause_and_stack() {
        let mut heap = Heap::new();
        let failure = Failure::with_stack(
            FailureCause::Raised("boom".to_string()),
            vec!["inner".to_string(), "outer".to_string()],
        );
        let value = make_failure(&mut heap, &failure);
        assert_eq!(
            heap.read_failure(&value),
            Some((
                "boom".to_string(),
                vec!["inner".to_string(), "outer".to_string()]
            ))
        );
        assert_eq!(heap.read_result(&value).map(|(ok, _)| ok), Some(false));
    }
}
