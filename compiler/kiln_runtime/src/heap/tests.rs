use super::*;
use crate::tuple::{ExprId, TupleId, TupleShape};
use pretty_assertions::assert_eq;

#[test]
fn test_reservation_arithmetic() {
    let r = Tuple::reserve(2).repeat(3) + Tuple::reserve(0);
    assert_eq!(r.tuples(), 4);
    assert_eq!(r.futures(), 6);

    let mut acc = Reservation::default();
    acc += Tuple::reserve(5);
    assert_eq!(acc, Reservation::tuple(5));
}

#[test]
fn test_reserve_then_claim_batch() {
    let mut heap = Heap::new();
    heap.reserve(Tuple::reserve(2) + Tuple::reserve(3));

    let a = heap.claim(TupleMeta::Constructor(ConstructorId::PAIR), 2);
    let b = heap.claim(TupleMeta::Closure(ExprId::new(9)), 3);

    assert_eq!(heap.tuple_count(), 2);
    assert_eq!(heap.future_count(), 5);
    assert_eq!(heap.tuple(a).size(), 2);
    assert_eq!(heap.tuple(b).size(), 3);
    // Fields are fresh and pending.
    assert!(heap.tuple(b).fields().all(|f| heap.value(f).is_none()));
    // Fields of different tuples never overlap.
    let last_a = heap.tuple(a).field(1);
    let first_b = heap.tuple(b).field(0);
    assert_eq!(last_a.index() + 1, first_b.index());
}

#[test]
#[should_panic(expected = "exceeds reservation")]
fn test_claim_without_reservation_panics() {
    let mut heap = Heap::new();
    let _ = heap.claim(TupleMeta::Constructor(ConstructorId::NIL), 0);
}

#[test]
#[should_panic(expected = "exceeds reservation")]
fn test_claim_beyond_reservation_panics() {
    let mut heap = Heap::new();
    heap.reserve(Tuple::reserve(1));
    let _ = heap.claim(TupleMeta::Constructor(ConstructorId::PAIR), 2);
}

#[test]
#[should_panic(expected = "out of range")]
fn test_field_out_of_range_panics() {
    let mut heap = Heap::new();
    let t = heap.alloc(TupleMeta::Constructor(ConstructorId::PAIR), 2);
    let _ = heap.tuple(t).field(2);
}

#[test]
fn test_tuple_shapes() {
    let mut heap = Heap::new();
    let nil = heap.alloc(TupleMeta::Constructor(ConstructorId::NIL), 0);
    let pair = heap.alloc(TupleMeta::Constructor(ConstructorId::PAIR), 2);
    let closure = heap.alloc(TupleMeta::Closure(ExprId::new(1)), 1);

    assert_eq!(heap.tuple(nil).shape(), TupleShape::ListCell);
    assert_eq!(heap.tuple(pair).shape(), TupleShape::Record);
    assert_eq!(heap.tuple(closure).shape(), TupleShape::Closure);
    assert_eq!(heap.tuple(closure).constructor(), None);
}

#[test]
fn test_render_marks_unresolved_fields() {
    let mut heap = Heap::new();
    let pair = heap.alloc(TupleMeta::Constructor(ConstructorId::PAIR), 2);
    let first = heap.tuple(pair).field(0);
    *heap.slot_mut(first) = FutureSlot::Resolved(Value::integer(1));
    assert_eq!(heap.render(&Value::Tuple(pair)), "Pair(1, _)");
    assert_eq!(heap.read_pair(&Value::Tuple(pair)), None);
}

#[test]
fn test_render_user_constructor() {
    let mut heap = Heap::new();
    let point = heap.constructors_mut().register("Point", "Point", 2, 0);
    let value = heap.construct(point, vec![Value::integer(1), Value::string("y")]);
    assert_eq!(heap.render(&value), "Point(1, \"y\")");
    assert_eq!(heap.constructor_of(&value), Some(point));
    assert_eq!(heap.read_list(&value), None);
}

#[test]
fn test_render_deep_nesting() {
    let mut heap = Heap::new();
    let mut value = Value::Unit;
    for _ in 0..20_000 {
        value = heap.construct(ConstructorId::PASS, vec![value]);
    }
    let rendered = heap.render(&value);
    assert!(rendered.starts_with("Pass(Pass("));
    assert!(rendered.contains("Unit"));
}

#[test]
#[should_panic(expected = "unclaimed")]
fn test_last_claim_short_of_reservation_panics() {
    let mut heap = Heap::new();
    heap.reserve(Tuple::reserve(3));
    let _ = heap.claim(TupleMeta::Constructor(ConstructorId::PAIR), 2);
}

/// A `Cons` cell whose tail is the cell itself.
fn self_tailed_cell(heap: &mut Heap) -> TupleId {
    let cell = heap.alloc(TupleMeta::Constructor(ConstructorId::CONS), 2);
    let head = heap.tuple(cell).field(0);
    let tail = heap.tuple(cell).field(1);
    *heap.slot_mut(head) = FutureSlot::Resolved(Value::integer(1));
    *heap.slot_mut(tail) = FutureSlot::Resolved(Value::Tuple(cell));
    cell
}

#[test]
fn test_cyclic_list_is_not_a_list() {
    let mut heap = Heap::new();
    let cell = Value::Tuple(self_tailed_cell(&mut heap));
    assert_eq!(heap.read_list(&cell), None);
    assert_eq!(heap.render(&cell), "Cons(1, <cycle>)");
}

#[test]
fn test_shared_tuple_is_not_a_cycle() {
    let mut heap = Heap::new();
    let shared = heap.construct(ConstructorId::PASS, vec![Value::Unit]);
    let pair = heap.construct(ConstructorId::PAIR, vec![shared.clone(), shared]);
    assert_eq!(heap.render(&pair), "Pair(Pass(Unit), Pass(Unit))");
}
