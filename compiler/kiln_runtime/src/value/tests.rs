use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_value_kind() {
    assert_eq!(Value::Unit.kind(), ValueKind::Unit);
    assert_eq!(Value::integer(7).kind(), ValueKind::Integer);
    assert_eq!(Value::string("x").kind(), ValueKind::String);
    assert_eq!(Value::data(vec![1, 2]).kind(), ValueKind::Data);
    assert_eq!(ValueKind::Integer.to_string(), "Integer");
}

#[test]
fn test_value_display() {
    assert_eq!(format!("{}", Value::integer(42)), "42");
    assert_eq!(format!("{}", Value::Bool(true)), "True");
    assert_eq!(format!("{}", Value::string("hello")), "\"hello\"");
    assert_eq!(format!("{}", Value::double(1.5)), "1.5");
    assert_eq!(format!("{}", Value::data(vec![0u8; 3])), "<3 bytes>");
}

#[test]
fn test_accessors() {
    let s = Value::string("hello");
    assert_eq!(s.as_str(), Some("hello"));
    assert_eq!(s.as_integer(), None);

    let n = Value::integer(9);
    assert_eq!(n.as_integer().map(ToString::to_string), Some("9".to_string()));

    let re = Value::regexp(regex::Regex::new("a+").unwrap_or_else(|e| panic!("{e}")));
    assert_eq!(re.as_regexp().map(regex::Regex::as_str), Some("a+"));
}

#[test]
fn test_value_equality() {
    assert_eq!(Value::integer(42), Value::integer(42));
    assert_ne!(Value::integer(42), Value::integer(43));
    assert_eq!(Value::string("a"), Value::string("a"));
    assert_ne!(Value::string("1"), Value::integer(1));
    assert_eq!(Value::double(f64::NAN), Value::double(f64::NAN));
}

#[test]
fn test_big_integers() {
    let big: BigInt = "123456789012345678901234567890".parse().unwrap_or_default();
    let v = Value::integer(big.clone());
    assert_eq!(v.as_integer(), Some(&big));
}

#[test]
fn test_shared_clone_is_same_allocation() {
    let Value::String(a) = Value::string("shared") else {
        panic!("expected String");
    };
    let b = a.clone();
    assert!(Shared::ptr_eq(&a, &b));
}
