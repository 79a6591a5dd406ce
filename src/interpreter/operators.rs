//! JavaScript operator semantics
//!
//! Coercions and the binary operators, as free functions over the [`Heap`].
//! None of these emit steps; the evaluator decides what is observable.

use crate::memory::heap::Heap;
use crate::memory::value::{format_number, Value};
use crate::memory::HeapId;
use crate::parser::ast::BinOp;
use std::cmp::Ordering;

/// `Number(value)`
pub fn to_number(heap: &Heap, value: &Value) -> f64 {
    match value {
        Value::Undefined => f64::NAN,
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => *n,
        Value::Str(s) => string_to_number(s),
        Value::Array(_) => string_to_number(&to_js_string(heap, value)),
        Value::Object(_) | Value::Function(_) => f64::NAN,
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    // Rust also accepts "inf" and "nan", JavaScript does not
    let is_numeric = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !is_numeric {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// `String(value)`
pub fn to_js_string(heap: &Heap, value: &Value) -> String {
    let mut visiting = Vec::new();
    to_js_string_inner(heap, value, &mut visiting)
}

fn to_js_string_inner(heap: &Heap, value: &Value, visiting: &mut Vec<HeapId>) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(*n),
        Value::Str(s) => s.clone(),
        Value::Array(id) => {
            // A cycle joins as the empty string
            if visiting.contains(id) {
                return String::new();
            }
            visiting.push(*id);
            let joined = heap
                .array(*id)
                .map(|elements| {
                    elements
                        .iter()
                        .map(|e| match e {
                            Value::Undefined | Value::Null => String::new(),
                            other => to_js_string_inner(heap, other, visiting),
                        })
                        .collect::<Vec<_>>()
                        .join(",")
                })
                .unwrap_or_default();
            visiting.pop();
            joined
        }
        Value::Object(_) => "[object Object]".to_string(),
        Value::Function(id) => match heap.function(*id) {
            Some(function) => format!(
                "function {}({}) {{ [code] }}",
                function.name,
                function.params().join(", ")
            ),
            None => "function () { [code] }".to_string(),
        },
    }
}

/// Primitive form of a value for `+` and the comparison operators
fn to_primitive(heap: &Heap, value: &Value) -> Value {
    match value {
        Value::Array(_) | Value::Object(_) | Value::Function(_) => {
            Value::Str(to_js_string(heap, value))
        }
        other => other.clone(),
    }
}

/// Evaluate a binary operator on two already-evaluated operands
pub fn binary_op(heap: &Heap, op: BinOp, left: &Value, right: &Value) -> Value {
    match op {
        BinOp::Add => add(heap, left, right),
        BinOp::Sub => Value::Number(to_number(heap, left) - to_number(heap, right)),
        BinOp::Mul => Value::Number(to_number(heap, left) * to_number(heap, right)),
        BinOp::Div => Value::Number(to_number(heap, left) / to_number(heap, right)),
        // Rust's `%` on f64 is fmod, which matches JavaScript's remainder
        BinOp::Mod => Value::Number(to_number(heap, left) % to_number(heap, right)),
        BinOp::Eq => Value::Bool(loose_equals(heap, left, right)),
        BinOp::NotEq => Value::Bool(!loose_equals(heap, left, right)),
        BinOp::StrictEq => Value::Bool(strict_equals(left, right)),
        BinOp::StrictNotEq => Value::Bool(!strict_equals(left, right)),
        BinOp::Lt => Value::Bool(relational(heap, left, right, |o| o == Ordering::Less)),
        BinOp::Le => Value::Bool(relational(heap, left, right, |o| o != Ordering::Greater)),
        BinOp::Gt => Value::Bool(relational(heap, left, right, |o| o == Ordering::Greater)),
        BinOp::Ge => Value::Bool(relational(heap, left, right, |o| o != Ordering::Less)),
    }
}

fn add(heap: &Heap, left: &Value, right: &Value) -> Value {
    let left = to_primitive(heap, left);
    let right = to_primitive(heap, right);

    match (&left, &right) {
        (Value::Str(_), _) | (_, Value::Str(_)) => Value::Str(format!(
            "{}{}",
            to_js_string(heap, &left),
            to_js_string(heap, &right)
        )),
        _ => Value::Number(to_number(heap, &left) + to_number(heap, &right)),
    }
}

/// `===`
pub fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        // NaN !== NaN and 0 === -0 fall out of IEEE comparison
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Array(a), Value::Array(b))
        | (Value::Object(a), Value::Object(b))
        | (Value::Function(a), Value::Function(b)) => a == b,
        _ => false,
    }
}

/// `==`
pub fn loose_equals(heap: &Heap, left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
        (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
        (Value::Number(_), Value::Str(_)) | (Value::Str(_), Value::Number(_)) => {
            to_number(heap, left) == to_number(heap, right)
        }
        (Value::Bool(_), _) => loose_equals(heap, &Value::Number(to_number(heap, left)), right),
        (_, Value::Bool(_)) => loose_equals(heap, left, &Value::Number(to_number(heap, right))),
        (Value::Array(_) | Value::Object(_) | Value::Function(_), Value::Number(_) | Value::Str(_))
        | (Value::Number(_) | Value::Str(_), Value::Array(_) | Value::Object(_) | Value::Function(_)) => {
            loose_equals(heap, &to_primitive(heap, left), &to_primitive(heap, right))
        }
        _ => strict_equals(left, right),
    }
}

/// `<`, `<=`, `>`, `>=`: strings compare by code unit, everything else numerically
fn relational(heap: &Heap, left: &Value, right: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    let left = to_primitive(heap, left);
    let right = to_primitive(heap, right);

    let ordering = match (&left, &right) {
        (Value::Str(a), Value::Str(b)) => Some(a.encode_utf16().cmp(b.encode_utf16())),
        _ => to_number(heap, &left).partial_cmp(&to_number(heap, &right)),
    };

    // Any comparison involving NaN is false
    ordering.is_some_and(accept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_addition_and_concatenation() {
        let heap = Heap::new();
        assert_eq!(binary_op(&heap, BinOp::Add, &num(1.0), &num(2.0)), num(3.0));
        assert_eq!(
            binary_op(&heap, BinOp::Add, &"a".into(), &num(1.0)),
            Value::Str("a1".to_string())
        );
        assert_eq!(
            binary_op(&heap, BinOp::Add, &num(1.0), &Value::Undefined)
                .as_number()
                .map(f64::is_nan),
            Some(true)
        );
        assert_eq!(binary_op(&heap, BinOp::Add, &Value::Bool(true), &num(1.0)), num(2.0));
    }

    #[test]
    fn test_array_concatenation_joins() {
        let mut heap = Heap::new();
        let arr = heap.allocate_array(vec![num(1.0), Value::Null, "x".into()]);
        assert_eq!(to_js_string(&heap, &arr), "1,,x");
        assert_eq!(
            binary_op(&heap, BinOp::Add, &arr, &"!".into()),
            Value::Str("1,,x!".to_string())
        );
    }

    #[test]
    fn test_arithmetic_edge_cases() {
        let heap = Heap::new();
        assert_eq!(binary_op(&heap, BinOp::Div, &num(1.0), &num(0.0)), num(f64::INFINITY));
        assert_eq!(binary_op(&heap, BinOp::Mod, &num(-7.0), &num(3.0)), num(-1.0));
        assert_eq!(binary_op(&heap, BinOp::Mul, &"3".into(), &"4".into()), num(12.0));
    }

    #[test]
    fn test_equality() {
        let heap = Heap::new();
        assert!(loose_equals(&heap, &Value::Null, &Value::Undefined));
        assert!(!strict_equals(&Value::Null, &Value::Undefined));
        assert!(loose_equals(&heap, &num(1.0), &"1".into()));
        assert!(loose_equals(&heap, &Value::Bool(true), &num(1.0)));
        assert!(!loose_equals(&heap, &Value::Null, &num(0.0)));
        assert!(!strict_equals(&num(f64::NAN), &num(f64::NAN)));
        assert!(strict_equals(&num(0.0), &num(-0.0)));
    }

    #[test]
    fn test_reference_equality_is_identity() {
        let mut heap = Heap::new();
        let a = heap.allocate_array(vec![]);
        let b = heap.allocate_array(vec![]);
        assert!(strict_equals(&a, &a.clone()));
        assert!(!strict_equals(&a, &b));
        assert!(!loose_equals(&heap, &a, &b));
    }

    #[test]
    fn test_relational() {
        let heap = Heap::new();
        assert_eq!(binary_op(&heap, BinOp::Lt, &num(1.0), &num(2.0)), Value::Bool(true));
        assert_eq!(binary_op(&heap, BinOp::Lt, &"10".into(), &"9".into()), Value::Bool(true));
        assert_eq!(binary_op(&heap, BinOp::Lt, &"10".into(), &num(9.0)), Value::Bool(false));
        assert_eq!(
            binary_op(&heap, BinOp::Ge, &num(f64::NAN), &num(1.0)),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_to_number() {
        let heap = Heap::new();
        assert_eq!(to_number(&heap, &"  42 ".into()), 42.0);
        assert_eq!(to_number(&heap, &"".into()), 0.0);
        assert_eq!(to_number(&heap, &"0x1f".into()), 31.0);
        assert!(to_number(&heap, &"inf".into()).is_nan());
        assert!(to_number(&heap, &"abc".into()).is_nan());
        assert_eq!(to_number(&heap, &Value::Null), 0.0);
    }
}
