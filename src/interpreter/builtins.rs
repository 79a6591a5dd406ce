//! Built-in function implementations
//!
//! This module provides the functions handled by the interpreter itself rather
//! than defined in user code. None of them push a call frame.
//!
//! # Supported Built-ins
//!
//! - `console.log(...)` (`info`, `warn` and `error` are aliases): prints its
//!   arguments joined by a space
//! - `Math.floor`, `ceil`, `round`, `trunc`, `abs`, `sqrt`, `pow`, `min`, `max`
//! - Array methods: `push`, `pop`, `shift`, `unshift`, `indexOf`, `includes`,
//!   `join`, `slice`
//!
//! # Implementation Notes
//!
//! - `Math.random` is rejected so that every run of a program is identical
//! - Mutating array methods emit `array-modify` after the mutation; searches
//!   emit `array-access`

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::operators::{strict_equals, to_js_string, to_number};
use crate::memory::heap::Heap;
use crate::memory::runtime_value::format_value;
use crate::memory::value::Value;
use crate::memory::HeapId;
use crate::parser::ast::{Expr, SourceLocation};
use crate::snapshot::StepType;

impl Interpreter {
    pub(crate) fn call_console(
        &mut self,
        method: &str,
        argv: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if !matches!(method, "log" | "info" | "warn" | "error") {
            return Err(RuntimeError::type_error(
                format!("console.{} is not a function", method),
                location,
            ));
        }

        let text = argv
            .iter()
            .map(|v| format_value(&self.heap.materialize(v), false))
            .collect::<Vec<_>>()
            .join(" ");

        self.console.log(text.clone(), location);
        self.emit_at(location, StepType::Statement, format!("console.{}: {}", method, text))?;
        Ok(Value::Undefined)
    }

    pub(crate) fn call_math(
        &mut self,
        method: &str,
        argv: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let numbers: Vec<f64> = argv.iter().map(|v| to_number(&self.heap, v)).collect();
        let arg = |i: usize| numbers.get(i).copied().unwrap_or(f64::NAN);

        let result = match method {
            "floor" => arg(0).floor(),
            "ceil" => arg(0).ceil(),
            "round" => js_round(arg(0)),
            "trunc" => arg(0).trunc(),
            "abs" => arg(0).abs(),
            "sqrt" => arg(0).sqrt(),
            "pow" => arg(0).powf(arg(1)),
            "min" => numbers.iter().copied().fold(f64::INFINITY, js_min),
            "max" => numbers.iter().copied().fold(f64::NEG_INFINITY, js_max),
            "random" => {
                return Err(RuntimeError::type_error(
                    "Math.random is not supported in a deterministic trace",
                    location,
                ))
            }
            _ => {
                return Err(RuntimeError::type_error(
                    format!("Math.{} is not a function", method),
                    location,
                ))
            }
        };

        Ok(Value::Number(result))
    }

    pub(crate) fn call_array_method(
        &mut self,
        id: HeapId,
        receiver: &Expr,
        method: &str,
        argv: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let arguments = argv
            .iter()
            .map(|v| self.describe(v))
            .collect::<Vec<_>>()
            .join(", ");
        let call = format!("{}.{}({})", receiver, method, arguments);

        let Some(elements) = self.heap.array_mut(id) else {
            return Err(RuntimeError::type_error(
                format!("{} is not an array", receiver),
                location,
            ));
        };

        match method {
            "push" => {
                elements.extend(argv);
                let length = Value::Number(elements.len() as f64);
                self.emit_modify(&call, &length, location)?;
                Ok(length)
            }
            "pop" => {
                let removed = elements.pop().unwrap_or_default();
                self.emit_modify(&call, &removed, location)?;
                Ok(removed)
            }
            "shift" => {
                let removed = if elements.is_empty() {
                    Value::Undefined
                } else {
                    elements.remove(0)
                };
                self.emit_modify(&call, &removed, location)?;
                Ok(removed)
            }
            "unshift" => {
                elements.splice(0..0, argv);
                let length = Value::Number(elements.len() as f64);
                self.emit_modify(&call, &length, location)?;
                Ok(length)
            }
            "indexOf" => {
                let needle = argv.first().cloned().unwrap_or_default();
                let found = elements
                    .iter()
                    .position(|e| strict_equals(e, &needle))
                    .map_or(-1.0, |i| i as f64);
                let result = Value::Number(found);
                self.emit_access(&call, &result, location)?;
                Ok(result)
            }
            "includes" => {
                let needle = argv.first().cloned().unwrap_or_default();
                // SameValueZero: NaN finds NaN
                let found = elements.iter().any(|e| match (e, &needle) {
                    (Value::Number(a), Value::Number(b)) if a.is_nan() && b.is_nan() => true,
                    _ => strict_equals(e, &needle),
                });
                let result = Value::Bool(found);
                self.emit_access(&call, &result, location)?;
                Ok(result)
            }
            "join" => {
                let parts: Vec<Value> = elements.clone();
                let separator = match argv.first() {
                    None | Some(Value::Undefined) => ",".to_string(),
                    Some(sep) => to_js_string(&self.heap, sep),
                };
                let joined = parts
                    .iter()
                    .map(|e| match e {
                        Value::Undefined | Value::Null => String::new(),
                        other => to_js_string(&self.heap, other),
                    })
                    .collect::<Vec<_>>()
                    .join(&separator);
                Ok(Value::Str(joined))
            }
            "slice" => {
                let len = elements.len();
                let start = relative_index(argv.first(), 0, len, &self.heap);
                let end = relative_index(argv.get(1), len, len, &self.heap);
                let copied = self
                    .heap
                    .array(id)
                    .map(|elements| elements[start..end.max(start)].to_vec())
                    .unwrap_or_default();
                Ok(self.heap.allocate_array(copied))
            }
            _ => Err(RuntimeError::type_error(
                format!("{}.{} is not a function", receiver, method),
                location,
            )),
        }
    }

    fn emit_modify(&mut self, call: &str, result: &Value, location: SourceLocation) -> Result<(), RuntimeError> {
        let description = format!("{} → {}", call, self.describe(result));
        self.emit_at(location, StepType::ArrayModify, description)
    }

    fn emit_access(&mut self, call: &str, result: &Value, location: SourceLocation) -> Result<(), RuntimeError> {
        let description = format!("{} → {}", call, self.describe(result));
        self.emit_at(location, StepType::ArrayAccess, description)
    }
}

/// Resolve a `slice` bound: negative counts from the end, the result is clamped to `[0, len]`
fn relative_index(
    arg: Option<&Value>,
    default: usize,
    len: usize,
    heap: &Heap,
) -> usize {
    let n = match arg {
        None | Some(Value::Undefined) => return default,
        Some(value) => to_number(heap, value),
    };
    if n.is_nan() {
        return 0;
    }

    let n = n.trunc();
    if n < 0.0 {
        (len as f64 + n).max(0.0) as usize
    } else {
        n.min(len as f64) as usize
    }
}

/// `Math.round`: halves round toward +Infinity, unlike `f64::round`.
/// Adding 0.5 before flooring would carry 0.49999999999999994 up to 1.
fn js_round(n: f64) -> f64 {
    let floor = n.floor();
    if n - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

/// `Math.min` propagates NaN, unlike `f64::min`
fn js_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

fn js_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_halves_toward_positive_infinity() {
        assert_eq!(js_round(2.5), 3.0);
        assert_eq!(js_round(-2.5), -2.0);
        assert_eq!(js_round(-2.6), -3.0);
        assert_eq!(js_round(0.49999999999999994), 0.0);
        assert_eq!(js_round(4_503_599_627_370_497.0), 4_503_599_627_370_497.0);
        assert_eq!(js_round(f64::INFINITY), f64::INFINITY);
        assert!(js_round(f64::NAN).is_nan());
    }

    #[test]
    fn test_min_max_propagate_nan() {
        assert!(js_min(1.0, f64::NAN).is_nan());
        assert!(js_max(f64::NAN, 1.0).is_nan());
        assert_eq!(js_min(-0.5, 2.0), -0.5);
    }
}
