//! Expression evaluation
//!
//! [`Interpreter::evaluate_expr`] dispatches on every [`Expr`] variant.
//! Assignments and `++`/`--` live in [`assign`](super::assign), calls in
//! [`calls`](super::calls), and operator semantics in
//! [`operators`](super::operators).
//!
//! Only comparisons and array reads emit steps of their own here; arithmetic
//! and logical sub-expressions are folded into the step of their statement.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::ensure_sufficient_stack;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::operators::{binary_op, to_js_string, to_number};
use crate::memory::heap::FunctionObject;
use crate::memory::scope::{Binding, ScopeKind};
use crate::memory::value::{format_number, Value};
use crate::memory::HeapId;
use crate::parser::ast::{
    BinOp, Expr, FunctionDef, LogicalOp, PropertyDef, SourceLocation, UnaryOp,
};
use crate::snapshot::StepType;
use std::rc::Rc;

impl Interpreter {
    pub(crate) fn evaluate_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        ensure_sufficient_stack(|| self.evaluate_expr_inner(expr))
    }

    /// Evaluate the right-hand side of `name = expr`, naming anonymous functions after `name`
    pub(crate) fn evaluate_named(&mut self, expr: &Expr, name: &str) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Function { def, .. } if def.name.is_none() => Ok(self.create_function(def, name)),
            _ => self.evaluate_expr(expr),
        }
    }

    fn evaluate_expr_inner(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Number(n, _) => Ok(Value::Number(*n)),
            Expr::Str(s, _) => Ok(Value::Str(s.clone())),
            Expr::Bool(b, _) => Ok(Value::Bool(*b)),
            Expr::Null(_) => Ok(Value::Null),
            Expr::Undefined(_) => Ok(Value::Undefined),

            Expr::Identifier(name, location) => self.read_identifier(name, *location),

            Expr::Array { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate_expr(element)?);
                }
                Ok(self.heap.allocate_array(values))
            }

            Expr::Object { properties, .. } => self.evaluate_object_literal(properties),

            Expr::Function { def, .. } => {
                let name = def.name.clone().unwrap_or_default();
                Ok(self.create_function(def, &name))
            }

            Expr::Unary { op, operand, .. } => self.evaluate_unary(*op, operand),

            Expr::Update {
                op,
                prefix,
                target,
                location,
            } => self.evaluate_update(*op, *prefix, target, *location),

            Expr::Binary {
                op,
                left,
                right,
                location,
            } => self.evaluate_binary(*op, left, right, *location),

            Expr::Logical {
                op, left, right, ..
            } => {
                let left = self.evaluate_expr(left)?;
                let short_circuits = match op {
                    LogicalOp::And => !left.is_truthy(),
                    LogicalOp::Or => left.is_truthy(),
                };
                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate_expr(right)
                }
            }

            Expr::Conditional {
                condition,
                consequent,
                alternate,
                ..
            } => {
                if self.evaluate_expr(condition)?.is_truthy() {
                    self.evaluate_expr(consequent)
                } else {
                    self.evaluate_expr(alternate)
                }
            }

            Expr::Assign {
                op,
                target,
                value,
                location,
            } => self.evaluate_assignment(*op, target, value, *location),

            Expr::Member {
                object,
                property,
                location,
            } => {
                if let Some(value) = self.read_builtin_member(object, property, *location)? {
                    return Ok(value);
                }
                let target = self.evaluate_expr(object)?;
                self.get_member(&target, property, *location)
            }

            Expr::Index {
                object,
                index,
                location,
            } => {
                let target = self.evaluate_expr(object)?;
                let key = self.evaluate_expr(index)?;
                self.get_index(object, &target, &key, *location)
            }

            Expr::Call {
                callee,
                args,
                location,
            } => self.evaluate_call(callee, args, *location),
        }
    }

    fn read_identifier(&mut self, name: &str, location: SourceLocation) -> Result<Value, RuntimeError> {
        match self.scopes.read(self.scope, name) {
            Ok(value) => Ok(value),
            Err(err) => match name {
                "NaN" => Ok(Value::Number(f64::NAN)),
                "Infinity" => Ok(Value::Number(f64::INFINITY)),
                "console" | "Math" => Err(RuntimeError::type_error(
                    format!("'{}' can only be used through its members", name),
                    location,
                )),
                _ => Err(RuntimeError::from_scope(err, location)),
            },
        }
    }

    /// Create a function value closing over the current scope.
    ///
    /// A named function expression also sees its own name, bound in a scope
    /// of its own between the closure and the surrounding code.
    pub(crate) fn create_function(&mut self, def: &Rc<FunctionDef>, name: &str) -> Value {
        let own_name = def.name.as_deref().filter(|_| !def.is_arrow);
        let closure = match own_name {
            Some(_) => self.scopes.create_scope(ScopeKind::Block, Some(self.scope)),
            None => self.scope,
        };

        let function = self.heap.allocate_function(FunctionObject {
            name: name.to_string(),
            def: def.clone(),
            closure,
        });

        if let Some(own_name) = own_name {
            self.scopes
                .declare_initialized(closure, own_name, Binding::Function, function.clone());
        }

        function
    }

    fn evaluate_object_literal(&mut self, properties: &[PropertyDef]) -> Result<Value, RuntimeError> {
        let object = self.heap.allocate_object(Vec::new());
        let Some(id) = object.heap_id() else {
            return Ok(object);
        };

        for prop in properties {
            let value = self.evaluate_named(&prop.value, &prop.key)?;
            self.heap.set_property(id, &prop.key, value);
        }
        Ok(object)
    }

    fn evaluate_unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<Value, RuntimeError> {
        if op == UnaryOp::Typeof {
            // `typeof` of an undeclared name is "undefined", not an error
            if let Expr::Identifier(name, _) = operand {
                if self.scopes.resolve(self.scope, name).is_none() {
                    let kind = match name.as_str() {
                        "NaN" | "Infinity" => "number",
                        "console" | "Math" => "object",
                        _ => "undefined",
                    };
                    return Ok(Value::Str(kind.to_string()));
                }
            }
            let value = self.evaluate_expr(operand)?;
            return Ok(Value::Str(value.type_of().to_string()));
        }

        let value = self.evaluate_expr(operand)?;
        Ok(match op {
            UnaryOp::Neg => Value::Number(-to_number(&self.heap, &value)),
            UnaryOp::Plus => Value::Number(to_number(&self.heap, &value)),
            UnaryOp::Not => Value::Bool(!value.is_truthy()),
            UnaryOp::Typeof => Value::Str(value.type_of().to_string()),
        })
    }

    fn evaluate_binary(
        &mut self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let left = self.evaluate_expr(left)?;
        let right = self.evaluate_expr(right)?;
        let result = binary_op(&self.heap, op, &left, &right);

        if op.is_comparison() {
            let description = format!(
                "Compare {} {} {} → {}",
                self.describe(&left),
                op.symbol(),
                self.describe(&right),
                self.describe(&result)
            );
            self.emit_at(location, StepType::Comparison, description)?;
        }

        Ok(result)
    }

    /// `Math.PI` and `Math.E`; `None` when `object` is not the built-in `Math`
    fn read_builtin_member(
        &self,
        object: &Expr,
        property: &str,
        location: SourceLocation,
    ) -> Result<Option<Value>, RuntimeError> {
        let Expr::Identifier(name, _) = object else {
            return Ok(None);
        };
        if self.scopes.resolve(self.scope, name).is_some() {
            return Ok(None);
        }

        match (name.as_str(), property) {
            ("Math", "PI") => Ok(Some(Value::Number(std::f64::consts::PI))),
            ("Math", "E") => Ok(Some(Value::Number(std::f64::consts::E))),
            ("Math", _) | ("console", _) => Err(RuntimeError::type_error(
                format!("{}.{} is not supported as a value", name, property),
                location,
            )),
            _ => Ok(None),
        }
    }

    /// `target.property`
    pub(crate) fn get_member(
        &self,
        target: &Value,
        property: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match target {
            Value::Undefined | Value::Null => Err(RuntimeError::type_error(
                format!(
                    "Cannot read properties of {} (reading '{}')",
                    target.kind_name(),
                    property
                ),
                location,
            )),
            Value::Str(s) if property == "length" => {
                Ok(Value::Number(s.encode_utf16().count() as f64))
            }
            Value::Array(id) if property == "length" => Ok(Value::Number(
                self.heap.array(*id).map_or(0, Vec::len) as f64,
            )),
            Value::Object(id) => Ok(self.heap.get_property(*id, property)),
            Value::Function(id) => {
                let function = self.heap.function(*id);
                Ok(match property {
                    "name" => Value::Str(function.map(|f| f.name.clone()).unwrap_or_default()),
                    "length" => Value::Number(function.map_or(0, |f| f.params().len()) as f64),
                    _ => Value::Undefined,
                })
            }
            // Other properties of primitives and arrays are not modeled
            _ => Ok(Value::Undefined),
        }
    }

    /// `target[key]`. Reading an array element emits an `array-access` step.
    fn get_index(
        &mut self,
        object: &Expr,
        target: &Value,
        key: &Value,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match target {
            Value::Array(id) => {
                let value = match array_index(key) {
                    Some(i) => self.element_at(*id, i),
                    None => match key {
                        Value::Str(s) if s == "length" => self.get_member(target, "length", location)?,
                        _ => Value::Undefined,
                    },
                };
                let description = format!(
                    "Read {}[{}] → {}",
                    object,
                    self.describe(key),
                    self.describe(&value)
                );
                self.emit_at(location, StepType::ArrayAccess, description)?;
                Ok(value)
            }
            Value::Str(s) => Ok(array_index(key)
                .and_then(|i| {
                    let units: Vec<u16> = s.encode_utf16().collect();
                    units
                        .get(i)
                        .map(|unit| String::from_utf16_lossy(std::slice::from_ref(unit)))
                })
                .map(Value::Str)
                .unwrap_or(Value::Undefined)),
            Value::Object(id) => Ok(self.heap.get_property(*id, &self.property_key(key))),
            _ => Err(RuntimeError::type_error(
                format!("Cannot index into {} value '{}'", target.kind_name(), object),
                location,
            )),
        }
    }

    fn element_at(&self, id: HeapId, index: usize) -> Value {
        self.heap
            .array(id)
            .and_then(|elements| elements.get(index))
            .cloned()
            .unwrap_or_default()
    }

    /// Property name for an object key expression
    pub(crate) fn property_key(&self, key: &Value) -> String {
        match key {
            Value::Str(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            other => to_js_string(&self.heap, other),
        }
    }
}

/// A non-negative integer index, as arrays accept
pub(crate) fn array_index(key: &Value) -> Option<usize> {
    let n = match key {
        Value::Number(n) => *n,
        Value::Str(s) => s.parse::<f64>().ok()?,
        _ => return None,
    };
    if n >= 0.0 && n.fract() == 0.0 && n < u32::MAX as f64 {
        Some(n as usize)
    } else {
        None
    }
}
