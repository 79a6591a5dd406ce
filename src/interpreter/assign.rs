//! Assignment and update expressions
//!
//! Writes through a variable or object property emit an `assignment` step;
//! writes through an array index emit `array-modify`. The step is emitted
//! after the write, so its snapshot shows the new state.

use crate::interpreter::constants::MAX_ARRAY_LENGTH;
use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::expressions::array_index;
use crate::interpreter::operators::{binary_op, to_number};
use crate::memory::value::Value;
use crate::parser::ast::{AssignOp, BinOp, Expr, SourceLocation, UpdateOp};
use crate::snapshot::StepType;

/// A resolved place that can be written
enum Place {
    Variable(String),
    Property { object: Value, key: String },
    Element { array: Value, index: usize },
}

impl Interpreter {
    pub(crate) fn evaluate_assignment(
        &mut self,
        op: AssignOp,
        target: &Expr,
        value: &Expr,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(target, location)?;

        let (result, description) = match op.binary() {
            None => {
                let value = match &place {
                    Place::Variable(name) | Place::Property { key: name, .. } => {
                        self.evaluate_named(value, name)?
                    }
                    Place::Element { .. } => self.evaluate_expr(value)?,
                };
                let description = format!("{} = {}", target, self.describe(&value));
                (value, description)
            }
            Some(binary) => {
                let current = self.read_place(&place, location)?;
                let rhs = self.evaluate_expr(value)?;
                let result = binary_op(&self.heap, binary, &current, &rhs);
                let description = format!(
                    "{} {} {} → {}",
                    target,
                    op.symbol(),
                    self.describe(&rhs),
                    self.describe(&result)
                );
                (result, description)
            }
        };

        let step_type = self.write_place(&place, result.clone(), location)?;
        self.emit_at(location, step_type, description)?;
        Ok(result)
    }

    /// `++x`, `x++`, `--x`, `x--`: evaluates to the new value when prefixed, the old one otherwise
    pub(crate) fn evaluate_update(
        &mut self,
        op: UpdateOp,
        prefix: bool,
        target: &Expr,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let place = self.resolve_place(target, location)?;
        let current = self.read_place(&place, location)?;
        let old = Value::Number(to_number(&self.heap, &current));
        let delta = match op {
            UpdateOp::Increment => BinOp::Add,
            UpdateOp::Decrement => BinOp::Sub,
        };
        let new = binary_op(&self.heap, delta, &old, &Value::Number(1.0));

        let step_type = self.write_place(&place, new.clone(), location)?;
        let description = format!(
            "{}{} → {}",
            target,
            op.symbol(),
            self.describe(&new)
        );
        self.emit_at(location, step_type, description)?;

        Ok(if prefix { new } else { old })
    }

    /// Evaluate the object and key parts of an assignment target, left to right
    fn resolve_place(&mut self, target: &Expr, location: SourceLocation) -> Result<Place, RuntimeError> {
        match target {
            Expr::Identifier(name, _) => Ok(Place::Variable(name.clone())),
            Expr::Member {
                object, property, ..
            } => {
                let object = self.evaluate_expr(object)?;
                self.property_place(object, property.clone(), location)
            }
            Expr::Index { object, index, .. } => {
                let object = self.evaluate_expr(object)?;
                let key = self.evaluate_expr(index)?;
                match object {
                    Value::Array(_) => match array_index(&key) {
                        Some(index) if index >= MAX_ARRAY_LENGTH => Err(RuntimeError::type_error(
                            format!("Array index {} is out of range", index),
                            location,
                        )),
                        Some(index) => Ok(Place::Element {
                            array: object,
                            index,
                        }),
                        None => Err(RuntimeError::type_error(
                            format!("Invalid array index {}", self.describe(&key)),
                            location,
                        )),
                    },
                    _ => {
                        let key = self.property_key(&key);
                        self.property_place(object, key, location)
                    }
                }
            }
            // The parser only produces assignable targets
            other => Err(RuntimeError::type_error(
                format!("Invalid assignment target '{}'", other),
                location,
            )),
        }
    }

    fn property_place(
        &self,
        object: Value,
        key: String,
        location: SourceLocation,
    ) -> Result<Place, RuntimeError> {
        match object {
            Value::Object(_) => Ok(Place::Property { object, key }),
            Value::Undefined | Value::Null => Err(RuntimeError::type_error(
                format!(
                    "Cannot set properties of {} (setting '{}')",
                    object.kind_name(),
                    key
                ),
                location,
            )),
            other => Err(RuntimeError::type_error(
                format!("Cannot set property '{}' on {} value", key, other.kind_name()),
                location,
            )),
        }
    }

    fn read_place(&mut self, place: &Place, location: SourceLocation) -> Result<Value, RuntimeError> {
        match place {
            Place::Variable(name) => self
                .scopes
                .read(self.scope, name)
                .map_err(|e| RuntimeError::from_scope(e, location)),
            Place::Property { object, key } => self.get_member(object, key, location),
            Place::Element { array, index } => Ok(array
                .heap_id()
                .and_then(|id| self.heap.array(id))
                .and_then(|elements| elements.get(*index))
                .cloned()
                .unwrap_or_default()),
        }
    }

    /// Store `value` and report which kind of step the write is
    fn write_place(
        &mut self,
        place: &Place,
        value: Value,
        location: SourceLocation,
    ) -> Result<StepType, RuntimeError> {
        match place {
            Place::Variable(name) => {
                self.scopes
                    .write(self.scope, name, value)
                    .map_err(|e| RuntimeError::from_scope(e, location))?;
                Ok(StepType::Assignment)
            }
            Place::Property { object, key } => {
                if let Some(id) = object.heap_id() {
                    self.heap.set_property(id, key, value);
                }
                Ok(StepType::Assignment)
            }
            Place::Element { array, index } => {
                if let Some(elements) = array.heap_id().and_then(|id| self.heap.array_mut(id)) {
                    // Writing past the end fills the gap with undefined
                    if *index >= elements.len() {
                        elements.resize(*index + 1, Value::Undefined);
                    }
                    elements[*index] = value;
                }
                Ok(StepType::ArrayModify)
            }
        }
    }
}
