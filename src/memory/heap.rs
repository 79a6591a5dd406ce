//! Heap arena for the interpreter
//!
//! This module owns every array, object and function created during a run.
//! Entities are addressed by [`HeapId`] and never freed: a run is bounded by
//! its step budget, and snapshots may refer to any id ever handed out.
//!
//! [`Heap::materialize`] turns a live [`Value`] into an immutable
//! [`RuntimeValue`] by deep-copying everything reachable from it.

use super::runtime_value::{RuntimeValue, MAX_SNAPSHOT_NODES};
use super::value::Value;
use super::{HeapId, ScopeId};
use crate::interpreter::ensure_sufficient_stack;
use crate::parser::ast::FunctionDef;
use std::rc::Rc;

/// A user-defined function value: its code plus the scope it closed over
#[derive(Debug, Clone)]
pub struct FunctionObject {
    pub name: String,
    pub def: Rc<FunctionDef>,
    pub closure: ScopeId,
}

impl FunctionObject {
    pub fn params(&self) -> &[String] {
        &self.def.params
    }
}

/// An entity stored in the heap
#[derive(Debug, Clone)]
pub enum HeapObject {
    Array(Vec<Value>),
    /// Properties in insertion order
    Object(Vec<(String, Value)>),
    Function(FunctionObject),
}

/// Arena of heap entities
#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<HeapObject>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, object: HeapObject) -> HeapId {
        let id = HeapId(self.objects.len());
        self.objects.push(object);
        id
    }

    pub fn allocate_array(&mut self, elements: Vec<Value>) -> Value {
        Value::Array(self.allocate(HeapObject::Array(elements)))
    }

    pub fn allocate_object(&mut self, properties: Vec<(String, Value)>) -> Value {
        Value::Object(self.allocate(HeapObject::Object(properties)))
    }

    pub fn allocate_function(&mut self, function: FunctionObject) -> Value {
        Value::Function(self.allocate(HeapObject::Function(function)))
    }

    pub fn get(&self, id: HeapId) -> Option<&HeapObject> {
        self.objects.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn array(&self, id: HeapId) -> Option<&Vec<Value>> {
        match self.objects.get(id.0) {
            Some(HeapObject::Array(elements)) => Some(elements),
            _ => None,
        }
    }

    pub fn array_mut(&mut self, id: HeapId) -> Option<&mut Vec<Value>> {
        match self.objects.get_mut(id.0) {
            Some(HeapObject::Array(elements)) => Some(elements),
            _ => None,
        }
    }

    pub fn object(&self, id: HeapId) -> Option<&Vec<(String, Value)>> {
        match self.objects.get(id.0) {
            Some(HeapObject::Object(properties)) => Some(properties),
            _ => None,
        }
    }

    pub fn object_mut(&mut self, id: HeapId) -> Option<&mut Vec<(String, Value)>> {
        match self.objects.get_mut(id.0) {
            Some(HeapObject::Object(properties)) => Some(properties),
            _ => None,
        }
    }

    pub fn function(&self, id: HeapId) -> Option<&FunctionObject> {
        match self.objects.get(id.0) {
            Some(HeapObject::Function(function)) => Some(function),
            _ => None,
        }
    }

    /// Read an object property, `undefined` when missing
    pub fn get_property(&self, id: HeapId, key: &str) -> Value {
        self.object(id)
            .and_then(|props| props.iter().find(|(k, _)| k == key))
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    }

    /// Write an object property, appending it when new
    pub fn set_property(&mut self, id: HeapId, key: &str, value: Value) {
        if let Some(props) = self.object_mut(id) {
            match props.iter_mut().find(|(k, _)| k == key) {
                Some((_, slot)) => *slot = value,
                None => props.push((key.to_string(), value)),
            }
        }
    }

    /// Deep-copy a live value into a snapshot value.
    ///
    /// A reference back to a structure already on the current path becomes
    /// [`RuntimeValue::Circular`]; shared but acyclic references are copied in full
    /// until [`MAX_SNAPSHOT_NODES`] structures have been copied, after which the
    /// remaining ones become [`RuntimeValue::Elided`].
    pub fn materialize(&self, value: &Value) -> RuntimeValue {
        let mut walk = Walk {
            path: Vec::new(),
            budget: MAX_SNAPSHOT_NODES,
        };
        self.materialize_inner(value, &mut walk)
    }

    fn materialize_inner(&self, value: &Value, walk: &mut Walk) -> RuntimeValue {
        match value {
            Value::Undefined => RuntimeValue::undefined(),
            Value::Null => RuntimeValue::null(),
            Value::Bool(b) => RuntimeValue::boolean(*b),
            Value::Number(n) => RuntimeValue::number(*n),
            Value::Str(s) => RuntimeValue::string(s.clone()),
            Value::Array(id) | Value::Object(id) | Value::Function(id) => {
                if walk.path.contains(id) {
                    return RuntimeValue::Circular { id: *id };
                }
                if walk.budget == 0 {
                    return RuntimeValue::Elided { id: *id };
                }
                walk.budget -= 1;
                ensure_sufficient_stack(|| self.materialize_entity(*id, walk))
            }
        }
    }

    fn materialize_entity(&self, id: HeapId, walk: &mut Walk) -> RuntimeValue {
        match self.get(id) {
            Some(HeapObject::Array(elements)) => {
                walk.path.push(id);
                let elements = elements
                    .iter()
                    .map(|e| self.materialize_inner(e, walk))
                    .collect();
                walk.path.pop();
                RuntimeValue::Array { id, elements }
            }
            Some(HeapObject::Object(properties)) => {
                walk.path.push(id);
                let properties = properties
                    .iter()
                    .map(|(k, v)| (k.clone(), self.materialize_inner(v, walk)))
                    .collect();
                walk.path.pop();
                RuntimeValue::Object { id, properties }
            }
            Some(HeapObject::Function(function)) => RuntimeValue::Function {
                id,
                name: function.name.clone(),
                param_names: function.def.params.clone(),
                closure_scope: function.closure,
            },
            // Ids only come from this arena
            None => RuntimeValue::undefined(),
        }
    }
}

/// State of one `materialize` call
struct Walk {
    /// Structures currently being copied, outermost first
    path: Vec<HeapId>,
    /// Structures that may still be copied
    budget: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_ids_for_equal_arrays() {
        let mut heap = Heap::new();
        let a = heap.allocate_array(vec![Value::Number(1.0)]);
        let b = heap.allocate_array(vec![Value::Number(1.0)]);
        assert_ne!(a.heap_id(), b.heap_id());
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn test_materialize_is_a_copy() {
        let mut heap = Heap::new();
        let a = heap.allocate_array(vec![Value::Number(1.0)]);
        let before = heap.materialize(&a);

        let id = a.heap_id().unwrap();
        heap.array_mut(id).unwrap().push(Value::Number(2.0));
        let after = heap.materialize(&a);

        assert_eq!(before.elements().unwrap().len(), 1);
        assert_eq!(after.elements().unwrap().len(), 2);
        assert_eq!(before.id(), after.id());
    }

    #[test]
    fn test_materialize_cycle() {
        let mut heap = Heap::new();
        let obj = heap.allocate_object(vec![]);
        let id = obj.heap_id().unwrap();
        heap.set_property(id, "self", obj.clone());

        match heap.materialize(&obj) {
            RuntimeValue::Object { properties, .. } => {
                assert_eq!(properties[0].1, RuntimeValue::Circular { id });
            }
            other => panic!("Expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_properties_keep_insertion_order() {
        let mut heap = Heap::new();
        let obj = heap.allocate_object(vec![]);
        let id = obj.heap_id().unwrap();
        heap.set_property(id, "b", Value::Number(1.0));
        heap.set_property(id, "a", Value::Number(2.0));
        heap.set_property(id, "b", Value::Number(3.0));

        let keys: Vec<_> = heap.object(id).unwrap().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(heap.get_property(id, "b"), Value::Number(3.0));
        assert_eq!(heap.get_property(id, "missing"), Value::Undefined);
    }

    #[test]
    fn test_materialize_shared_structure_is_bounded() {
        fn structures(value: &RuntimeValue) -> usize {
            match value {
                RuntimeValue::Array { elements, .. } => {
                    1 + elements.iter().map(structures).sum::<usize>()
                }
                _ => 0,
            }
        }
        fn has_elided(value: &RuntimeValue) -> bool {
            match value {
                RuntimeValue::Elided { .. } => true,
                RuntimeValue::Array { elements, .. } => elements.iter().any(has_elided),
                _ => false,
            }
        }

        // Each level holds the previous one twice: 2^40 paths, 41 arrays
        let mut heap = Heap::new();
        let mut value = heap.allocate_array(vec![Value::Number(0.0)]);
        for _ in 0..40 {
            value = heap.allocate_array(vec![value.clone(), value]);
        }

        let snapshot = heap.materialize(&value);
        assert_eq!(structures(&snapshot), MAX_SNAPSHOT_NODES);
        assert!(has_elided(&snapshot));

        // A small shared structure is still copied in full
        let leaf = heap.allocate_array(vec![Value::Number(1.0)]);
        let pair = heap.allocate_array(vec![leaf.clone(), leaf]);
        let snapshot = heap.materialize(&pair);
        assert_eq!(structures(&snapshot), 3);
        assert!(!has_elided(&snapshot));
    }
}
