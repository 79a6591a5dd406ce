//! Snapshot values recorded into execution steps
//!
//! A [`RuntimeValue`] is a deep, immutable copy of a live [`Value`](super::value::Value)
//! taken at the moment a step is emitted. Reference kinds keep their heap
//! [`HeapId`], so two snapshots with the same id show the same entity at two
//! points in time.
//!
//! [`format_value`] renders a snapshot to text for the console and the panes.

use super::value::format_number;
use super::{HeapId, ScopeId};
use serde::Serialize;

/// Nesting depth past which structures render as `[Array]` / `[Object]`
pub const MAX_FORMAT_DEPTH: usize = 4;

/// Structures copied into one snapshot value before the rest are elided
pub const MAX_SNAPSHOT_NODES: usize = 4096;

/// Primitive snapshot payload, serialized as `{ dataType, value }`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "dataType", content = "value", rename_all = "lowercase")]
pub enum Primitive {
    Number(f64),
    String(String),
    Boolean(bool),
    Undefined,
    Null,
}

/// Immutable snapshot of a runtime value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RuntimeValue {
    Primitive(Primitive),
    Array {
        id: HeapId,
        elements: Vec<RuntimeValue>,
    },
    Object {
        id: HeapId,
        /// Insertion order preserved
        properties: Vec<(String, RuntimeValue)>,
    },
    Function {
        id: HeapId,
        name: String,
        #[serde(rename = "paramNames")]
        param_names: Vec<String>,
        #[serde(rename = "closureScope")]
        closure_scope: ScopeId,
    },
    /// Back-reference to an enclosing structure of the same snapshot
    Circular { id: HeapId },
    /// Structure left out after the snapshot ran past [`MAX_SNAPSHOT_NODES`]
    Elided { id: HeapId },
}

impl RuntimeValue {
    pub fn undefined() -> Self {
        RuntimeValue::Primitive(Primitive::Undefined)
    }

    pub fn null() -> Self {
        RuntimeValue::Primitive(Primitive::Null)
    }

    pub fn number(n: f64) -> Self {
        RuntimeValue::Primitive(Primitive::Number(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        RuntimeValue::Primitive(Primitive::String(s.into()))
    }

    pub fn boolean(b: bool) -> Self {
        RuntimeValue::Primitive(Primitive::Boolean(b))
    }

    /// Heap identity, for reference kinds
    pub fn id(&self) -> Option<HeapId> {
        match self {
            RuntimeValue::Primitive(_) => None,
            RuntimeValue::Array { id, .. }
            | RuntimeValue::Object { id, .. }
            | RuntimeValue::Function { id, .. }
            | RuntimeValue::Circular { id }
            | RuntimeValue::Elided { id } => Some(*id),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, RuntimeValue::Array { .. })
    }

    /// Elements of an array snapshot
    pub fn elements(&self) -> Option<&[RuntimeValue]> {
        match self {
            RuntimeValue::Array { elements, .. } => Some(elements),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RuntimeValue::Primitive(Primitive::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Type label shown next to variables in the panes
    pub fn type_label(&self) -> &'static str {
        match self {
            RuntimeValue::Primitive(Primitive::Number(_)) => "number",
            RuntimeValue::Primitive(Primitive::String(_)) => "string",
            RuntimeValue::Primitive(Primitive::Boolean(_)) => "boolean",
            RuntimeValue::Primitive(Primitive::Undefined) => "undefined",
            RuntimeValue::Primitive(Primitive::Null) => "null",
            RuntimeValue::Array { .. } => "array",
            RuntimeValue::Object { .. } => "object",
            RuntimeValue::Function { .. } => "function",
            RuntimeValue::Circular { .. } => "circular",
            RuntimeValue::Elided { .. } => "elided",
        }
    }
}

/// Render a value to a display string.
///
/// With `for_display` set, top-level strings are quoted (variable panes);
/// without it they print raw (console output). Strings nested inside
/// arrays and objects are always quoted.
pub fn format_value(value: &RuntimeValue, for_display: bool) -> String {
    let mut out = String::new();
    let mut visited = Vec::new();
    write_value(&mut out, value, for_display, 0, &mut visited);
    out
}

fn write_value(
    out: &mut String,
    value: &RuntimeValue,
    quote_strings: bool,
    depth: usize,
    visited: &mut Vec<HeapId>,
) {
    if let Some(id) = value.id() {
        if visited.contains(&id) {
            out.push_str("[Circular]");
            return;
        }
    }

    match value {
        RuntimeValue::Primitive(p) => write_primitive(out, p, quote_strings),
        RuntimeValue::Circular { .. } => out.push_str("[Circular]"),
        RuntimeValue::Elided { .. } => out.push_str("[...]"),
        RuntimeValue::Function { name, param_names, .. } => {
            if quote_strings {
                out.push_str(&format!("function {}({})", name, param_names.join(", ")));
            } else if name.is_empty() {
                out.push_str("[Function (anonymous)]");
            } else {
                out.push_str(&format!("[Function: {}]", name));
            }
        }
        RuntimeValue::Array { id, elements } => {
            if depth >= MAX_FORMAT_DEPTH {
                out.push_str("[Array]");
                return;
            }
            visited.push(*id);
            out.push('[');
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, element, true, depth + 1, visited);
            }
            out.push(']');
            visited.pop();
        }
        RuntimeValue::Object { id, properties } => {
            if depth >= MAX_FORMAT_DEPTH {
                out.push_str("[Object]");
                return;
            }
            if properties.is_empty() {
                out.push_str("{}");
                return;
            }
            visited.push(*id);
            out.push_str("{ ");
            for (i, (key, prop)) in properties.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(key);
                out.push_str(": ");
                write_value(out, prop, true, depth + 1, visited);
            }
            out.push_str(" }");
            visited.pop();
        }
    }
}

fn write_primitive(out: &mut String, p: &Primitive, quote_strings: bool) {
    match p {
        Primitive::Number(n) => out.push_str(&format_number(*n)),
        Primitive::String(s) if quote_strings => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
        Primitive::String(s) => out.push_str(s),
        Primitive::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Primitive::Undefined => out.push_str("undefined"),
        Primitive::Null => out.push_str("null"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array(id: usize, elements: Vec<RuntimeValue>) -> RuntimeValue {
        RuntimeValue::Array {
            id: HeapId(id),
            elements,
        }
    }

    #[test]
    fn test_primitives() {
        assert_eq!(format_value(&RuntimeValue::number(3.0), true), "3");
        assert_eq!(format_value(&RuntimeValue::string("hi"), true), "\"hi\"");
        assert_eq!(format_value(&RuntimeValue::string("hi"), false), "hi");
        assert_eq!(format_value(&RuntimeValue::undefined(), false), "undefined");
        assert_eq!(format_value(&RuntimeValue::null(), true), "null");
    }

    #[test]
    fn test_arrays_quote_nested_strings() {
        let value = array(
            1,
            vec![RuntimeValue::number(1.0), RuntimeValue::string("a")],
        );
        assert_eq!(format_value(&value, false), "[1, \"a\"]");
        assert_eq!(format_value(&array(2, vec![]), true), "[]");
    }

    #[test]
    fn test_objects() {
        let value = RuntimeValue::Object {
            id: HeapId(3),
            properties: vec![
                ("x".to_string(), RuntimeValue::number(1.0)),
                ("tags".to_string(), array(4, vec![RuntimeValue::boolean(true)])),
            ],
        };
        assert_eq!(format_value(&value, true), "{ x: 1, tags: [true] }");
    }

    #[test]
    fn test_circular_marker() {
        let value = array(
            7,
            vec![RuntimeValue::number(1.0), RuntimeValue::Circular { id: HeapId(7) }],
        );
        assert_eq!(format_value(&value, true), "[1, [Circular]]");
    }

    #[test]
    fn test_revisited_id_renders_circular() {
        // A hand-built snapshot that nests the same id inside itself
        let inner = array(9, vec![]);
        let outer = array(9, vec![inner]);
        assert_eq!(format_value(&outer, true), "[[Circular]]");
    }

    #[test]
    fn test_depth_limit() {
        let mut value = array(100, vec![RuntimeValue::number(0.0)]);
        for id in 0..6 {
            value = array(id, vec![value]);
        }
        assert_eq!(format_value(&value, true), "[[[[[Array]]]]]");
    }

    #[test]
    fn test_functions() {
        let f = RuntimeValue::Function {
            id: HeapId(1),
            name: "add".to_string(),
            param_names: vec!["a".to_string(), "b".to_string()],
            closure_scope: ScopeId(0),
        };
        assert_eq!(format_value(&f, true), "function add(a, b)");
        assert_eq!(format_value(&f, false), "[Function: add]");
    }
}
