//! Memory model for the interpreter
//!
//! This module provides the core memory abstractions:
//! - [`value`]: Live runtime values as the interpreter manipulates them
//! - [`runtime_value`]: Immutable snapshot values recorded into steps, and `format_value`
//! - [`heap`]: Arena of arrays, objects and functions keyed by [`HeapId`]
//! - [`scope`]: Scope chain arena keyed by [`ScopeId`], with hoisting and TDZ states
//! - [`stack`]: Call stack frames
//!
//! # Identity
//!
//! Arrays, objects and functions live in the heap arena and are referred to
//! by id. Two structurally equal arrays have different ids; copying a value
//! copies the id, so both copies observe the same mutations. Scopes are
//! referenced the same way, which lets a function value point at the scope it
//! closed over without owning it.

pub mod heap;
pub mod runtime_value;
pub mod scope;
pub mod stack;
pub mod value;

use serde::Serialize;
use std::fmt;

/// Stable identity of a heap entity (array, object or function)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HeapId(pub usize);

/// Stable identity of a scope in the scope arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ScopeId(pub usize);

impl fmt::Display for HeapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}
