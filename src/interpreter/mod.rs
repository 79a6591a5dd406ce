//! Tree-walking interpreter
//!
//! This module provides the core execution logic:
//! - [`engine`]: Interpreter state, step emission and snapshot capture
//! - [`errors`]: Runtime error types
//! - [`constants`]: Default budgets and stack-growth sizes
//! - `hoisting`: Declaration pre-pass per function body and block
//! - `statements`, `loops`: Statement execution
//! - `expressions`, `assign`, `operators`: Expression evaluation
//! - `calls`, `builtins`: User function calls, `console`, `Math` and array methods
//!
//! # Execution Model
//!
//! A run executes the whole program eagerly. Each observable operation emits
//! one [`ExecutionStep`](crate::snapshot::ExecutionStep) holding a deep copy of
//! the scope chain, call stack and console output at that moment, so stepping
//! backward later is an index lookup rather than a re-execution.
//!
//! Runaway programs are stopped by two ceilings: the step budget and the call
//! depth. Both end the run with an `error` step instead of hanging or
//! overflowing the host stack.

mod assign;
mod builtins;
mod calls;
pub mod constants;
pub mod engine;
pub mod errors;
mod expressions;
mod hoisting;
mod loops;
pub mod operators;
mod statements;

pub use engine::Interpreter;
pub use errors::RuntimeError;

use constants::{RED_ZONE, STACK_PER_RECURSION};

/// Ensure sufficient stack space is available before executing `f`.
///
/// Deeply nested expressions and recursive user functions recurse on the host
/// stack; `stacker` grows it on demand.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
