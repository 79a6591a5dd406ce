//! Call stack implementation
//!
//! This module provides the call stack for function execution:
//! - [`CallStack`]: The call stack containing frames, with a depth ceiling
//! - [`StackFrame`]: A single function's activation record
//!
//! A frame does not own variables. Parameters and locals live in the scope
//! chain; the frame remembers which scope is the function's own and which
//! scope was current at the call site so both can be found again.

use super::{HeapId, ScopeId};

/// Stack frame for a function call
#[derive(Debug, Clone, PartialEq)]
pub struct StackFrame {
    pub function_name: String,
    pub function_id: HeapId,
    pub param_names: Vec<String>,
    /// The scope created for this call's parameters and body
    pub function_scope: ScopeId,
    /// Scope that was current when the call was evaluated
    pub caller_scope: ScopeId,
    pub caller_line: usize,
}

/// The call stack
#[derive(Debug, Clone)]
pub struct CallStack {
    frames: Vec<StackFrame>,
    max_depth: usize,
}

impl CallStack {
    pub fn new(max_depth: usize) -> Self {
        CallStack {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a new stack frame
    pub fn push(&mut self, frame: StackFrame) {
        self.frames.push(frame);
    }

    /// Pop the top stack frame
    pub fn pop(&mut self) -> Option<StackFrame> {
        self.frames.pop()
    }

    /// Get the current (top) frame
    pub fn current_frame(&self) -> Option<&StackFrame> {
        self.frames.last()
    }

    /// Get all frames, bottom first
    pub fn frames(&self) -> &[StackFrame] {
        &self.frames
    }

    /// Get the depth of the call stack
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Another push would exceed the depth ceiling
    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.max_depth
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
