//! Execution step read model
//!
//! Every observable operation of a run produces one [`ExecutionStep`]: a deep
//! copy of the scope chain and call stack at that moment, plus the console
//! lines printed since the previous step. Steps are plain data; nothing in
//! them points back into the live interpreter.
//!
//! - [`Console`]: captures `console.log` output and hands out per-step deltas
//! - [`trace`]: the ordered step list of one run and the store that holds it

pub mod trace;

use crate::memory::runtime_value::{format_value, RuntimeValue};
use crate::memory::scope::{Binding, ScopeKind, SlotStatus};
use crate::memory::ScopeId;
use crate::parser::ast::SourceLocation;
use serde::Serialize;
use std::fmt;

/// Kind of observable operation a step records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepType {
    Statement,
    Assignment,
    Comparison,
    ArrayAccess,
    ArrayModify,
    Call,
    Return,
    LoopIteration,
    Error,
}

impl StepType {
    pub fn label(self) -> &'static str {
        match self {
            StepType::Statement => "statement",
            StepType::Assignment => "assignment",
            StepType::Comparison => "comparison",
            StepType::ArrayAccess => "array-access",
            StepType::ArrayModify => "array-modify",
            StepType::Call => "call",
            StepType::Return => "return",
            StepType::LoopIteration => "loop-iteration",
            StepType::Error => "error",
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
    Error,
}

impl RunStatus {
    pub fn label(self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Running => "running",
            RunStatus::Paused => "paused",
            RunStatus::Completed => "completed",
            RunStatus::Error => "error",
        }
    }
}

/// Error taxonomy surfaced to consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    ParseError,
    ReferenceError,
    TypeError,
    StackOverflow,
    ExecutionLimitExceeded,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::ParseError => "ParseError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::StackOverflow => "StackOverflow",
            ErrorKind::ExecutionLimitExceeded => "ExecutionLimitExceeded",
        };
        f.write_str(name)
    }
}

/// Error payload of a terminal `error` step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

/// One binding as seen at a step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableSnapshot {
    pub name: String,
    pub value: RuntimeValue,
    pub status: SlotStatus,
    pub binding: Binding,
}

impl VariableSnapshot {
    /// Text shown in the variables pane
    pub fn display_value(&self) -> String {
        match self.status {
            SlotStatus::Tdz => "<uninitialized>".to_string(),
            SlotStatus::Uninitialized | SlotStatus::Initialized => format_value(&self.value, true),
        }
    }
}

/// One scope of the chain as seen at a step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeSnapshot {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub variables: Vec<VariableSnapshot>,
}

/// One user call frame as seen at a step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameSnapshot {
    pub function_name: String,
    pub params: Vec<(String, RuntimeValue)>,
    pub locals: Vec<(String, RuntimeValue)>,
    pub caller_line: usize,
    /// The frame's own function scope
    pub scope: ScopeId,
}

/// A recorded step of execution
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    pub index: usize,
    pub source_line: usize,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub description: String,
    /// Innermost scope first
    pub scopes: Vec<ScopeSnapshot>,
    /// Outermost call first
    pub call_stack: Vec<FrameSnapshot>,
    pub console_delta: Vec<String>,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
}

impl ExecutionStep {
    /// Resolve `name` through the captured chain, innermost first
    pub fn variable(&self, name: &str) -> Option<&VariableSnapshot> {
        self.scopes
            .iter()
            .find_map(|scope| scope.variables.iter().find(|v| v.name == name))
    }

    /// Current value of `name`, as captured
    pub fn value_of(&self, name: &str) -> Option<&RuntimeValue> {
        self.variable(name).map(|v| &v.value)
    }

    /// Array-valued bindings visible at this step, innermost first and
    /// without shadowed duplicates
    pub fn arrays(&self) -> Vec<(&str, &RuntimeValue)> {
        let mut seen: Vec<&str> = Vec::new();
        let mut arrays = Vec::new();
        for scope in &self.scopes {
            for var in &scope.variables {
                if seen.contains(&var.name.as_str()) {
                    continue;
                }
                seen.push(&var.name);
                if var.value.is_array() {
                    arrays.push((var.name.as_str(), &var.value));
                }
            }
        }
        arrays
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, RunStatus::Completed | RunStatus::Error)
    }
}

/// A printed console line with the source line that printed it
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleLine {
    pub text: String,
    pub location: SourceLocation,
}

/// Captures `console.log` output during a run
#[derive(Debug, Clone, Default)]
pub struct Console {
    lines: Vec<ConsoleLine>,
    flushed: usize,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print one line
    pub fn log(&mut self, text: String, location: SourceLocation) {
        self.lines.push(ConsoleLine { text, location });
    }

    /// Lines printed since the last call
    pub fn take_delta(&mut self) -> Vec<String> {
        let delta = self.lines[self.flushed..]
            .iter()
            .map(|line| line.text.clone())
            .collect();
        self.flushed = self.lines.len();
        delta
    }

    /// Get all lines as a vector of strings
    pub fn output(&self) -> Vec<String> {
        self.lines.iter().map(|line| line.text.clone()).collect()
    }

    pub fn lines(&self) -> &[ConsoleLine] {
        &self.lines
    }
}
