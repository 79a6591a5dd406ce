// Execution engine for the interpreter

use crate::config::RunOptions;
use crate::interpreter::errors::RuntimeError;
use crate::memory::heap::Heap;
use crate::memory::runtime_value::{format_value, RuntimeValue};
use crate::memory::scope::{ScopeChain, SlotStatus};
use crate::memory::stack::CallStack;
use crate::memory::value::Value;
use crate::memory::ScopeId;
use crate::parser::ast::{Program, SourceLocation};
use crate::snapshot::trace::Trace;
use crate::snapshot::{
    Console, ExecutionStep, FrameSnapshot, RunStatus, ScopeSnapshot, StepError, StepType,
    VariableSnapshot,
};
use tracing::{debug, trace};

/// How a statement finished
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ControlFlow {
    Normal,
    Break,
    Continue,
    /// Value and the location of the `return` that produced it
    Return(Value, SourceLocation),
}

/// The main interpreter that executes a program and records its trace
pub struct Interpreter {
    pub(crate) options: RunOptions,

    /// Arrays, objects and functions
    pub(crate) heap: Heap,

    /// Every scope created during the run
    pub(crate) scopes: ScopeChain,

    /// Call stack
    pub(crate) stack: CallStack,

    /// Captured `console.log` output
    pub(crate) console: Console,

    /// Innermost scope of the code currently executing
    pub(crate) scope: ScopeId,

    /// Current source location being executed
    pub(crate) current_location: SourceLocation,

    /// Steps emitted so far
    steps: Vec<ExecutionStep>,
}

impl Interpreter {
    pub fn new(options: RunOptions) -> Self {
        Interpreter {
            options,
            heap: Heap::new(),
            scopes: ScopeChain::new(),
            stack: CallStack::new(options.max_call_depth),
            console: Console::new(),
            scope: ScopeChain::GLOBAL,
            current_location: SourceLocation::new(1, 1),
            steps: Vec::new(),
        }
    }

    /// Execute `program` to completion and return its trace.
    ///
    /// A runtime error does not escape: it becomes the final `error` step.
    #[tracing::instrument(skip_all, fields(max_steps = self.options.max_steps))]
    pub fn run(mut self, program: &Program) -> Trace {
        debug!(statements = program.body.len(), "run started");

        match self.execute_program(program) {
            Ok(()) => self.seal_completed(),
            Err(err) => {
                debug!(error = %err, steps = self.steps.len(), "run failed");
                self.seal_error(err);
            }
        }

        debug!(steps = self.steps.len(), "run finished");
        Trace::new(self.steps)
    }

    fn execute_program(&mut self, program: &Program) -> Result<(), RuntimeError> {
        self.hoist_function_body(&program.body, ScopeChain::GLOBAL);

        let start = program
            .body
            .first()
            .map(|s| s.location())
            .unwrap_or_else(|| SourceLocation::new(1, 1));
        self.emit_at(start, StepType::Statement, "Program start".to_string())?;

        for stmt in &program.body {
            // `return`, `break` and `continue` cannot reach the top level
            if self.execute_statement(stmt)? != ControlFlow::Normal {
                break;
            }
        }

        Ok(())
    }

    /// Record a step at `location`.
    ///
    /// Fails with `ExecutionLimitExceeded` once the step budget is spent, so
    /// the error step lands exactly at index `max_steps`.
    pub(crate) fn emit_at(
        &mut self,
        location: SourceLocation,
        step_type: StepType,
        description: String,
    ) -> Result<(), RuntimeError> {
        if self.steps.len() >= self.options.max_steps {
            return Err(RuntimeError::ExecutionLimitExceeded {
                limit: self.options.max_steps,
                location,
            });
        }

        self.current_location = location;
        let step = self.capture_step(location, step_type, description, RunStatus::Running, None);
        trace!(
            index = step.index,
            line = step.source_line,
            kind = %step.step_type,
            "{}",
            step.description
        );
        self.steps.push(step);
        Ok(())
    }

    fn seal_completed(&mut self) {
        let location = self.current_location;
        let step = self.capture_step(
            location,
            StepType::Statement,
            "Program finished".to_string(),
            RunStatus::Completed,
            None,
        );
        self.steps.push(step);
    }

    /// Append the terminal error step. Frames are left as they were at the
    /// failure so the snapshot shows where it happened.
    fn seal_error(&mut self, err: RuntimeError) {
        let location = err.location();
        let error = StepError {
            kind: err.kind(),
            message: err.to_string(),
            line: location.line,
            column: location.column,
        };
        let step = self.capture_step(
            location,
            StepType::Error,
            err.to_string(),
            RunStatus::Error,
            Some(error),
        );
        self.steps.push(step);
    }

    fn capture_step(
        &mut self,
        location: SourceLocation,
        step_type: StepType,
        description: String,
        status: RunStatus,
        error: Option<StepError>,
    ) -> ExecutionStep {
        ExecutionStep {
            index: self.steps.len(),
            source_line: location.line,
            step_type,
            description,
            scopes: self.snapshot_scopes(),
            call_stack: self.snapshot_call_stack(),
            console_delta: self.console.take_delta(),
            status,
            error,
        }
    }

    /// Deep copy of the live chain, innermost first
    fn snapshot_scopes(&self) -> Vec<ScopeSnapshot> {
        self.scopes
            .chain(self.scope)
            .into_iter()
            .map(|id| {
                let scope = self.scopes.scope(id);
                ScopeSnapshot {
                    id,
                    kind: scope.kind,
                    variables: scope
                        .variables()
                        .map(|(name, slot)| VariableSnapshot {
                            name: name.to_string(),
                            value: self.heap.materialize(&slot.value),
                            status: slot.status,
                            binding: slot.binding,
                        })
                        .collect(),
                }
            })
            .collect()
    }

    /// Deep copy of the user call frames, outermost first
    fn snapshot_call_stack(&self) -> Vec<FrameSnapshot> {
        let frames = self.stack.frames();

        frames
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                // The frame's innermost scope is where its callee was called from
                let innermost = frames
                    .get(i + 1)
                    .map_or(self.scope, |callee| callee.caller_scope);

                let function_scope = self.scopes.scope(frame.function_scope);
                let params = frame
                    .param_names
                    .iter()
                    .map(|name| {
                        let value = function_scope
                            .get(name)
                            .map(|slot| self.heap.materialize(&slot.value))
                            .unwrap_or_else(RuntimeValue::undefined);
                        (name.clone(), value)
                    })
                    .collect();

                let mut locals: Vec<(String, RuntimeValue)> = Vec::new();
                for id in self.scopes.chain(innermost) {
                    let scope = self.scopes.scope(id);
                    for (name, slot) in scope.variables() {
                        let is_param = id == frame.function_scope
                            && frame.param_names.iter().any(|p| p == name);
                        let shadowed = locals.iter().any(|(n, _)| n == name);
                        if is_param || shadowed || slot.status == SlotStatus::Tdz {
                            continue;
                        }
                        locals.push((name.to_string(), self.heap.materialize(&slot.value)));
                    }
                    if id == frame.function_scope {
                        break;
                    }
                }

                FrameSnapshot {
                    function_name: display_name(&frame.function_name).to_string(),
                    params,
                    locals,
                    caller_line: frame.caller_line,
                    scope: frame.function_scope,
                }
            })
            .collect()
    }

    /// Render a live value for step descriptions
    pub(crate) fn describe(&self, value: &Value) -> String {
        format_value(&self.heap.materialize(value), true)
    }

    /// Number of steps emitted so far
    pub(crate) fn step_count(&self) -> usize {
        self.steps.len()
    }
}

/// Name shown for a function, `(anonymous)` when it has none
pub(crate) fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "(anonymous)"
    } else {
        name
    }
}
