//! Function calls
//!
//! A call to a user function:
//! 1. Checks the call depth against the configured ceiling
//! 2. Creates a function scope whose parent is the closure scope
//! 3. Binds parameters (missing arguments are `undefined`) and hoists the body
//! 4. Pushes a frame and emits a `call` step
//! 5. Runs the body until it returns or falls off the end
//! 6. Emits a `return` step, pops the frame and restores the caller's scope
//!
//! Arguments are evaluated left to right before any of this happens. Arrays,
//! objects and functions are passed by id, so the callee mutates the caller's
//! entity.

use crate::interpreter::engine::{display_name, ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::scope::{Binding, ScopeKind};
use crate::memory::stack::StackFrame;
use crate::memory::value::Value;
use crate::memory::HeapId;
use crate::parser::ast::{Expr, SourceLocation};
use crate::snapshot::StepType;
use tracing::trace;

impl Interpreter {
    pub(crate) fn evaluate_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if let Expr::Member {
            object, property, ..
        } = callee
        {
            return self.evaluate_method_call(object, property, args, location);
        }

        let function = self.evaluate_expr(callee)?;
        let argv = self.evaluate_arguments(args)?;
        self.call_value(&function, argv, &callee.to_string(), location)
    }

    fn evaluate_arguments(&mut self, args: &[Expr]) -> Result<Vec<Value>, RuntimeError> {
        let mut argv = Vec::with_capacity(args.len());
        for arg in args {
            argv.push(self.evaluate_expr(arg)?);
        }
        Ok(argv)
    }

    /// `object.property(args)`: built-in namespaces, array methods or a function-valued property
    fn evaluate_method_call(
        &mut self,
        object: &Expr,
        property: &str,
        args: &[Expr],
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if let Expr::Identifier(name, _) = object {
            let shadowed = self.scopes.resolve(self.scope, name).is_some();
            if !shadowed && (name == "console" || name == "Math") {
                let argv = self.evaluate_arguments(args)?;
                return if name == "console" {
                    self.call_console(property, argv, location)
                } else {
                    self.call_math(property, argv, location)
                };
            }
        }

        let receiver = self.evaluate_expr(object)?;
        match &receiver {
            Value::Array(id) => {
                let argv = self.evaluate_arguments(args)?;
                self.call_array_method(*id, object, property, argv, location)
            }
            _ => {
                let function = self.get_member(&receiver, property, location)?;
                let argv = self.evaluate_arguments(args)?;
                self.call_value(&function, argv, &format!("{}.{}", object, property), location)
            }
        }
    }

    /// Call `function` if it is one, otherwise fail with a `TypeError` naming `callee`
    pub(crate) fn call_value(
        &mut self,
        function: &Value,
        argv: Vec<Value>,
        callee: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        match function {
            Value::Function(id) => self.call_function(*id, argv, location),
            _ => Err(RuntimeError::type_error(
                format!("{} is not a function", callee),
                location,
            )),
        }
    }

    pub(crate) fn call_function(
        &mut self,
        id: HeapId,
        argv: Vec<Value>,
        call_location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        let Some(function) = self.heap.function(id).cloned() else {
            return Err(RuntimeError::type_error(
                format!("{} is not a function", id),
                call_location,
            ));
        };

        if self.stack.is_full() {
            return Err(RuntimeError::StackOverflow {
                limit: self.stack.max_depth(),
                location: call_location,
            });
        }

        let def = function.def.clone();
        let name = display_name(&function.name).to_string();

        let scope = self
            .scopes
            .create_scope(ScopeKind::Function, Some(function.closure));
        for (i, param) in def.params.iter().enumerate() {
            let value = argv.get(i).cloned().unwrap_or_default();
            self.scopes.declare(scope, param, Binding::Param);
            self.scopes
                .initialize(scope, param, value)
                .map_err(|e| RuntimeError::from_scope(e, call_location))?;
        }
        self.hoist_function_body(&def.body, scope);

        self.stack.push(StackFrame {
            function_name: function.name.clone(),
            function_id: id,
            param_names: def.params.clone(),
            function_scope: scope,
            caller_scope: self.scope,
            caller_line: call_location.line,
        });
        let saved = self.scope;
        self.scope = scope;
        trace!(function = %name, depth = self.stack.depth(), "call");

        let arguments: Vec<String> = argv.iter().map(|v| self.describe(v)).collect();
        self.emit_at(
            def.location,
            StepType::Call,
            format!("Call {}({})", name, arguments.join(", ")),
        )?;

        // On error the frame stays pushed so the error step shows where it happened
        let (result, return_location) = match self.execute_statements(&def.body)? {
            ControlFlow::Return(value, location) => (value, location),
            _ => (Value::Undefined, def.end_location),
        };

        let description = format!("Return {} from {}", self.describe(&result), name);
        self.emit_at(return_location, StepType::Return, description)?;

        self.stack.pop();
        self.scope = saved;
        trace!(function = %name, depth = self.stack.depth(), "return");

        Ok(result)
    }
}
