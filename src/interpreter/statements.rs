//! Statement execution implementation
//!
//! This module handles the execution of every statement form:
//!
//! - Variable declarations (`var`, `let`, `const`)
//! - Expression statements
//! - Blocks, with their own scope when they declare block-scoped names
//! - `if`/`else`
//! - `return`, `break` and `continue`
//!
//! Loops live in [`loops`](super::loops).
//!
//! # Control Flow
//!
//! Every statement returns a [`ControlFlow`]. `break`, `continue` and `return`
//! travel outward as values until a loop or a call consumes them.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::ensure_sufficient_stack;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::hoisting::declares_block_bindings;
use crate::memory::scope::ScopeKind;
use crate::memory::value::Value;
use crate::parser::ast::{DeclKind, Declarator, Expr, SourceLocation, Stmt};
use crate::snapshot::StepType;

impl Interpreter {
    pub(crate) fn execute_statement(&mut self, stmt: &Stmt) -> Result<ControlFlow, RuntimeError> {
        ensure_sufficient_stack(|| self.execute_statement_inner(stmt))
    }

    fn execute_statement_inner(&mut self, stmt: &Stmt) -> Result<ControlFlow, RuntimeError> {
        match stmt {
            Stmt::VarDecl {
                kind, declarations, ..
            } => {
                for decl in declarations {
                    self.execute_declarator(*kind, decl)?;
                }
                Ok(ControlFlow::Normal)
            }

            // Created when the enclosing block was entered
            Stmt::FunctionDecl { .. } => Ok(ControlFlow::Normal),

            Stmt::Expression { expr, location } => {
                let before = self.step_count();
                self.evaluate_expr(expr)?;
                if self.step_count() == before {
                    self.emit_at(*location, StepType::Statement, expr.to_string())?;
                }
                Ok(ControlFlow::Normal)
            }

            Stmt::Block { body, .. } => self.execute_block(body),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
                location,
            } => self.execute_if(condition, then_branch, else_branch.as_deref(), *location),

            Stmt::While {
                condition,
                body,
                location,
            } => self.execute_while(condition, body, *location),

            Stmt::DoWhile {
                body,
                condition,
                location,
            } => self.execute_do_while(body, condition, *location),

            Stmt::For {
                init,
                condition,
                update,
                body,
                location,
            } => self.execute_for(
                init.as_deref(),
                condition.as_ref(),
                update.as_ref(),
                body,
                *location,
            ),

            Stmt::Return { value, location } => {
                let value = match value {
                    Some(expr) => self.evaluate_expr(expr)?,
                    None => Value::Undefined,
                };
                Ok(ControlFlow::Return(value, *location))
            }

            Stmt::Break { location } => {
                self.emit_at(*location, StepType::Statement, "break".to_string())?;
                Ok(ControlFlow::Break)
            }

            Stmt::Continue { location } => {
                self.emit_at(*location, StepType::Statement, "continue".to_string())?;
                Ok(ControlFlow::Continue)
            }

            Stmt::Empty { .. } => Ok(ControlFlow::Normal),
        }
    }

    fn execute_declarator(&mut self, kind: DeclKind, decl: &Declarator) -> Result<(), RuntimeError> {
        let keyword = kind.keyword();

        match &decl.init {
            Some(init) => {
                let value = self.evaluate_named(init, &decl.name)?;
                self.scopes
                    .initialize(self.scope, &decl.name, value.clone())
                    .map_err(|e| RuntimeError::from_scope(e, decl.location))?;
                let description = format!("{} {} = {}", keyword, decl.name, self.describe(&value));
                self.emit_at(decl.location, StepType::Assignment, description)
            }
            None => {
                // `let x;` leaves the TDZ holding undefined; `var x;` changes nothing
                if kind == DeclKind::Let {
                    self.scopes
                        .initialize(self.scope, &decl.name, Value::Undefined)
                        .map_err(|e| RuntimeError::from_scope(e, decl.location))?;
                }
                self.emit_at(
                    decl.location,
                    StepType::Statement,
                    format!("{} {}", keyword, decl.name),
                )
            }
        }
    }

    /// Run a block, in a fresh scope when it declares block-scoped names
    pub(crate) fn execute_block(&mut self, body: &[Stmt]) -> Result<ControlFlow, RuntimeError> {
        let saved = self.scope;
        if declares_block_bindings(body) {
            let block = self.scopes.create_scope(ScopeKind::Block, Some(saved));
            self.hoist_block(body, block);
            self.scope = block;
        }

        // On error the scope stays put so the error step shows the failing block
        let result = self.execute_statements(body)?;
        self.scope = saved;
        Ok(result)
    }

    /// Run statements in the current scope until one leaves abnormally
    pub(crate) fn execute_statements(&mut self, body: &[Stmt]) -> Result<ControlFlow, RuntimeError> {
        for stmt in body {
            let flow = self.execute_statement(stmt)?;
            if flow != ControlFlow::Normal {
                return Ok(flow);
            }
        }
        Ok(ControlFlow::Normal)
    }

    fn execute_if(
        &mut self,
        condition: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
        location: SourceLocation,
    ) -> Result<ControlFlow, RuntimeError> {
        let before = self.step_count();
        let taken = self.evaluate_expr(condition)?.is_truthy();
        if self.step_count() == before {
            self.emit_at(
                location,
                StepType::Statement,
                format!("if ({}) → {}", condition, taken),
            )?;
        }

        if taken {
            self.execute_statement(then_branch)
        } else if let Some(else_branch) = else_branch {
            self.execute_statement(else_branch)
        } else {
            Ok(ControlFlow::Normal)
        }
    }
}
