//! Loop statement execution (`while`, `do-while`, `for`).
//!
//! Adds `impl Interpreter` methods for the three loop forms. `break` and
//! `continue` are folded into a [`LoopBodyResult`] so the loop driver can react
//! without inspecting the body's [`ControlFlow`] itself; `return` comes back
//! as [`LoopBodyResult::Exit`] and is handed to the caller unchanged.
//!
//! Every pass through a loop emits one `loop-iteration` step before its body.
//!
//! A `for` loop whose initializer declares `let`/`const` gets a fresh scope
//! per iteration, seeded with the previous iteration's values, so closures
//! created in the body each see their own copy of the loop variable.

use crate::interpreter::engine::{ControlFlow, Interpreter};
use crate::interpreter::errors::RuntimeError;
use crate::memory::scope::ScopeKind;
use crate::memory::ScopeId;
use crate::parser::ast::{Expr, SourceLocation, Stmt};
use crate::snapshot::StepType;

/// Result returned by [`Interpreter::execute_loop_body`] to signal how the body ended.
pub(crate) enum LoopBodyResult {
    /// Body completed normally or via `continue`
    Continue,
    /// `break` was encountered
    Break,
    /// `return`; the loop unwinds and passes this on
    Exit(ControlFlow),
}

impl Interpreter {
    pub(crate) fn execute_loop_body(&mut self, body: &Stmt) -> Result<LoopBodyResult, RuntimeError> {
        match self.execute_statement(body)? {
            ControlFlow::Normal | ControlFlow::Continue => Ok(LoopBodyResult::Continue),
            ControlFlow::Break => Ok(LoopBodyResult::Break),
            flow @ ControlFlow::Return(..) => Ok(LoopBodyResult::Exit(flow)),
        }
    }

    fn emit_iteration(
        &mut self,
        label: &str,
        iteration: usize,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        self.emit_at(
            location,
            StepType::LoopIteration,
            format!("{} loop iteration {}", label, iteration),
        )
    }

    /// Executes a `while (condition) body` loop.
    pub(crate) fn execute_while(
        &mut self,
        condition: &Expr,
        body: &Stmt,
        location: SourceLocation,
    ) -> Result<ControlFlow, RuntimeError> {
        let mut iteration = 0;
        loop {
            if !self.evaluate_expr(condition)?.is_truthy() {
                break;
            }

            iteration += 1;
            self.emit_iteration("while", iteration, location)?;

            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit(flow) => return Ok(flow),
                LoopBodyResult::Break => break,
                LoopBodyResult::Continue => {}
            }
        }

        Ok(ControlFlow::Normal)
    }

    /// Executes a `do body while (condition)` loop.
    ///
    /// The body always runs at least once; the condition is checked after each
    /// iteration.
    pub(crate) fn execute_do_while(
        &mut self,
        body: &Stmt,
        condition: &Expr,
        location: SourceLocation,
    ) -> Result<ControlFlow, RuntimeError> {
        let mut iteration = 0;
        loop {
            iteration += 1;
            self.emit_iteration("do-while", iteration, location)?;

            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit(flow) => return Ok(flow),
                LoopBodyResult::Break => break,
                LoopBodyResult::Continue => {}
            }

            if !self.evaluate_expr(condition)?.is_truthy() {
                break;
            }
        }

        Ok(ControlFlow::Normal)
    }

    /// Executes a `for (init; condition; update) body` loop.
    ///
    /// `init`, `condition`, and `update` are all optional. A missing condition
    /// is treated as always-true.
    pub(crate) fn execute_for(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
        location: SourceLocation,
    ) -> Result<ControlFlow, RuntimeError> {
        let saved = self.scope;
        let result = self.run_for(init, condition, update, body, location)?;
        self.scope = saved;
        Ok(result)
    }

    fn run_for(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
        location: SourceLocation,
    ) -> Result<ControlFlow, RuntimeError> {
        let outer = self.scope;

        // Lexical loop variables live in a scope copied once per iteration
        let mut per_iteration: Option<ScopeId> = None;
        if let Some(init) = init {
            if let Stmt::VarDecl { kind, .. } = init {
                if kind.is_lexical() {
                    let loop_scope = self.scopes.create_scope(ScopeKind::Block, Some(outer));
                    self.hoist_block(std::slice::from_ref(init), loop_scope);
                    self.scope = loop_scope;
                    per_iteration = Some(loop_scope);
                }
            }
            self.execute_statement(init)?;
        }

        let mut iteration = 0;
        loop {
            if let Some(previous) = per_iteration {
                let next = self.scopes.create_scope(ScopeKind::Block, Some(outer));
                self.scopes.copy_bindings(previous, next);
                self.scope = next;
                per_iteration = Some(next);
            }

            if iteration > 0 {
                if let Some(update) = update {
                    self.evaluate_expr(update)?;
                }
            }

            if let Some(condition) = condition {
                if !self.evaluate_expr(condition)?.is_truthy() {
                    break;
                }
            }

            iteration += 1;
            self.emit_iteration("for", iteration, location)?;

            match self.execute_loop_body(body)? {
                LoopBodyResult::Exit(flow) => return Ok(flow),
                LoopBodyResult::Break => break,
                LoopBodyResult::Continue => {}
            }
        }

        Ok(ControlFlow::Normal)
    }
}
