//! Declaration hoisting.
//!
//! Before a function body (or the program) runs, every `var` anywhere in it,
//! nested blocks and loops included but not nested functions, is registered
//! in the function scope as `uninitialized`. Each block then registers its
//! own `let`/`const` bindings in the temporal dead zone and creates its
//! function declarations up front, so they can be called before their line.

use crate::interpreter::engine::Interpreter;
use crate::memory::heap::FunctionObject;
use crate::memory::scope::Binding;
use crate::memory::ScopeId;
use crate::parser::ast::{DeclKind, Stmt};

impl Interpreter {
    /// Hoist a whole function body (or the program) into `function_scope`
    pub(crate) fn hoist_function_body(&mut self, body: &[Stmt], function_scope: ScopeId) {
        let mut var_names = Vec::new();
        collect_var_names(body, &mut var_names);
        for name in &var_names {
            self.scopes.declare(function_scope, name, Binding::Var);
        }

        self.hoist_block(body, function_scope);
    }

    /// Hoist the block-level declarations of `body` into `scope`
    pub(crate) fn hoist_block(&mut self, body: &[Stmt], scope: ScopeId) {
        for stmt in body {
            match stmt {
                Stmt::VarDecl {
                    kind: kind @ (DeclKind::Let | DeclKind::Const),
                    declarations,
                    ..
                } => {
                    let binding = if *kind == DeclKind::Let {
                        Binding::Let
                    } else {
                        Binding::Const
                    };
                    for decl in declarations {
                        self.scopes.declare(scope, &decl.name, binding);
                    }
                }
                Stmt::FunctionDecl { def, .. } => {
                    let name = def.name.clone().unwrap_or_default();
                    let function = self.heap.allocate_function(FunctionObject {
                        name: name.clone(),
                        def: def.clone(),
                        closure: scope,
                    });
                    self.scopes
                        .declare_initialized(scope, &name, Binding::Function, function);
                }
                _ => {}
            }
        }
    }
}

/// A block needs its own scope only when it declares something block-scoped
pub(crate) fn declares_block_bindings(body: &[Stmt]) -> bool {
    body.iter().any(|stmt| {
        matches!(
            stmt,
            Stmt::VarDecl {
                kind: DeclKind::Let | DeclKind::Const,
                ..
            } | Stmt::FunctionDecl { .. }
        )
    })
}

/// Collect `var` names in source order, without descending into functions
fn collect_var_names(body: &[Stmt], names: &mut Vec<String>) {
    for stmt in body {
        collect_from_stmt(stmt, names);
    }
}

fn collect_from_stmt(stmt: &Stmt, names: &mut Vec<String>) {
    match stmt {
        Stmt::VarDecl {
            kind: DeclKind::Var,
            declarations,
            ..
        } => {
            for decl in declarations {
                if !names.contains(&decl.name) {
                    names.push(decl.name.clone());
                }
            }
        }
        Stmt::Block { body, .. } => collect_var_names(body, names),
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            collect_from_stmt(then_branch, names);
            if let Some(else_branch) = else_branch {
                collect_from_stmt(else_branch, names);
            }
        }
        Stmt::While { body, .. } | Stmt::DoWhile { body, .. } => collect_from_stmt(body, names),
        Stmt::For { init, body, .. } => {
            if let Some(init) = init {
                collect_from_stmt(init, names);
            }
            collect_from_stmt(body, names);
        }
        Stmt::VarDecl { .. }
        | Stmt::FunctionDecl { .. }
        | Stmt::Expression { .. }
        | Stmt::Return { .. }
        | Stmt::Break { .. }
        | Stmt::Continue { .. }
        | Stmt::Empty { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_collects_nested_vars_but_not_function_locals() {
        let program = parse(
            "var a = 1;
             if (a) { var b = 2; } else { for (var i = 0; i < 1; i++) { var c; } }
             function f() { var hidden = 1; }
             let d = 4;",
        )
        .unwrap();

        let mut names = Vec::new();
        collect_var_names(&program.body, &mut names);
        assert_eq!(names, vec!["a", "b", "i", "c"]);
    }

    #[test]
    fn test_block_scope_detection() {
        let with_let = parse("{ let x = 1; }").unwrap();
        let with_var = parse("{ var x = 1; }").unwrap();

        match (&with_let.body[0], &with_var.body[0]) {
            (Stmt::Block { body: a, .. }, Stmt::Block { body: b, .. }) => {
                assert!(declares_block_bindings(a));
                assert!(!declares_block_bindings(b));
            }
            _ => panic!("Expected blocks"),
        }
    }
}
