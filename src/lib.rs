//! # Introduction
//!
//! jsstepper parses and executes a subset of JavaScript, recording a deep
//! snapshot of the interpreter state at every observable operation. The
//! recorded trace is then navigated forward and backward, with breakpoints and
//! timed playback, through a terminal UI built with
//! [ratatui](https://docs.rs/ratatui).
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Interpreter → Trace → Navigator → TUI
//! ```
//!
//! 1. [`parser`] tokenises the source and builds an AST.
//! 2. [`interpreter`] hoists declarations, walks the AST and emits one
//!    [`snapshot::ExecutionStep`] per observable operation.
//! 3. [`memory`] is the runtime model: live [`memory::value::Value`]s, the
//!    [`memory::heap::Heap`] arena, the [`memory::scope::ScopeChain`] and the
//!    [`memory::stack::CallStack`].
//! 4. [`snapshot`] holds the step read model and the trace store.
//! 5. [`navigation`] and [`session`] move a cursor over a finished trace
//!    without ever re-running the program.
//! 6. [`ui`] is the ratatui front-end; not part of the stable library API.
//!
//! ## Supported JavaScript subset
//!
//! Declarations: `var`, `let`, `const`, function declarations, function
//! expressions and arrows (closures included).
//! Control flow: `if/else`, `while`, `do-while`, `for`, `break`, `continue`,
//! `return`.
//! Values: numbers, strings, booleans, `null`, `undefined`, arrays, objects.
//! Built-ins: `console.log`, `Math.*`, common array methods.
//!
//! ```
//! use jsstepper::config::RunOptions;
//!
//! let trace = jsstepper::run("let a = [1, 2];\na.push(3);", &RunOptions::default()).unwrap();
//! let last = trace.last().unwrap();
//! assert_eq!(last.value_of("a").unwrap().elements().unwrap().len(), 3);
//! ```

pub mod config;
pub mod interpreter;
pub mod memory;
pub mod navigation;
pub mod parser;
pub mod session;
pub mod snapshot;
pub mod ui;

use config::RunOptions;
use parser::ParseError;
use snapshot::trace::Trace;

/// Parse and execute `source` in one go.
///
/// Runtime errors end the trace with an `error` step; only a parse error is
/// returned as `Err`, in which case no trace exists.
pub fn run(source: &str, options: &RunOptions) -> Result<Trace, ParseError> {
    let program = parser::parse(source)?;
    Ok(interpreter::Interpreter::new(*options).run(&program))
}
