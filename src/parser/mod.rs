//! JavaScript-subset source parser
//!
//! This module transforms source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parser struct, helpers and [`ParseError`]
//! - [`ast`]: AST node definitions
//!
//! # Supported Subset
//!
//! - Declarations: `var`, `let`, `const`, function declarations
//! - Function expressions and arrow functions, closures
//! - Statements: `if`/`else`, `while`, `do-while`, `for`, `break`, `continue`, `return`
//! - Expressions: arithmetic, comparison, equality, logical, ternary, assignment,
//!   array and object literals, indexing, property access, calls
//! - Semicolons may be omitted at line breaks
//!
//! Classes, `new`, `this`, `switch`, `try`, template literals and bitwise
//! operators are rejected with a [`ParseError`] at their position.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser, one method per precedence level.
//! No external parser generator dependencies.

pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod statements;

pub use parse::{ParseError, Parser};

/// Parse a whole program
pub fn parse(source: &str) -> Result<ast::Program, ParseError> {
    let mut parser = Parser::new(source)?;
    parser.parse_program()
}
