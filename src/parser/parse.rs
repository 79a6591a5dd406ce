//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: `var`/`let`/`const` and function declarations
//! - `statements`: Parsing statements (if, while, for, etc.)
//! - `expressions`: Parsing expressions with precedence climbing
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token, TokenKind};
use std::mem::discriminant;

/// Parser error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Parse error at {location}: {message}")]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for the JavaScript subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Nesting depth of function bodies, for `return` validation
    pub(crate) function_depth: usize,
    /// Nesting depth of loops within the current function, for `break`/`continue`
    pub(crate) loop_depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
            function_depth: 0,
            loop_depth: 0,
        })
    }

    /// Parse the entire program (top-level statements)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            program.body.push(self.parse_statement()?);
        }

        Ok(program)
    }

    // ===== Helper methods =====

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        discriminant(&self.peek().kind) == discriminant(kind)
    }

    pub(crate) fn check_ahead(&self, n: usize, kind: &TokenKind) -> bool {
        self.peek_ahead(n)
            .is_some_and(|t| discriminant(&t.kind) == discriminant(kind))
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    /// The lexer always terminates the stream with `Eof`, and `advance` never
    /// moves past it, so `position` stays in bounds.
    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.peek().kind.clone()
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn previous_location(&self) -> SourceLocation {
        self.previous().location
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    pub(crate) fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.current_location())
    }

    pub(crate) fn expect_token(&mut self, kind: &TokenKind, message: &str) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(message))
        }
    }

    /// Error for an unexpected token, naming unsupported keywords explicitly
    pub(crate) fn unexpected(&self, message: &str) -> ParseError {
        match &self.peek().kind {
            TokenKind::Reserved(word) => self.error_here(format!("Unsupported syntax: '{}'", word)),
            other => self.error_here(format!("{}, found {}", message, other)),
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::LParen, &format!("Expected '(' {ctx}"))
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::RParen, &format!("Expected ')' {ctx}"))
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::LBrace, &format!("Expected '{{' {ctx}"))
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(&TokenKind::RBrace, &format!("Expected '}}' {ctx}"))
    }

    /// Consume a statement terminator.
    ///
    /// A `;` is optional before `}`, at end of input, and when the next token
    /// starts on a new line.
    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        if self.match_token(&TokenKind::Semicolon) {
            return Ok(());
        }
        if self.check(&TokenKind::RBrace) || self.is_at_end() || self.peek().newline_before {
            return Ok(());
        }
        Err(self.unexpected(&format!("Expected ';' {ctx}")))
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        if let TokenKind::Ident(name) = self.peek_kind() {
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected("Expected identifier"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<Program, ParseError> {
        Parser::new(source)?.parse_program()
    }

    #[test]
    fn test_parse_simple_function() {
        let program = parse("function add(a, b) { return a + b; }").unwrap();

        assert_eq!(program.body.len(), 1);
        match &program.body[0] {
            Stmt::FunctionDecl { def, .. } => {
                assert_eq!(def.name.as_deref(), Some("add"));
                assert_eq!(def.params, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(def.body.len(), 1);
            }
            _ => panic!("Expected function declaration"),
        }
    }

    #[test]
    fn test_parse_expression_precedence() {
        let program = parse("let x = 1 + 2 * 3;").unwrap();

        match &program.body[0] {
            Stmt::VarDecl { declarations, .. } => {
                let init = declarations[0].init.as_ref().unwrap();
                assert_eq!(init.to_string(), "1 + (2 * 3)");
            }
            _ => panic!("Expected declaration"),
        }
    }

    #[test]
    fn test_optional_semicolons() {
        let program = parse("let a = 1\nlet b = 2\nconsole.log(a + b)").unwrap();
        assert_eq!(program.body.len(), 3);
    }

    #[test]
    fn test_missing_semicolon_on_same_line() {
        let err = parse("let a = 1 let b = 2").unwrap_err();
        assert_eq!(err.location.line, 1);
        assert!(err.message.contains("Expected ';'"));
    }

    #[test]
    fn test_unsupported_keyword_is_named() {
        let err = parse("class Foo {}").unwrap_err();
        assert_eq!(err.message, "Unsupported syntax: 'class'");
        assert_eq!(err.location, SourceLocation::new(1, 1));
    }

    #[test]
    fn test_return_outside_function() {
        let err = parse("return 1;").unwrap_err();
        assert!(err.message.contains("return"));
    }

    #[test]
    fn test_break_outside_loop() {
        assert!(parse("break;").is_err());
        assert!(parse("while (true) { break; }").is_ok());
    }

    #[test]
    fn test_const_requires_initializer() {
        assert!(parse("const x;").is_err());
    }

    #[test]
    fn test_invalid_assignment_target() {
        let err = parse("1 = 2;").unwrap_err();
        assert!(err.message.contains("Invalid assignment target"));
    }

    #[test]
    fn test_arrow_functions() {
        let program = parse("const f = (a, b) => a + b; const g = x => { return x; };").unwrap();
        assert_eq!(program.body.len(), 2);
        match &program.body[0] {
            Stmt::VarDecl { declarations, .. } => match &declarations[0].init {
                Some(Expr::Function { def, .. }) => {
                    assert!(def.is_arrow);
                    assert_eq!(def.params.len(), 2);
                    assert!(matches!(def.body[0], Stmt::Return { .. }));
                }
                other => panic!("Expected arrow function, got {:?}", other),
            },
            _ => panic!("Expected declaration"),
        }
    }

    #[test]
    fn test_parenthesized_expression_is_not_arrow() {
        let program = parse("let y = (1 + 2) * 3;").unwrap();
        match &program.body[0] {
            Stmt::VarDecl { declarations, .. } => {
                assert_eq!(declarations[0].init.as_ref().unwrap().to_string(), "(1 + 2) * 3");
            }
            _ => panic!("Expected declaration"),
        }
    }
}
