//! Statement parsing implementation
//!
//! This module handles parsing of all supported statement types:
//!
//! - Declarations: `var`, `let`, `const`, `function`
//! - Control flow: `if`, `while`, `for`, `do-while`
//! - Jump statements: `return`, `break`, `continue`
//! - Compound statements: `{ ... }`
//! - Expression statements: function calls, assignments
//!
//! # Grammar
//!
//! ```text
//! statement ::= var_decl | function_decl | if_stmt | while_stmt | for_stmt
//!             | do_while_stmt | return_stmt | break_stmt | continue_stmt
//!             | block | ";" | expr_stmt
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::interpreter::ensure_sufficient_stack;
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse block statements (inside braces, excluding the braces themselves)
    pub(crate) fn parse_block_statements(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(statements)
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        ensure_sufficient_stack(|| self.parse_statement_inner())
    }

    fn parse_statement_inner(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.current_location();

        match self.peek_kind() {
            TokenKind::Var => {
                self.advance();
                self.parse_variable_statement(DeclKind::Var)
            }
            TokenKind::Let => {
                self.advance();
                self.parse_variable_statement(DeclKind::Let)
            }
            TokenKind::Const => {
                self.advance();
                self.parse_variable_statement(DeclKind::Const)
            }
            TokenKind::Function => {
                self.advance();
                self.parse_function_declaration()
            }
            TokenKind::Return => {
                self.advance();
                self.parse_return_statement()
            }
            TokenKind::If => {
                self.advance();
                self.parse_if_statement()
            }
            TokenKind::While => {
                self.advance();
                self.parse_while_statement()
            }
            TokenKind::Do => {
                self.advance();
                self.parse_do_while_statement()
            }
            TokenKind::For => {
                self.advance();
                self.parse_for_statement()
            }
            TokenKind::Break => {
                self.advance();
                if self.loop_depth == 0 {
                    return Err(ParseError::new("Illegal 'break' outside of a loop", loc));
                }
                self.expect_semicolon("after 'break'")?;
                Ok(Stmt::Break { location: loc })
            }
            TokenKind::Continue => {
                self.advance();
                if self.loop_depth == 0 {
                    return Err(ParseError::new("Illegal 'continue' outside of a loop", loc));
                }
                self.expect_semicolon("after 'continue'")?;
                Ok(Stmt::Continue { location: loc })
            }
            TokenKind::LBrace => {
                self.advance();
                let body = self.parse_block_statements()?;
                self.expect_rbrace("after block")?;
                Ok(Stmt::Block {
                    body,
                    location: loc,
                })
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::Empty { location: loc })
            }
            TokenKind::Reserved(word) => Err(ParseError::new(
                format!("Unsupported syntax: '{}'", word),
                loc,
            )),
            _ => {
                let expr = self.parse_expression()?;
                self.expect_semicolon("after expression")?;
                Ok(Stmt::Expression {
                    expr,
                    location: loc,
                })
            }
        }
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.previous_location();

        if self.function_depth == 0 {
            return Err(ParseError::new("Illegal 'return' outside of a function", loc));
        }

        // A line break right after `return` ends the statement
        let ends_here = self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.is_at_end()
            || self.peek().newline_before;

        let value = if ends_here {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.expect_semicolon("after return")?;

        Ok(Stmt::Return {
            value,
            location: loc,
        })
    }

    /// Parse if statement
    fn parse_if_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect_rparen("after if condition")?;

        let then_branch = Box::new(self.parse_statement_or_block()?);

        let else_branch = if self.match_token(&TokenKind::Else) {
            Some(Box::new(self.parse_statement_or_block()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
            location: loc,
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect_rparen("after while condition")?;

        let body = Box::new(self.parse_loop_body()?);

        Ok(Stmt::While {
            condition,
            body,
            location: loc,
        })
    }

    /// Parse do-while statement
    fn parse_do_while_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.previous_location();

        let body = Box::new(self.parse_loop_body()?);

        self.expect_token(&TokenKind::While, "Expected 'while' after do body")?;
        self.expect_lparen("after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect_rparen("after do-while condition")?;
        // `do ... while (c)` may be followed directly by another statement
        self.match_token(&TokenKind::Semicolon);

        Ok(Stmt::DoWhile {
            body,
            condition,
            location: loc,
        })
    }

    /// Parse for statement
    fn parse_for_statement(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.previous_location();

        self.expect_lparen("after 'for'")?;

        // Init (optional)
        let init = match self.peek_kind() {
            TokenKind::Semicolon => None,
            TokenKind::Var | TokenKind::Let | TokenKind::Const => {
                let kind = match self.advance().kind {
                    TokenKind::Var => DeclKind::Var,
                    TokenKind::Let => DeclKind::Let,
                    _ => DeclKind::Const,
                };
                Some(Box::new(self.parse_variable_declaration(kind)?))
            }
            _ => {
                let expr_loc = self.current_location();
                let expr = self.parse_expression()?;
                Some(Box::new(Stmt::Expression {
                    expr,
                    location: expr_loc,
                }))
            }
        };
        self.expect_token(&TokenKind::Semicolon, "Expected ';' after for init")?;

        // Condition (optional)
        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_token(&TokenKind::Semicolon, "Expected ';' after for condition")?;

        // Update (optional)
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_rparen("after for clauses")?;

        let body = Box::new(self.parse_loop_body()?);

        Ok(Stmt::For {
            init,
            condition,
            update,
            body,
            location: loc,
        })
    }

    fn parse_loop_body(&mut self) -> Result<Stmt, ParseError> {
        self.loop_depth += 1;
        let body = self.parse_statement_or_block();
        self.loop_depth -= 1;
        body
    }

    /// Parse statement or block (for if/while/for bodies)
    pub(crate) fn parse_statement_or_block(&mut self) -> Result<Stmt, ParseError> {
        if matches!(self.peek_kind(), TokenKind::Let | TokenKind::Const) {
            return Err(self.error_here(
                "Lexical declaration cannot appear in a single-statement context",
            ));
        }
        if self.check(&TokenKind::Function) {
            return Err(self.error_here(
                "Function declarations are only allowed at the top level or inside a block",
            ));
        }
        self.parse_statement()
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn parse_one(source: &str) -> Stmt {
        let mut parser = Parser::new(source).unwrap();
        let mut program = parser.parse_program().unwrap();
        assert_eq!(program.body.len(), 1);
        program.body.remove(0)
    }

    #[test]
    fn test_parse_for_with_let() {
        match parse_one("for (let i = 0; i < 3; i++) { console.log(i); }") {
            Stmt::For {
                init,
                condition,
                update,
                ..
            } => {
                assert!(matches!(
                    init.as_deref(),
                    Some(Stmt::VarDecl {
                        kind: DeclKind::Let,
                        ..
                    })
                ));
                assert_eq!(condition.unwrap().to_string(), "i < 3");
                assert_eq!(update.unwrap().to_string(), "i++");
            }
            other => panic!("Expected for loop, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_empty_for_clauses() {
        assert!(matches!(
            parse_one("for (;;) { break; }"),
            Stmt::For {
                init: None,
                condition: None,
                update: None,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_if_else_chain() {
        match parse_one("if (a) b = 1; else if (c) b = 2; else b = 3;") {
            Stmt::If { else_branch, .. } => {
                assert!(matches!(else_branch.as_deref(), Some(Stmt::If { .. })));
            }
            other => panic!("Expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_do_while() {
        assert!(matches!(
            parse_one("do { x++; } while (x < 3);"),
            Stmt::DoWhile { .. }
        ));
    }

    #[test]
    fn test_return_on_next_line_returns_undefined() {
        match parse_one("function f() { return\n1 }") {
            Stmt::FunctionDecl { def, .. } => {
                assert!(matches!(def.body[0], Stmt::Return { value: None, .. }));
                assert_eq!(def.body.len(), 2);
            }
            other => panic!("Expected function, got {:?}", other),
        }
    }

    #[test]
    fn test_break_inside_nested_function_in_loop_is_rejected() {
        let mut parser = Parser::new("while (true) { function f() { break; } }").unwrap();
        assert!(parser.parse_program().is_err());
    }

    #[test]
    fn test_function_declaration_as_if_body_is_rejected() {
        let mut parser = Parser::new("if (true) function f() {}").unwrap();
        let err = parser.parse_program().unwrap_err();
        assert!(err.message.contains("Function declarations"));

        let mut parser = Parser::new("if (true) { function f() {} }").unwrap();
        assert!(parser.parse_program().is_ok());
    }

    #[test]
    fn test_statement_locations() {
        let mut parser = Parser::new("let a = 1;\n\n  a = 2;").unwrap();
        let program = parser.parse_program().unwrap();
        assert_eq!(program.body[0].location(), SourceLocation::new(1, 1));
        assert_eq!(program.body[1].location(), SourceLocation::new(3, 3));
    }
}
