//! Declaration parsing implementation
//!
//! This module handles parsing of declarations:
//!
//! - Variable declarations: `var x = 1, y;`, `let z;`, `const k = 2;`
//! - Function declarations: `function name(params) { ... }`
//! - Function bodies shared with function expressions and arrows
//!
//! # Grammar
//!
//! ```text
//! var_decl      ::= ("var" | "let" | "const") declarator ("," declarator)*
//! declarator    ::= identifier ("=" assignment)?
//! function_decl ::= "function" identifier "(" params ")" "{" statements "}"
//! params        ::= (identifier ("," identifier)*)?
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};
use std::rc::Rc;

impl Parser {
    /// Parse a variable declaration statement, the keyword already consumed
    pub(crate) fn parse_variable_statement(&mut self, kind: DeclKind) -> Result<Stmt, ParseError> {
        let decl = self.parse_variable_declaration(kind)?;
        self.expect_semicolon(&format!("after '{}' declaration", kind.keyword()))?;
        Ok(decl)
    }

    /// Parse declarators after `var`/`let`/`const` without the terminator.
    ///
    /// Shared by statement-level declarations and `for` initializers.
    pub(crate) fn parse_variable_declaration(&mut self, kind: DeclKind) -> Result<Stmt, ParseError> {
        let loc = self.previous_location();
        let mut declarations = Vec::new();

        loop {
            let name_loc = self.current_location();
            let name = self.expect_identifier()?;

            let init = if self.match_token(&TokenKind::Eq) {
                Some(self.parse_assignment()?)
            } else {
                if kind == DeclKind::Const {
                    return Err(ParseError::new(
                        format!("Missing initializer in const declaration of '{}'", name),
                        name_loc,
                    ));
                }
                None
            };

            declarations.push(Declarator {
                name,
                init,
                location: name_loc,
            });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok(Stmt::VarDecl {
            kind,
            declarations,
            location: loc,
        })
    }

    /// Parse `function name(params) { body }`, the `function` keyword already consumed
    pub(crate) fn parse_function_declaration(&mut self) -> Result<Stmt, ParseError> {
        let loc = self.previous_location();
        let name = self.expect_identifier()?;
        let def = self.parse_function_rest(Some(name), loc)?;

        Ok(Stmt::FunctionDecl {
            def: Rc::new(def),
            location: loc,
        })
    }

    /// Parse the parameter list and braced body of a `function`
    pub(crate) fn parse_function_rest(
        &mut self,
        name: Option<String>,
        loc: SourceLocation,
    ) -> Result<FunctionDef, ParseError> {
        self.expect_lparen("after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect_rparen("after parameters")?;

        let (body, end_location) = self.parse_function_body()?;

        Ok(FunctionDef {
            name,
            params,
            body,
            is_arrow: false,
            location: loc,
            end_location,
        })
    }

    /// Parse `{ statements }` as a function body.
    ///
    /// Returns the statements and the location of the closing brace.
    pub(crate) fn parse_function_body(&mut self) -> Result<(Vec<Stmt>, SourceLocation), ParseError> {
        self.expect_lbrace("before function body")?;

        let saved_loops = self.loop_depth;
        self.loop_depth = 0;
        self.function_depth += 1;

        let body = self.parse_block_statements();

        self.function_depth -= 1;
        self.loop_depth = saved_loops;

        let body = body?;
        let end_location = self.current_location();
        self.expect_rbrace("after function body")?;

        Ok((body, end_location))
    }

    /// Parse parameter list: (name, name, ...)
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut params: Vec<String> = Vec::new();

        if self.check(&TokenKind::RParen) {
            return Ok(params);
        }

        loop {
            let loc = self.current_location();
            let param = self.expect_identifier()?;
            if params.contains(&param) {
                return Err(ParseError::new(
                    format!("Duplicate parameter name '{}'", param),
                    loc,
                ));
            }
            params.push(param);

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse the body of an arrow function, after `=>`.
    ///
    /// An expression body becomes a single `return` statement.
    pub(crate) fn parse_arrow_body(
        &mut self,
        params: Vec<String>,
        loc: SourceLocation,
    ) -> Result<FunctionDef, ParseError> {
        if self.check(&TokenKind::LBrace) {
            let (body, end_location) = self.parse_function_body()?;
            return Ok(FunctionDef {
                name: None,
                params,
                body,
                is_arrow: true,
                location: loc,
                end_location,
            });
        }

        let saved_loops = self.loop_depth;
        self.loop_depth = 0;
        self.function_depth += 1;
        let value = self.parse_assignment();
        self.function_depth -= 1;
        self.loop_depth = saved_loops;

        let value = value?;
        let value_loc = value.location();

        Ok(FunctionDef {
            name: None,
            params,
            body: vec![Stmt::Return {
                value: Some(value),
                location: value_loc,
            }],
            is_arrow: true,
            location: loc,
            end_location: value_loc,
        })
    }
}
