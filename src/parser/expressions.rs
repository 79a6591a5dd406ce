//! Expression parsing implementation
//!
//! This module handles parsing of expressions using one method per
//! precedence level and recursive descent for other expression forms.
//!
//! # Supported Expressions
//!
//! - Literals: numbers, strings, booleans, `null`, `undefined`
//! - Array literals `[a, b]` and object literals `{ key: value }`
//! - Function expressions and arrow functions
//! - Binary operators: arithmetic, comparison, equality, logical
//! - Unary operators: `-`, `+`, `!`, `typeof`, prefix `++`/`--`
//! - Postfix: `[]`, `.`, `()`, `++`, `--`
//! - Ternary: `? :`
//! - Assignment: `=`, `+=`, `-=`, `*=`, `/=`, `%=`
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::interpreter::ensure_sufficient_stack;
use crate::memory::value::format_number;
use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};
use std::rc::Rc;

impl Parser {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    /// Parse assignment or ternary (right-associative)
    ///
    /// Nested parentheses and literals come back through here, so the stack
    /// is grown on demand.
    pub(crate) fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.parse_assignment_inner())
    }

    fn parse_assignment_inner(&mut self) -> Result<Expr, ParseError> {
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }

        let expr = self.parse_ternary()?;

        let op = match self.peek_kind() {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::Add,
            TokenKind::MinusEq => AssignOp::Sub,
            TokenKind::StarEq => AssignOp::Mul,
            TokenKind::SlashEq => AssignOp::Div,
            TokenKind::PercentEq => AssignOp::Mod,
            _ => return Ok(expr),
        };

        let op_loc = self.current_location();
        if !is_assignable(&expr) {
            return Err(ParseError::new("Invalid assignment target", op_loc));
        }
        self.advance();

        let value = Box::new(self.parse_assignment()?);
        let location = expr.location();
        Ok(Expr::Assign {
            op,
            target: Box::new(expr),
            value,
            location,
        })
    }

    /// Recognize `x => ...` and `(a, b) => ...` without consuming anything
    /// when the upcoming tokens are not an arrow function.
    fn try_parse_arrow(&mut self) -> Result<Option<Expr>, ParseError> {
        let loc = self.current_location();

        match self.peek_kind() {
            TokenKind::Ident(name) if self.check_ahead(1, &TokenKind::Arrow) => {
                self.advance(); // identifier
                self.advance(); // =>
                let def = self.parse_arrow_body(vec![name], loc)?;
                Ok(Some(Expr::Function {
                    def: Rc::new(def),
                    location: loc,
                }))
            }
            TokenKind::LParen if self.arrow_params_ahead() => {
                self.advance(); // (
                let params = self.parse_parameter_list()?;
                self.expect_rparen("after arrow parameters")?;
                self.expect_token(&TokenKind::Arrow, "Expected '=>'")?;
                let def = self.parse_arrow_body(params, loc)?;
                Ok(Some(Expr::Function {
                    def: Rc::new(def),
                    location: loc,
                }))
            }
            _ => Ok(None),
        }
    }

    /// Lookahead: `(` ident (, ident)* `)` `=>`, or `(` `)` `=>`
    fn arrow_params_ahead(&self) -> bool {
        let mut n = 1;
        let mut expect_ident = true;

        loop {
            let Some(token) = self.peek_ahead(n) else {
                return false;
            };
            match (&token.kind, expect_ident) {
                (TokenKind::RParen, _) if expect_ident && n == 1 => break,
                (TokenKind::RParen, false) => break,
                (TokenKind::Ident(_), true) => expect_ident = false,
                (TokenKind::Comma, false) => expect_ident = true,
                _ => return false,
            }
            n += 1;
        }

        self.check_ahead(n + 1, &TokenKind::Arrow)
    }

    /// Parse ternary: condition ? consequent : alternate
    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_logical_or()?;

        if self.match_token(&TokenKind::Question) {
            let consequent = Box::new(self.parse_assignment()?);
            self.expect_token(&TokenKind::Colon, "Expected ':' in ternary expression")?;
            let alternate = Box::new(self.parse_assignment()?);
            let location = expr.location();

            return Ok(Expr::Conditional {
                condition: Box::new(expr),
                consequent,
                alternate,
                location,
            });
        }

        Ok(expr)
    }

    /// Parse logical OR (||)
    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logical_and()?;

        while self.match_token(&TokenKind::OrOr) {
            let right = Box::new(self.parse_logical_and()?);
            let location = left.location();
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right,
                location,
            };
        }

        Ok(left)
    }

    /// Parse logical AND (&&)
    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_equality()?;

        while self.match_token(&TokenKind::AndAnd) {
            let right = Box::new(self.parse_equality()?);
            let location = left.location();
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right,
                location,
            };
        }

        Ok(left)
    }

    /// Parse equality (== != === !==)
    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_relational()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::NotEq => BinOp::NotEq,
                TokenKind::EqEqEq => BinOp::StrictEq,
                TokenKind::NotEqEq => BinOp::StrictNotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            left = binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse relational (< <= > >=)
    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BinOp::Lt,
                TokenKind::Le => BinOp::Le,
                TokenKind::Gt => BinOp::Gt,
                TokenKind::Ge => BinOp::Ge,
                TokenKind::Reserved(word) if word == "in" || word == "instanceof" => {
                    return Err(self.error_here(format!("Unsupported syntax: '{}'", word)));
                }
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse additive (+ -)
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse multiplicative (* / %)
    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }

        Ok(left)
    }

    /// Parse unary (- + ! typeof ++ --)
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.parse_unary_inner())
    }

    fn parse_unary_inner(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Typeof => UnaryOp::Typeof,
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.check(&TokenKind::PlusPlus) {
                    UpdateOp::Increment
                } else {
                    UpdateOp::Decrement
                };
                self.advance();
                let target = self.parse_unary()?;
                if !is_assignable(&target) {
                    return Err(ParseError::new(
                        "Invalid left-hand side expression in prefix operation",
                        loc,
                    ));
                }
                return Ok(Expr::Update {
                    op,
                    prefix: true,
                    target: Box::new(target),
                    location: loc,
                });
            }
            _ => return self.parse_postfix(),
        };

        self.advance();
        let operand = Box::new(self.parse_unary()?);
        Ok(Expr::Unary {
            op,
            operand,
            location: loc,
        })
    }

    /// Parse postfix (++ -- [] . ())
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let loc = self.current_location();

            match self.peek_kind() {
                // A line break before `++`/`--` makes them prefix operators of the next statement
                TokenKind::PlusPlus | TokenKind::MinusMinus if !self.peek().newline_before => {
                    let op = if self.check(&TokenKind::PlusPlus) {
                        UpdateOp::Increment
                    } else {
                        UpdateOp::Decrement
                    };
                    if !is_assignable(&expr) {
                        return Err(ParseError::new(
                            "Invalid left-hand side expression in postfix operation",
                            loc,
                        ));
                    }
                    self.advance();
                    let location = expr.location();
                    expr = Expr::Update {
                        op,
                        prefix: false,
                        target: Box::new(expr),
                        location,
                    };
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = Box::new(self.parse_expression()?);
                    self.expect_token(&TokenKind::RBracket, "Expected ']' after index")?;
                    let location = expr.location();
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index,
                        location,
                    };
                }
                TokenKind::Dot => {
                    self.advance();
                    let property = self.expect_property_name()?;
                    let location = expr.location();
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                        location,
                    };
                }
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_argument_list()?;
                    self.expect_rparen("after function arguments")?;
                    let location = expr.location();
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        location,
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Property names after `.` may be any identifier-like word
    fn expect_property_name(&mut self) -> Result<String, ParseError> {
        let name = match self.peek_kind() {
            TokenKind::Ident(name) | TokenKind::Reserved(name) => name,
            TokenKind::Var => "var".to_string(),
            TokenKind::Let => "let".to_string(),
            TokenKind::Const => "const".to_string(),
            TokenKind::Function => "function".to_string(),
            TokenKind::Return => "return".to_string(),
            TokenKind::If => "if".to_string(),
            TokenKind::Else => "else".to_string(),
            TokenKind::For => "for".to_string(),
            TokenKind::While => "while".to_string(),
            TokenKind::Do => "do".to_string(),
            TokenKind::Break => "break".to_string(),
            TokenKind::Continue => "continue".to_string(),
            TokenKind::True => "true".to_string(),
            TokenKind::False => "false".to_string(),
            TokenKind::Null => "null".to_string(),
            TokenKind::Undefined => "undefined".to_string(),
            TokenKind::Typeof => "typeof".to_string(),
            other => {
                return Err(self.error_here(format!(
                    "Expected property name after '.', found {}",
                    other
                )))
            }
        };
        self.advance();
        Ok(name)
    }

    /// Parse argument list: (expr, expr, ...)
    fn parse_argument_list(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();

        if self.check(&TokenKind::RParen) {
            return Ok(args);
        }

        loop {
            args.push(self.parse_assignment()?);

            if !self.match_token(&TokenKind::Comma) || self.check(&TokenKind::RParen) {
                break;
            }
        }

        Ok(args)
    }

    /// Parse primary (literals, identifiers, literals, function expressions, parentheses)
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let loc = self.current_location();

        let expr = match self.peek_kind() {
            TokenKind::Number(n) => Expr::Number(n, loc),
            TokenKind::Str(s) => Expr::Str(s, loc),
            TokenKind::True => Expr::Bool(true, loc),
            TokenKind::False => Expr::Bool(false, loc),
            TokenKind::Null => Expr::Null(loc),
            TokenKind::Undefined => Expr::Undefined(loc),
            TokenKind::Ident(name) => Expr::Identifier(name, loc),
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                return Ok(expr);
            }
            TokenKind::LBracket => {
                self.advance();
                return self.parse_array_literal(loc);
            }
            TokenKind::LBrace => {
                self.advance();
                return self.parse_object_literal(loc);
            }
            TokenKind::Function => {
                self.advance();
                let name = match self.peek_kind() {
                    TokenKind::Ident(name) => {
                        self.advance();
                        Some(name)
                    }
                    _ => None,
                };
                let def = self.parse_function_rest(name, loc)?;
                return Ok(Expr::Function {
                    def: Rc::new(def),
                    location: loc,
                });
            }
            _ => return Err(self.unexpected("Unexpected token in expression")),
        };

        self.advance();
        Ok(expr)
    }

    /// Parse `[a, b, ...]`, the `[` already consumed
    fn parse_array_literal(&mut self, loc: SourceLocation) -> Result<Expr, ParseError> {
        let mut elements = Vec::new();

        while !self.check(&TokenKind::RBracket) {
            elements.push(self.parse_assignment()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_token(&TokenKind::RBracket, "Expected ']' after array elements")?;

        Ok(Expr::Array {
            elements,
            location: loc,
        })
    }

    /// Parse `{ key: value, ... }`, the `{` already consumed
    fn parse_object_literal(&mut self, loc: SourceLocation) -> Result<Expr, ParseError> {
        let mut properties = Vec::new();

        while !self.check(&TokenKind::RBrace) {
            let key_loc = self.current_location();
            let key = match self.peek_kind() {
                TokenKind::Ident(name) => name,
                TokenKind::Str(s) => s,
                TokenKind::Number(n) => format_number(n),
                _ => return Err(self.unexpected("Expected property name")),
            };
            self.advance();

            let value = if self.match_token(&TokenKind::Colon) {
                self.parse_assignment()?
            } else if self.check(&TokenKind::Comma) || self.check(&TokenKind::RBrace) {
                // Shorthand `{ name }`
                Expr::Identifier(key.clone(), key_loc)
            } else {
                return Err(self.unexpected("Expected ':' after property name"));
            };

            properties.push(PropertyDef { key, value });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.expect_rbrace("after object properties")?;

        Ok(Expr::Object {
            properties,
            location: loc,
        })
    }
}

fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    let location = left.location();
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        location,
    }
}

fn is_assignable(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Identifier(..) | Expr::Member { .. } | Expr::Index { .. }
    )
}

#[cfg(test)]
mod tests {
    use crate::parser::ast::*;
    use crate::parser::parse::Parser;

    fn parse_expr(source: &str) -> Expr {
        let mut parser = Parser::new(source).unwrap();
        parser.parse_expression().unwrap()
    }

    #[test]
    fn test_left_associative_subtraction() {
        assert_eq!(parse_expr("a - b - c").to_string(), "(a - b) - c");
    }

    #[test]
    fn test_comparison_binds_looser_than_arithmetic() {
        match parse_expr("i < n - 1") {
            Expr::Binary { op, .. } => assert_eq!(op, BinOp::Lt),
            other => panic!("Expected comparison, got {:?}", other),
        }
    }

    #[test]
    fn test_logical_precedence() {
        match parse_expr("a || b && c") {
            Expr::Logical { op, right, .. } => {
                assert_eq!(op, LogicalOp::Or);
                assert!(matches!(
                    *right,
                    Expr::Logical {
                        op: LogicalOp::And,
                        ..
                    }
                ));
            }
            other => panic!("Expected logical or, got {:?}", other),
        }
    }

    #[test]
    fn test_member_call_chain() {
        let expr = parse_expr("arr.push(1, 2)");
        match expr {
            Expr::Call { callee, args, .. } => {
                assert_eq!(args.len(), 2);
                assert!(matches!(*callee, Expr::Member { ref property, .. } if property == "push"));
            }
            other => panic!("Expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_right_associative_assignment() {
        match parse_expr("a = b = 3") {
            Expr::Assign { value, .. } => assert!(matches!(*value, Expr::Assign { .. })),
            other => panic!("Expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_object_literal() {
        match parse_expr("{ name: \"x\", count: 2, flag }") {
            Expr::Object { properties, .. } => {
                let keys: Vec<_> = properties.iter().map(|p| p.key.as_str()).collect();
                assert_eq!(keys, vec!["name", "count", "flag"]);
            }
            other => panic!("Expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_ternary() {
        assert!(matches!(
            parse_expr("a > b ? a : b"),
            Expr::Conditional { .. }
        ));
    }

    #[test]
    fn test_unary_and_update() {
        assert_eq!(parse_expr("-x").to_string(), "-x");
        assert_eq!(parse_expr("++i").to_string(), "++i");
        assert_eq!(parse_expr("i--").to_string(), "i--");
        assert_eq!(parse_expr("typeof x").to_string(), "typeof x");
    }

    #[test]
    fn test_invalid_update_target() {
        let mut parser = Parser::new("5++").unwrap();
        assert!(parser.parse_expression().is_err());
    }

    #[test]
    fn test_deeply_nested_parentheses() {
        let depth = 20_000;
        let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert!(matches!(parse_expr(&source), Expr::Number(n, _) if n == 1.0));

        let mut parser = Parser::new(&"(".repeat(depth)).unwrap();
        assert!(parser.parse_expression().is_err());
    }
}
