//! Lexer (tokenizer) for the JavaScript subset
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Each token remembers whether a line break preceded it so the parser can
//! accept statements without trailing semicolons.

use super::ast::SourceLocation;
use std::fmt;

/// Keywords that are valid JavaScript but outside the supported subset.
/// They lex as [`TokenKind::Reserved`] so the parser can name them in errors.
const UNSUPPORTED_KEYWORDS: &[&str] = &[
    "class",
    "new",
    "this",
    "switch",
    "case",
    "default",
    "try",
    "catch",
    "finally",
    "throw",
    "async",
    "await",
    "yield",
    "import",
    "export",
    "delete",
    "in",
    "instanceof",
    "void",
    "with",
    "super",
    "extends",
    "debugger",
];

/// All token kinds produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    Str(String),

    // Identifiers
    Ident(String),

    // Keywords
    Var,
    Let,
    Const,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    True,
    False,
    Null,
    Undefined,
    Typeof,
    Reserved(String),

    // Arithmetic
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    PlusPlus,   // ++
    MinusMinus, // --

    // Assignment
    Eq,        // =
    PlusEq,    // +=
    MinusEq,   // -=
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=

    // Comparison
    EqEq,    // ==
    NotEq,   // !=
    EqEqEq,  // ===
    NotEqEq, // !==
    Lt,      // <
    Le,      // <=
    Gt,      // >
    Ge,      // >=

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Punctuation
    Question,  // ?
    Colon,     // :
    Dot,       // .
    Comma,     // ,
    Semicolon, // ;
    Arrow,     // =>
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]

    // End of file
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Number(n) => return write!(f, "number {}", n),
            TokenKind::Str(s) => return write!(f, "string \"{}\"", s),
            TokenKind::Ident(s) => return write!(f, "identifier '{}'", s),
            TokenKind::Reserved(s) => return write!(f, "'{}'", s),
            TokenKind::Var => "'var'",
            TokenKind::Let => "'let'",
            TokenKind::Const => "'const'",
            TokenKind::Function => "'function'",
            TokenKind::Return => "'return'",
            TokenKind::If => "'if'",
            TokenKind::Else => "'else'",
            TokenKind::For => "'for'",
            TokenKind::While => "'while'",
            TokenKind::Do => "'do'",
            TokenKind::Break => "'break'",
            TokenKind::Continue => "'continue'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::Undefined => "'undefined'",
            TokenKind::Typeof => "'typeof'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::Eq => "'='",
            TokenKind::PlusEq => "'+='",
            TokenKind::MinusEq => "'-='",
            TokenKind::StarEq => "'*='",
            TokenKind::SlashEq => "'/='",
            TokenKind::PercentEq => "'%='",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::EqEqEq => "'==='",
            TokenKind::NotEqEq => "'!=='",
            TokenKind::Lt => "'<'",
            TokenKind::Le => "'<='",
            TokenKind::Gt => "'>'",
            TokenKind::Ge => "'>='",
            TokenKind::AndAnd => "'&&'",
            TokenKind::OrOr => "'||'",
            TokenKind::Bang => "'!'",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::Comma => "','",
            TokenKind::Semicolon => "';'",
            TokenKind::Arrow => "'=>'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Eof => "end of file",
        };
        write!(f, "{}", text)
    }
}

/// A token with its position and line-break flag
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
    /// A line break separates this token from the previous one
    pub newline_before: bool,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Lexer error at {location}: {message}")]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

/// Lexer for JavaScript source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
    saw_newline: bool,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
            saw_newline: false,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.saw_newline = false;
            self.skip_whitespace_and_comments()?;

            let newline_before = self.saw_newline || tokens.is_empty();
            let location = self.current_location();

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    location,
                    newline_before: true,
                });
                break;
            }

            let kind = self.next_token()?;
            tokens.push(Token {
                kind,
                location,
                newline_before,
            });
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<TokenKind, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        match ch {
            '"' | '\'' => self.string_literal(ch, loc),

            '`' => Err(LexError {
                message: "Template literals are not supported".to_string(),
                location: loc,
            }),

            '0'..='9' => self.number_literal(ch, loc),
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.number_literal(ch, loc)
            }

            c if c.is_alphabetic() || c == '_' || c == '$' => Ok(self.identifier_or_keyword(c)),

            '+' => Ok(if self.match_char('+') {
                TokenKind::PlusPlus
            } else if self.match_char('=') {
                TokenKind::PlusEq
            } else {
                TokenKind::Plus
            }),
            '-' => Ok(if self.match_char('-') {
                TokenKind::MinusMinus
            } else if self.match_char('=') {
                TokenKind::MinusEq
            } else {
                TokenKind::Minus
            }),
            '*' => {
                if self.peek() == Some('*') {
                    return Err(LexError {
                        message: "Exponent operator '**' is not supported".to_string(),
                        location: loc,
                    });
                }
                Ok(if self.match_char('=') {
                    TokenKind::StarEq
                } else {
                    TokenKind::Star
                })
            }
            '/' => Ok(if self.match_char('=') {
                TokenKind::SlashEq
            } else {
                TokenKind::Slash
            }),
            '%' => Ok(if self.match_char('=') {
                TokenKind::PercentEq
            } else {
                TokenKind::Percent
            }),
            '=' => Ok(if self.match_char('=') {
                if self.match_char('=') {
                    TokenKind::EqEqEq
                } else {
                    TokenKind::EqEq
                }
            } else if self.match_char('>') {
                TokenKind::Arrow
            } else {
                TokenKind::Eq
            }),
            '!' => Ok(if self.match_char('=') {
                if self.match_char('=') {
                    TokenKind::NotEqEq
                } else {
                    TokenKind::NotEq
                }
            } else {
                TokenKind::Bang
            }),
            '<' => Ok(if self.match_char('=') {
                TokenKind::Le
            } else {
                TokenKind::Lt
            }),
            '>' => Ok(if self.match_char('=') {
                TokenKind::Ge
            } else {
                TokenKind::Gt
            }),
            '&' if self.match_char('&') => Ok(TokenKind::AndAnd),
            '|' if self.match_char('|') => Ok(TokenKind::OrOr),
            '&' | '|' | '^' | '~' => Err(LexError {
                message: format!("Bitwise operator '{}' is not supported", ch),
                location: loc,
            }),
            '?' => Ok(TokenKind::Question),
            ':' => Ok(TokenKind::Colon),
            '.' => Ok(TokenKind::Dot),
            ',' => Ok(TokenKind::Comma),
            ';' => Ok(TokenKind::Semicolon),
            '(' => Ok(TokenKind::LParen),
            ')' => Ok(TokenKind::RParen),
            '{' => Ok(TokenKind::LBrace),
            '}' => Ok(TokenKind::RBrace),
            '[' => Ok(TokenKind::LBracket),
            ']' => Ok(TokenKind::RBracket),

            _ => Err(LexError {
                message: format!("Unexpected character: '{}'", ch),
                location: loc,
            }),
        }
    }

    /// Parse string literal delimited by `quote`
    fn string_literal(&mut self, quote: char, loc: SourceLocation) -> Result<TokenKind, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == quote {
                self.advance(); // consume closing quote
                return Ok(TokenKind::Str(string));
            }

            if ch == '\n' {
                break;
            }

            if ch == '\\' {
                self.advance();
                let escaped = self.advance().ok_or_else(|| LexError {
                    message: "Unexpected end of file in string literal".to_string(),
                    location: self.current_location(),
                })?;

                let unescaped = match escaped {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '"' => '"',
                    '\'' => '\'',
                    '0' => '\0',
                    _ => {
                        return Err(LexError {
                            message: format!("Unknown escape sequence: \\{}", escaped),
                            location: self.current_location(),
                        });
                    }
                };
                string.push(unescaped);
            } else {
                string.push(ch);
                self.advance();
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Parse numeric literal: digits, optional fraction, optional exponent
    fn number_literal(&mut self, first: char, loc: SourceLocation) -> Result<TokenKind, LexError> {
        let mut num_str = String::new();
        num_str.push(first);
        let mut seen_dot = first == '.';

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else if ch == '.' && !seen_dot && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
                seen_dot = true;
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign_offset = usize::from(matches!(self.peek_ahead(1), Some('+') | Some('-')));
            if self
                .peek_ahead(1 + sign_offset)
                .is_some_and(|c| c.is_ascii_digit())
            {
                for _ in 0..=sign_offset {
                    if let Some(c) = self.advance() {
                        num_str.push(c);
                    }
                }
                while let Some(ch) = self.peek() {
                    if !ch.is_ascii_digit() {
                        break;
                    }
                    num_str.push(ch);
                    self.advance();
                }
            }
        }

        if self.peek().is_some_and(|c| c.is_alphabetic() || c == '_') {
            return Err(LexError {
                message: format!("Invalid numeric literal starting with {}", num_str),
                location: loc,
            });
        }

        let value = num_str.parse::<f64>().map_err(|_| LexError {
            message: format!("Invalid numeric literal: {}", num_str),
            location: loc,
        })?;

        Ok(TokenKind::Number(value))
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char) -> TokenKind {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match ident.as_str() {
            "var" => TokenKind::Var,
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "undefined" => TokenKind::Undefined,
            "typeof" => TokenKind::Typeof,
            word if UNSUPPORTED_KEYWORDS.contains(&word) => TokenKind::Reserved(ident),
            _ => TokenKind::Ident(ident),
        }
    }

    /// Skip whitespace and comments, noting line breaks
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some('\n') => {
                    self.saw_newline = true;
                    self.advance();
                }
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        self.skip_line_comment();
                    } else if self.peek_ahead(1) == Some('*') {
                        self.skip_block_comment()?;
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip single-line comment (// ...), leaving the newline in place
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Skip multi-line comment (/* ... */)
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start_loc = self.current_location();
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance(); // skip '*'
                self.advance(); // skip '/'
                return Ok(());
            }
            if self.peek() == Some('\n') {
                self.saw_newline = true;
            }
            self.advance();
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}
