// AST (Abstract Syntax Tree) definitions for the JavaScript subset

use crate::memory::value::format_number;
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Declaration keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

impl DeclKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        }
    }

    /// `let` and `const` are block scoped and start in the temporal dead zone
    pub fn is_lexical(self) -> bool {
        matches!(self, DeclKind::Let | DeclKind::Const)
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinOp {
    /// Comparisons get their own `comparison` step
    pub fn is_comparison(self) -> bool {
        !matches!(
            self,
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::StrictEq => "===",
            BinOp::StrictNotEq => "!==",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
        }
    }
}

/// Short-circuiting operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,    // -x
    Plus,   // +x
    Not,    // !x
    Typeof, // typeof x
}

/// `++` / `--`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

impl UpdateOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        }
    }
}

/// Assignment operators, plain and compound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl AssignOp {
    /// The arithmetic operator applied by a compound assignment
    pub fn binary(self) -> Option<BinOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinOp::Add),
            AssignOp::Sub => Some(BinOp::Sub),
            AssignOp::Mul => Some(BinOp::Mul),
            AssignOp::Div => Some(BinOp::Div),
            AssignOp::Mod => Some(BinOp::Mod),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
        }
    }
}

/// Function definition shared by declarations, function expressions and arrows.
///
/// Held behind an `Rc` so function values on the heap can point at their body
/// without cloning the tree.
#[derive(Debug)]
pub struct FunctionDef {
    pub name: Option<String>,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
    pub is_arrow: bool,
    pub location: SourceLocation,
    /// Location of the closing brace (or of the arrow body expression)
    pub end_location: SourceLocation,
}

/// One `name = init` entry of a variable declaration
#[derive(Debug, Clone)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Expr>,
    pub location: SourceLocation,
}

/// One `key: value` entry of an object literal
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub key: String,
    pub value: Expr,
}

/// Statements
#[derive(Debug, Clone)]
pub enum Stmt {
    VarDecl {
        kind: DeclKind,
        declarations: Vec<Declarator>,
        location: SourceLocation,
    },
    FunctionDecl {
        def: Rc<FunctionDef>,
        location: SourceLocation,
    },
    Expression {
        expr: Expr,
        location: SourceLocation,
    },
    Block {
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        location: SourceLocation,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
        location: SourceLocation,
    },
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
        location: SourceLocation,
    },
    Return {
        value: Option<Expr>,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    Empty {
        location: SourceLocation,
    },
}

impl Stmt {
    pub fn location(&self) -> SourceLocation {
        match self {
            Stmt::VarDecl { location, .. }
            | Stmt::FunctionDecl { location, .. }
            | Stmt::Expression { location, .. }
            | Stmt::Block { location, .. }
            | Stmt::If { location, .. }
            | Stmt::While { location, .. }
            | Stmt::DoWhile { location, .. }
            | Stmt::For { location, .. }
            | Stmt::Return { location, .. }
            | Stmt::Break { location }
            | Stmt::Continue { location }
            | Stmt::Empty { location } => *location,
        }
    }
}

/// Expressions
#[derive(Debug, Clone)]
pub enum Expr {
    Number(f64, SourceLocation),
    Str(String, SourceLocation),
    Bool(bool, SourceLocation),
    Null(SourceLocation),
    Undefined(SourceLocation),
    Identifier(String, SourceLocation),
    Array {
        elements: Vec<Expr>,
        location: SourceLocation,
    },
    Object {
        properties: Vec<PropertyDef>,
        location: SourceLocation,
    },
    Function {
        def: Rc<FunctionDef>,
        location: SourceLocation,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        location: SourceLocation,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        target: Box<Expr>,
        location: SourceLocation,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
        location: SourceLocation,
    },
    Conditional {
        condition: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
        location: SourceLocation,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
        location: SourceLocation,
    },
    Member {
        object: Box<Expr>,
        property: String,
        location: SourceLocation,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        location: SourceLocation,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        location: SourceLocation,
    },
}

impl Expr {
    pub fn location(&self) -> SourceLocation {
        match self {
            Expr::Number(_, loc)
            | Expr::Str(_, loc)
            | Expr::Bool(_, loc)
            | Expr::Null(loc)
            | Expr::Undefined(loc)
            | Expr::Identifier(_, loc) => *loc,
            Expr::Array { location, .. }
            | Expr::Object { location, .. }
            | Expr::Function { location, .. }
            | Expr::Unary { location, .. }
            | Expr::Update { location, .. }
            | Expr::Binary { location, .. }
            | Expr::Logical { location, .. }
            | Expr::Conditional { location, .. }
            | Expr::Assign { location, .. }
            | Expr::Member { location, .. }
            | Expr::Index { location, .. }
            | Expr::Call { location, .. } => *location,
        }
    }

    /// Operators whose operands need parentheses when printed inside another operator
    fn is_compound(&self) -> bool {
        matches!(
            self,
            Expr::Binary { .. }
                | Expr::Logical { .. }
                | Expr::Conditional { .. }
                | Expr::Assign { .. }
        )
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_compound() {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Compact source rendering used in step descriptions
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n, _) => write!(f, "{}", format_number(*n)),
            Expr::Str(s, _) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Expr::Bool(b, _) => write!(f, "{}", b),
            Expr::Null(_) => write!(f, "null"),
            Expr::Undefined(_) => write!(f, "undefined"),
            Expr::Identifier(name, _) => write!(f, "{}", name),
            Expr::Array { elements, .. } => {
                write!(f, "[")?;
                write_list(f, elements)?;
                write!(f, "]")
            }
            Expr::Object { properties, .. } => {
                if properties.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (i, prop) in properties.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", prop.key, prop.value)?;
                }
                write!(f, " }}")
            }
            Expr::Function { def, .. } => {
                let params = def.params.join(", ");
                if def.is_arrow {
                    write!(f, "({}) => {{…}}", params)
                } else {
                    match &def.name {
                        Some(name) => write!(f, "function {}({}) {{…}}", name, params),
                        None => write!(f, "function({}) {{…}}", params),
                    }
                }
            }
            Expr::Unary { op, operand, .. } => {
                match op {
                    UnaryOp::Neg => write!(f, "-")?,
                    UnaryOp::Plus => write!(f, "+")?,
                    UnaryOp::Not => write!(f, "!")?,
                    UnaryOp::Typeof => write!(f, "typeof ")?,
                }
                operand.fmt_operand(f)
            }
            Expr::Update {
                op, prefix, target, ..
            } => {
                if *prefix {
                    write!(f, "{}{}", op.symbol(), target)
                } else {
                    write!(f, "{}{}", target, op.symbol())
                }
            }
            Expr::Binary {
                op, left, right, ..
            } => {
                left.fmt_operand(f)?;
                write!(f, " {} ", op.symbol())?;
                right.fmt_operand(f)
            }
            Expr::Logical {
                op, left, right, ..
            } => {
                left.fmt_operand(f)?;
                match op {
                    LogicalOp::And => write!(f, " && ")?,
                    LogicalOp::Or => write!(f, " || ")?,
                }
                right.fmt_operand(f)
            }
            Expr::Conditional {
                condition,
                consequent,
                alternate,
                ..
            } => {
                condition.fmt_operand(f)?;
                write!(f, " ? ")?;
                consequent.fmt_operand(f)?;
                write!(f, " : ")?;
                alternate.fmt_operand(f)
            }
            Expr::Assign {
                op, target, value, ..
            } => write!(f, "{} {} {}", target, op.symbol(), value),
            Expr::Member {
                object, property, ..
            } => {
                object.fmt_operand(f)?;
                write!(f, ".{}", property)
            }
            Expr::Index { object, index, .. } => {
                object.fmt_operand(f)?;
                write!(f, "[{}]", index)
            }
            Expr::Call { callee, args, .. } => {
                callee.fmt_operand(f)?;
                write!(f, "(")?;
                write_list(f, args)?;
                write!(f, ")")
            }
        }
    }
}

/// Complete program (the global function body)
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub body: Vec<Stmt>,
}

impl Program {
    pub fn new() -> Self {
        Program { body: Vec::new() }
    }
}
