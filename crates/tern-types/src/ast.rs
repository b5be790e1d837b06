//! Syntax tree node types for the Tern interpreter.
//!
//! Every node carries a [`Span`] for error reporting. The evaluator consumes
//! this tree as-is; how it is produced (lexer, parser) is out of scope for
//! this crate. Recursive positions are boxed to keep enum sizes reasonable.

use crate::ty::Type;
use crate::Span;

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node: a kind plus its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    IntLit(i64),
    FloatLit(f64),
    BoolLit(bool),

    /// A reference to a declared name.
    Identifier(String),

    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// A call to a registered method: `name(args)`.
    Call {
        name: Ident,
        args: Vec<Expr>,
    },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    And,
    Or,
}

impl BinOp {
    /// The operator's surface lexeme, used in diagnostics.
    pub fn lexeme(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn lexeme(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "not",
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements & Blocks
// ══════════════════════════════════════════════════════════════════════════════

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Declare(DeclareStmt),
    Assign(AssignStmt),
    Expr(Expr),
    Block(Block),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Self::Declare(d) => d.span,
            Self::Assign(a) => a.span,
            Self::Expr(e) => e.span,
            Self::Block(b) => b.span,
        }
    }
}

/// Declaration mutability kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// `var x = ...` — always writable.
    Var,
    /// `const x = ...` — locked immediately after its initializer binds.
    Const,
}

/// `var x: Int = expr` / `const y = expr`
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareStmt {
    pub kind: DeclKind,
    pub name: Ident,
    /// Optional type annotation. Absent means the declared type is inferred
    /// from the first assignment.
    pub ty: Option<Type>,
    pub init: Option<Expr>,
    pub span: Span,
}

/// `x = expr`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Ident,
    pub value: Expr,
    pub span: Span,
}

/// A brace-delimited sequence of statements. Evaluates to the value of its
/// last statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Self {
        Self { stmts, span }
    }
}
