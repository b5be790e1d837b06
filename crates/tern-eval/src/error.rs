//! Runtime failure types for the Tern evaluator.
//!
//! Every failure is recoverable by the caller and carries a structured
//! payload — kind, the offending token's span (1-based line/column), and the
//! token's lexeme — sufficient for an external collaborator to render a
//! message. This crate does not format source-context messages itself.

use serde::Serialize;
use tern_types::Span;
use thiserror::Error;

/// Evaluation failure.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind")]
pub enum EvalError {
    /// A name declared twice directly in the same scope.
    #[error("duplicate declaration of '{name}' at {span}")]
    DuplicateDeclaration { name: String, span: Span },

    /// Name lookup exhausted the scope chain.
    #[error("undeclared variable '{name}' at {span}")]
    UndeclaredVariable { name: String, span: Span },

    /// Assignment to a locked constant.
    #[error("cannot assign to '{name}' at {span}: not writable")]
    NotWritable { name: String, span: Span },

    /// Operand, assignment, or parameter type violates the lattice rules.
    #[error("type mismatch at {span}: {message}")]
    TypeMismatch {
        message: String,
        lexeme: String,
        span: Span,
    },

    /// Call argument count does not match the method's parameter count.
    #[error("'{name}' expects {expected} argument(s), got {found} at {span}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    /// A native method body's host callable signaled an internal error.
    /// Host error types never cross the boundary; only the message does.
    #[error("method '{name}' failed at {span}: {message}")]
    EngineFailure {
        name: String,
        message: String,
        span: Span,
    },

    /// Division or modulo by zero, integer overflow.
    #[error("arithmetic error at {span}: {message}")]
    ArithmeticError {
        message: String,
        lexeme: String,
        span: Span,
    },

    /// Nested calls exceeded the engine's recursion limit.
    #[error("recursion limit exceeded in '{name}' at {span}")]
    RecursionLimit { name: String, span: Span },

    /// The evaluation step budget ran out.
    #[error("evaluation fuel exhausted")]
    FuelExhausted,
}

impl EvalError {
    /// The offending token's span, if the failure has a source location.
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::DuplicateDeclaration { span, .. }
            | Self::UndeclaredVariable { span, .. }
            | Self::NotWritable { span, .. }
            | Self::TypeMismatch { span, .. }
            | Self::ArityMismatch { span, .. }
            | Self::EngineFailure { span, .. }
            | Self::ArithmeticError { span, .. }
            | Self::RecursionLimit { span, .. } => Some(*span),
            Self::FuelExhausted => None,
        }
    }

    /// The offending token's literal text, if the failure has one.
    pub fn lexeme(&self) -> Option<&str> {
        match self {
            Self::DuplicateDeclaration { name, .. }
            | Self::UndeclaredVariable { name, .. }
            | Self::NotWritable { name, .. }
            | Self::ArityMismatch { name, .. }
            | Self::EngineFailure { name, .. }
            | Self::RecursionLimit { name, .. } => Some(name),
            Self::TypeMismatch { lexeme, .. } | Self::ArithmeticError { lexeme, .. } => {
                Some(lexeme)
            }
            Self::FuelExhausted => None,
        }
    }

    /// The structured payload as JSON, for the diagnostics boundary.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
