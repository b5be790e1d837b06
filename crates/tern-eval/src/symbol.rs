//! Symbol table entries: named bindings with a declared type and a
//! mutability state.

use crate::error::{EvalError, EvalResult};
use crate::value::Value;
use tern_types::ty;
use tern_types::{Span, Type};

/// How a symbol was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Always writable.
    Variable,
    /// Writable until [`Symbol::lock`], then permanently read-only.
    Constant,
}

/// A named binding to a declared type and current value.
///
/// Mutability is explicit state, not subclass identity: constants start
/// writable so their initializer can bind, and the evaluator locks them
/// immediately afterward. The lock transition is one-way.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    name: String,
    decl_span: Span,
    declared_ty: Type,
    value: Value,
    writable: bool,
    kind: SymbolKind,
}

impl Symbol {
    /// Create a variable. Declared type defaults to Undefined and is
    /// narrowed by the first assignment.
    pub fn variable(name: impl Into<String>, ty: Option<Type>, decl_span: Span) -> Self {
        Self::new(name, ty, decl_span, SymbolKind::Variable)
    }

    /// Create a constant, initially writable.
    pub fn constant(name: impl Into<String>, ty: Option<Type>, decl_span: Span) -> Self {
        Self::new(name, ty, decl_span, SymbolKind::Constant)
    }

    fn new(name: impl Into<String>, ty: Option<Type>, decl_span: Span, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            decl_span,
            declared_ty: ty.unwrap_or(Type::Undefined),
            value: Value::Undefined,
            writable: true,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn decl_span(&self) -> Span {
        self.decl_span
    }

    pub fn declared_ty(&self) -> Type {
        self.declared_ty
    }

    pub fn value(&self) -> Value {
        self.value
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Make a constant permanently read-only. One-way; safe to call more
    /// than once. Has no effect on variables.
    pub fn lock(&mut self) {
        if self.kind == SymbolKind::Constant {
            self.writable = false;
        }
    }

    /// Replace the bound value.
    ///
    /// Fails `NotWritable` on a locked constant. If the declared type is
    /// still Undefined, the first assignment narrows it to the value's kind;
    /// afterwards every assignment must satisfy the lattice's assignability
    /// rule or fail `TypeMismatch`. Int payloads widen into Float-declared
    /// symbols on store.
    pub fn assign(&mut self, value: Value, site: Span) -> EvalResult<()> {
        if !self.writable {
            return Err(EvalError::NotWritable {
                name: self.name.clone(),
                span: site,
            });
        }
        if self.declared_ty == Type::Undefined {
            self.declared_ty = value.type_of();
            self.value = value;
            return Ok(());
        }
        if !ty::is_assignable(value.type_of(), self.declared_ty) {
            return Err(EvalError::TypeMismatch {
                message: format!(
                    "cannot assign {} to '{}' of type {}",
                    value.type_of(),
                    self.name,
                    self.declared_ty
                ),
                lexeme: self.name.clone(),
                span: site,
            });
        }
        self.value = value.widen_to(self.declared_ty);
        Ok(())
    }
}
