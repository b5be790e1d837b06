//! Callable method bodies: native (host-supplied) or interpreted
//! (syntax-tree, run by the engine).

use crate::engine::EvalContext;
use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::value::Value;
use std::fmt;
use std::rc::Rc;
use tern_types::ast::{Block, Ident};
use tern_types::{Span, Type};

/// A declared parameter: name plus expected type.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub ty: Type,
}

impl Param {
    pub fn new(name: Ident, ty: Type) -> Self {
        Self { name, ty }
    }
}

/// An error raised inside a host callable.
///
/// This is the only error shape a native body may signal; the engine wraps
/// it as [`EvalError::EngineFailure`] so host error types never cross the
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeError(pub String);

impl From<&str> for NativeError {
    fn from(msg: &str) -> Self {
        Self(msg.to_string())
    }
}

impl From<String> for NativeError {
    fn from(msg: String) -> Self {
        Self(msg)
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A host callable. The engine is single-threaded, so plain `Rc` sharing.
pub type NativeFn = Rc<dyn Fn(&mut EvalContext<'_>) -> Result<Value, NativeError>>;

/// The two body variants behind one `apply` operation.
pub enum MethodBody {
    Native(NativeFn),
    /// A syntax-tree body plus a snapshot of the declaring environment,
    /// giving the body closure semantics over its definition site.
    Interpreted { body: Block, captured: Environment },
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native(_) => f.write_str("<native>"),
            Self::Interpreted { body, .. } => write!(f, "<interpreted {} stmt(s)>", body.stmts.len()),
        }
    }
}

/// An immutable callable, shared by every call site that resolves to it.
#[derive(Debug)]
pub struct Method {
    name: Ident,
    params: Vec<Param>,
    body: MethodBody,
}

impl Method {
    /// Wrap a host callable. Host-registered methods have no source
    /// location, so the declaration span is synthetic.
    pub fn native<F>(name: &str, params: Vec<Param>, f: F) -> Self
    where
        F: Fn(&mut EvalContext<'_>) -> Result<Value, NativeError> + 'static,
    {
        Self {
            name: Ident::new(name, Span::point(0, 0)),
            params,
            body: MethodBody::Native(Rc::new(f)),
        }
    }

    pub(crate) fn interpreted(
        name: Ident,
        params: Vec<Param>,
        body: Block,
        captured: Environment,
    ) -> Self {
        Self {
            name,
            params,
            body: MethodBody::Interpreted { body, captured },
        }
    }

    pub fn name(&self) -> &str {
        &self.name.name
    }

    pub fn decl_span(&self) -> Span {
        self.name.span
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Run the body against a per-call context. Arity and argument types
    /// have already been checked at the call boundary.
    pub fn apply(&self, ctx: &mut EvalContext<'_>) -> EvalResult<Value> {
        match &self.body {
            MethodBody::Native(f) => f(ctx).map_err(|e| EvalError::EngineFailure {
                name: self.name.name.clone(),
                message: e.0,
                span: ctx.call_span(),
            }),
            MethodBody::Interpreted { body, captured } => {
                ctx.run_interpreted(&self.params, body, captured)
            }
        }
    }
}
