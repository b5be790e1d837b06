//! Tern tree-walking evaluator.
//!
//! Executes Tern programs directly from the syntax tree: resolves names
//! through a scoped symbol table, enforces the type lattice on every
//! assignment and operator, and dispatches calls to native or interpreted
//! method bodies.

mod engine;
mod env;
mod error;
mod method;
mod symbol;
mod value;

pub use engine::{Engine, EvalContext};
pub use env::Environment;
pub use error::{EvalError, EvalResult};
pub use method::{Method, MethodBody, NativeError, NativeFn, Param};
pub use symbol::{Symbol, SymbolKind};
pub use value::Value;
