//! Shared types for the Tern interpreter.
//!
//! This crate defines the syntax tree node types, source spans, and the
//! closed type lattice used by the evaluator.

mod span;
pub mod ast;
pub mod ty;

pub use span::Span;
pub use ty::Type;
