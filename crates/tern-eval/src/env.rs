//! Scoped symbol table for the Tern evaluator.

use crate::error::{EvalError, EvalResult};
use crate::symbol::Symbol;
use std::collections::BTreeMap;

/// A single scope frame.
#[derive(Debug, Clone, Default)]
struct Frame {
    symbols: BTreeMap<String, Symbol>,
}

/// Scoped symbol table with push/pop semantics.
///
/// Names resolve from the innermost frame outward; a name declared in an
/// inner frame shadows — but does not destroy — a same-named symbol in an
/// enclosing frame. `declare` always targets the innermost frame and rejects
/// a name already present there. Frame lifetime is tied to the construct
/// that introduced it (block, call); the evaluator pops on every exit path.
#[derive(Debug, Clone)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Environment {
    /// Create an environment with one global frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    /// Push a new frame (for blocks and call frames).
    pub fn push_scope(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Pop the innermost frame, discarding its symbols. The global frame is
    /// never popped.
    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Number of live frames. Observable for scope-balance checks.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Declare a symbol in the innermost frame.
    ///
    /// Fails `DuplicateDeclaration` if the name already exists directly in
    /// that frame; shadowing an enclosing frame's name is not a duplicate.
    pub fn declare(&mut self, symbol: Symbol) -> EvalResult<()> {
        let frame = self
            .frames
            .last_mut()
            .unwrap_or_else(|| unreachable!("environment always has a global frame"));
        if frame.symbols.contains_key(symbol.name()) {
            return Err(EvalError::DuplicateDeclaration {
                name: symbol.name().to_string(),
                span: symbol.decl_span(),
            });
        }
        frame.symbols.insert(symbol.name().to_string(), symbol);
        Ok(())
    }

    /// Look up a symbol, innermost frame first. `None` once the chain is
    /// exhausted.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.symbols.get(name))
    }

    /// Mutable lookup, innermost frame first.
    pub fn resolve_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.symbols.get_mut(name))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
