//! Runtime values.

use std::fmt;
use tern_types::Type;

/// A typed, possibly-undefined datum.
///
/// Values are immutable once constructed; mutation happens by replacing the
/// Value bound to a [`Symbol`](crate::Symbol), never in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    /// The sentinel for a binding that has no value yet.
    Undefined,
}

impl Value {
    /// The lattice kind of this value.
    pub fn type_of(&self) -> Type {
        match self {
            Self::Int(_) => Type::Int,
            Self::Float(_) => Type::Float,
            Self::Bool(_) => Type::Bool,
            Self::Undefined => Type::Undefined,
        }
    }

    /// Widen into the target kind where the lattice allows it (Int → Float).
    /// Any other combination returns the value unchanged; narrowing never
    /// happens here.
    pub fn widen_to(self, to: Type) -> Value {
        match (self, to) {
            (Self::Int(n), Type::Float) => Self::Float(n as f64),
            _ => self,
        }
    }

    /// Numeric payload as f64, for mixed-kind arithmetic and comparison.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Undefined => write!(f, "undefined"),
        }
    }
}
