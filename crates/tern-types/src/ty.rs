//! The closed type lattice: value kinds, assignability, operator typing.
//!
//! The set of kinds is a fixed enumeration — extension happens by adding a
//! case here and updating the (total) rule functions, never by open
//! subclassing. Both rule functions are pure; an unsupported combination is
//! reported as `None`, which the evaluator surfaces as a type mismatch.

use crate::ast::{BinOp, UnaryOp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Int,
    Float,
    Bool,
    /// The kind of a binding that has not yet received a value.
    Undefined,
}

impl Type {
    /// Display name for diagnostics. Total over the enumeration.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "Integer",
            Self::Float => "Float",
            Self::Bool => "Boolean",
            Self::Undefined => "Undefined",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a value of type `from` may be stored where `to` is declared.
///
/// Reflexive for every kind. The only cross-kind edge is the widening
/// direction `Int -> Float`; narrowing is never implicit. `Undefined`
/// unifies only with itself.
pub fn is_assignable(from: Type, to: Type) -> bool {
    from == to || (from == Type::Int && to == Type::Float)
}

/// Result type of a binary operator applied to the given operand types.
///
/// `None` means the triple is unsupported. Mixed Int/Float arithmetic
/// promotes to Float; comparisons over numerics yield Bool; logical
/// operators require Bool on both sides (no truthiness coercion).
pub fn result_type(op: BinOp, lhs: Type, rhs: Type) -> Option<Type> {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
            match (lhs, rhs) {
                (Type::Int, Type::Int) => Some(Type::Int),
                (l, r) if l.is_numeric() && r.is_numeric() => Some(Type::Float),
                _ => None,
            }
        }
        BinOp::Less | BinOp::Greater | BinOp::LessEq | BinOp::GreaterEq => {
            if lhs.is_numeric() && rhs.is_numeric() {
                Some(Type::Bool)
            } else {
                None
            }
        }
        BinOp::Eq | BinOp::NotEq => {
            if (lhs == rhs && lhs != Type::Undefined)
                || (lhs.is_numeric() && rhs.is_numeric())
            {
                Some(Type::Bool)
            } else {
                None
            }
        }
        BinOp::And | BinOp::Or => {
            if lhs == Type::Bool && rhs == Type::Bool {
                Some(Type::Bool)
            } else {
                None
            }
        }
    }
}

/// Result type of a unary operator applied to the given operand type.
pub fn unary_result_type(op: UnaryOp, operand: Type) -> Option<Type> {
    match op {
        UnaryOp::Neg => operand.is_numeric().then_some(operand),
        UnaryOp::Not => (operand == Type::Bool).then_some(Type::Bool),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Type; 4] = [Type::Int, Type::Float, Type::Bool, Type::Undefined];

    #[test]
    fn test_assignability_reflexive() {
        for ty in ALL {
            assert!(is_assignable(ty, ty), "{ty} not assignable to itself");
        }
    }

    #[test]
    fn test_assignability_widens_only() {
        assert!(is_assignable(Type::Int, Type::Float));
        assert!(!is_assignable(Type::Float, Type::Int));
    }

    #[test]
    fn test_undefined_unifies_only_with_itself() {
        for ty in [Type::Int, Type::Float, Type::Bool] {
            assert!(!is_assignable(Type::Undefined, ty));
            assert!(!is_assignable(ty, Type::Undefined));
        }
    }

    #[test]
    fn test_arithmetic_promotion() {
        assert_eq!(result_type(BinOp::Add, Type::Int, Type::Int), Some(Type::Int));
        assert_eq!(
            result_type(BinOp::Add, Type::Int, Type::Float),
            Some(Type::Float)
        );
        assert_eq!(
            result_type(BinOp::Mul, Type::Float, Type::Int),
            Some(Type::Float)
        );
    }

    #[test]
    fn test_logical_requires_bool() {
        assert_eq!(
            result_type(BinOp::And, Type::Bool, Type::Bool),
            Some(Type::Bool)
        );
        assert_eq!(result_type(BinOp::And, Type::Int, Type::Bool), None);
        assert_eq!(result_type(BinOp::Or, Type::Bool, Type::Float), None);
    }

    #[test]
    fn test_undefined_participates_in_no_operator() {
        for op in [BinOp::Add, BinOp::Eq, BinOp::Less, BinOp::And] {
            for ty in ALL {
                assert_eq!(result_type(op, Type::Undefined, ty), None);
                assert_eq!(result_type(op, ty, Type::Undefined), None);
            }
        }
    }

    #[test]
    fn test_comparison_yields_bool() {
        assert_eq!(
            result_type(BinOp::Less, Type::Int, Type::Float),
            Some(Type::Bool)
        );
        assert_eq!(result_type(BinOp::Less, Type::Bool, Type::Bool), None);
    }

    #[test]
    fn test_equality_same_kind() {
        assert_eq!(
            result_type(BinOp::Eq, Type::Bool, Type::Bool),
            Some(Type::Bool)
        );
        assert_eq!(result_type(BinOp::Eq, Type::Bool, Type::Int), None);
    }

    #[test]
    fn test_unary_rules() {
        assert_eq!(unary_result_type(UnaryOp::Neg, Type::Int), Some(Type::Int));
        assert_eq!(
            unary_result_type(UnaryOp::Neg, Type::Float),
            Some(Type::Float)
        );
        assert_eq!(unary_result_type(UnaryOp::Neg, Type::Bool), None);
        assert_eq!(unary_result_type(UnaryOp::Not, Type::Bool), Some(Type::Bool));
        assert_eq!(unary_result_type(UnaryOp::Not, Type::Int), None);
    }
}
