//! Operator and keyword enums for the syntax-node model.
//!
//! Every operator set is closed and matched exhaustively; the surface symbol
//! of each variant is the single source of truth for both the parser (symbol
//! lookup) and the code generator (emission).

use std::fmt;

use serde::{Serialize, Serializer};

use super::Precedence;

/// Implements Display and Serialize in terms of the enum's `as_str`.
macro_rules! impl_symbol_traits {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

// ============================================================================
// BINARY OPERATORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    ShiftLeft,
    ShiftRight,
    UnsignedShiftRight,
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    BitOr,
    BitXor,
    BitAnd,
    In,
    Instanceof,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::StrictEqual => "===",
            Self::StrictNotEqual => "!==",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::UnsignedShiftRight => ">>>",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Remainder => "%",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::BitAnd => "&",
            Self::In => "in",
            Self::Instanceof => "instanceof",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "==" => Self::Equal,
            "!=" => Self::NotEqual,
            "===" => Self::StrictEqual,
            "!==" => Self::StrictNotEqual,
            "<" => Self::Less,
            "<=" => Self::LessEqual,
            ">" => Self::Greater,
            ">=" => Self::GreaterEqual,
            "<<" => Self::ShiftLeft,
            ">>" => Self::ShiftRight,
            ">>>" => Self::UnsignedShiftRight,
            "+" => Self::Add,
            "-" => Self::Subtract,
            "*" => Self::Multiply,
            "/" => Self::Divide,
            "%" => Self::Remainder,
            "|" => Self::BitOr,
            "^" => Self::BitXor,
            "&" => Self::BitAnd,
            "in" => Self::In,
            "instanceof" => Self::Instanceof,
            _ => return None,
        };
        Some(op)
    }

    /// Formatting priority consumed by the code generator.
    pub fn precedence(&self) -> Precedence {
        match self {
            Self::BitOr => Precedence::BitwiseOr,
            Self::BitXor => Precedence::BitwiseXor,
            Self::BitAnd => Precedence::BitwiseAnd,
            Self::Equal | Self::NotEqual | Self::StrictEqual | Self::StrictNotEqual => {
                Precedence::Equality
            }
            Self::Less
            | Self::LessEqual
            | Self::Greater
            | Self::GreaterEqual
            | Self::In
            | Self::Instanceof => Precedence::Relational,
            Self::ShiftLeft | Self::ShiftRight | Self::UnsignedShiftRight => Precedence::Shift,
            Self::Add | Self::Subtract => Precedence::Additive,
            Self::Multiply | Self::Divide | Self::Remainder => Precedence::Multiplicative,
        }
    }

    /// Word operators need surrounding spaces regardless of operand shape.
    pub fn is_word(&self) -> bool {
        matches!(self, Self::In | Self::Instanceof)
    }
}

impl_symbol_traits!(BinaryOperator);

// ============================================================================
// LOGICAL OPERATORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "&&" => Some(Self::And),
            "||" => Some(Self::Or),
            _ => None,
        }
    }

    pub fn precedence(&self) -> Precedence {
        match self {
            Self::And => Precedence::LogicalAnd,
            Self::Or => Precedence::LogicalOr,
        }
    }
}

impl_symbol_traits!(LogicalOperator);

// ============================================================================
// UNARY & UPDATE OPERATORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Minus,
    Plus,
    Not,
    BitNot,
    Typeof,
    Void,
    Delete,
}

impl UnaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minus => "-",
            Self::Plus => "+",
            Self::Not => "!",
            Self::BitNot => "~",
            Self::Typeof => "typeof",
            Self::Void => "void",
            Self::Delete => "delete",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "-" => Self::Minus,
            "+" => Self::Plus,
            "!" => Self::Not,
            "~" => Self::BitNot,
            "typeof" => Self::Typeof,
            "void" => Self::Void,
            "delete" => Self::Delete,
            _ => return None,
        };
        Some(op)
    }

    /// Word operators require a space before their operand.
    pub fn is_word(&self) -> bool {
        matches!(self, Self::Typeof | Self::Void | Self::Delete)
    }
}

impl_symbol_traits!(UnaryOperator);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

impl UpdateOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increment => "++",
            Self::Decrement => "--",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "++" => Some(Self::Increment),
            "--" => Some(Self::Decrement),
            _ => None,
        }
    }
}

impl_symbol_traits!(UpdateOperator);

// ============================================================================
// ASSIGNMENT OPERATORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentOperator {
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    RemainderAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    UnsignedShiftRightAssign,
    BitOrAssign,
    BitXorAssign,
    BitAndAssign,
}

impl AssignmentOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubtractAssign => "-=",
            Self::MultiplyAssign => "*=",
            Self::DivideAssign => "/=",
            Self::RemainderAssign => "%=",
            Self::ShiftLeftAssign => "<<=",
            Self::ShiftRightAssign => ">>=",
            Self::UnsignedShiftRightAssign => ">>>=",
            Self::BitOrAssign => "|=",
            Self::BitXorAssign => "^=",
            Self::BitAndAssign => "&=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "=" => Self::Assign,
            "+=" => Self::AddAssign,
            "-=" => Self::SubtractAssign,
            "*=" => Self::MultiplyAssign,
            "/=" => Self::DivideAssign,
            "%=" => Self::RemainderAssign,
            "<<=" => Self::ShiftLeftAssign,
            ">>=" => Self::ShiftRightAssign,
            ">>>=" => Self::UnsignedShiftRightAssign,
            "|=" => Self::BitOrAssign,
            "^=" => Self::BitXorAssign,
            "&=" => Self::BitAndAssign,
            _ => return None,
        };
        Some(op)
    }
}

impl_symbol_traits!(AssignmentOperator);

// ============================================================================
// DECLARATION & MEMBER KINDS
// ============================================================================

/// Scope kind of a variable declaration. Defaults to `Var`, the least-scoped
/// form, so factory-built declarations behave like pre-ES2015 output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeclarationKind {
    #[default]
    Var,
    Let,
    Const,
}

impl DeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Var => "var",
            Self::Let => "let",
            Self::Const => "const",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "var" => Some(Self::Var),
            "let" => Some(Self::Let),
            "const" => Some(Self::Const),
            _ => None,
        }
    }
}

impl_symbol_traits!(DeclarationKind);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Method,
    Get,
    Set,
    Constructor,
}

impl MethodKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Method => "method",
            Self::Get => "get",
            Self::Set => "set",
            Self::Constructor => "constructor",
        }
    }
}

impl_symbol_traits!(MethodKind);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PropertyKind {
    #[default]
    Init,
    Get,
    Set,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Get => "get",
            Self::Set => "set",
        }
    }
}

impl_symbol_traits!(PropertyKind);
