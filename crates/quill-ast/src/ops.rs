//! Operator enums and the desugaring table.
//!
//! Binary operators are syntactic sugar for method calls on the left
//! operand; [`BinaryOp::method_name`] is the desugaring table. The
//! short-circuit boolean operators are a distinct kind so the emitter can
//! lower them to branches instead of values.

use quill_common::{CompileError, CompileResult, ErrorKind};

/// Binary operators that desugar to a method call on the left operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Plus,
    Minus,
    Times,
    Divide,
    Less,
    AtMost,
    More,
    AtLeast,
    Equals,
}

impl BinaryOp {
    /// The built-in method this operator dispatches to.
    #[must_use]
    pub const fn method_name(self) -> &'static str {
        match self {
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Times => "TIMES",
            Self::Divide => "DIVIDE",
            Self::Less => "LESS",
            Self::AtMost => "ATMOST",
            Self::More => "MORE",
            Self::AtLeast => "ATLEAST",
            Self::Equals => "EQUALS",
        }
    }

    /// Source-level spelling of the operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Times => "*",
            Self::Divide => "/",
            Self::Less => "<",
            Self::AtMost => "<=",
            Self::More => ">",
            Self::AtLeast => ">=",
            Self::Equals => "==",
        }
    }

    /// Look up an operator by its source spelling.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Plus),
            "-" => Some(Self::Minus),
            "*" => Some(Self::Times),
            "/" => Some(Self::Divide),
            "<" => Some(Self::Less),
            "<=" => Some(Self::AtMost),
            ">" => Some(Self::More),
            ">=" => Some(Self::AtLeast),
            "==" => Some(Self::Equals),
            _ => None,
        }
    }

    /// Parser-facing lookup that reports unknown spellings.
    pub fn resolve(symbol: &str) -> CompileResult<Self> {
        Self::from_symbol(symbol).ok_or_else(|| {
            CompileError::inference(
                ErrorKind::UnknownBinOp,
                format!("Unknown binary operator \"{symbol}\""),
            )
        })
    }
}

/// Short-circuit boolean operators. `Not` has no right operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    /// Source-level spelling, also used to prefix generated labels.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        }
    }
}

/// Unary operators. Negation lowers as `0 - operand`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

impl UnaryOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
        }
    }
}
