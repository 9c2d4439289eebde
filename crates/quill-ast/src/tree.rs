//! Statement and expression tree.
//!
//! Each syntactic category is a single tagged enum so every phase can do
//! exhaustive case analysis. Expressions carry an inferred-type slot
//! (`ty`); once set it only moves upward in the subtype lattice during
//! inference.

use crate::ops::{BinaryOp, LogicalOp, UnaryOp};
use quill_common::ClassId;

/// An expression node plus its inferred-type slot.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Filled in by type inference; `None` until the first iteration
    /// reaches the node.
    pub ty: Option<ClassId>,
}

/// Expression variants.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Int(i32),
    Bool(bool),
    Str(String),
    Nothing,
    /// Bare name, including the receiver keyword `this`.
    Ident(String),
    /// Field or method access: `object.member`.
    Access {
        object: Box<Expr>,
        member: Member,
    },
    /// Call without a receiver - a constructor invocation of the named
    /// class.
    Call(CallExpr),
    /// Binary operator; desugars to a method call on the left operand.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Short-circuit boolean operator; lowers to branches, not values.
    /// `right` is `None` only for `not`.
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Option<Box<Expr>>,
    },
    /// Unary operator.
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// Typing annotation: `expr : TypeName`. The annotation may be
    /// absent; assignment targets are always wrapped in this node.
    Typed {
        expr: Box<Expr>,
        type_name: Option<String>,
    },
}

/// What follows the dot of an access expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Member {
    /// Field read or write target: `obj.f`.
    Field(String),
    /// Method call: `obj.m(args)`.
    Call(CallExpr),
}

/// Name plus argument list of a call.
#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub name: String,
    pub args: Vec<Expr>,
}

/// Statement variants.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// Expression evaluated for effect.
    Expr(Expr),
    /// `lhs = rhs`; the left-hand side is a [`ExprKind::Typed`] node.
    Assign { lhs: Expr, rhs: Expr },
    If {
        cond: Expr,
        then_block: Block,
        else_block: Block,
    },
    While {
        cond: Expr,
        body: Block,
    },
    /// `return` with optional expression; the checker appends implicit
    /// `return none` statements where the declared return admits it.
    Return(Option<Expr>),
    Typecase {
        scrutinee: Expr,
        alternatives: Vec<TypeAlternative>,
    },
}

/// One `name : Type { block }` alternative of a typecase.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeAlternative {
    pub binding: String,
    pub class_name: String,
    pub block: Block,
}

/// An ordered sequence of statements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    #[must_use]
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn append(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}

impl Expr {
    /// Wrap a kind with an empty inferred-type slot.
    #[must_use]
    pub fn new(kind: ExprKind) -> Self {
        Self { kind, ty: None }
    }

    #[must_use]
    pub fn int(value: i32) -> Self {
        Self::new(ExprKind::Int(value))
    }

    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Self::new(ExprKind::Bool(value))
    }

    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::Str(value.into()))
    }

    #[must_use]
    pub fn nothing() -> Self {
        Self::new(ExprKind::Nothing)
    }

    #[must_use]
    pub fn ident(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Ident(name.into()))
    }

    /// `this`.
    #[must_use]
    pub fn this() -> Self {
        Self::ident(crate::SELF_NAME)
    }

    /// Field access `object.field`.
    #[must_use]
    pub fn field(object: Expr, field: impl Into<String>) -> Self {
        Self::new(ExprKind::Access {
            object: Box::new(object),
            member: Member::Field(field.into()),
        })
    }

    /// Method call `object.name(args)`.
    #[must_use]
    pub fn method_call(object: Expr, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Access {
            object: Box::new(object),
            member: Member::Call(CallExpr {
                name: name.into(),
                args,
            }),
        })
    }

    /// Constructor call `Name(args)`.
    #[must_use]
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::new(ExprKind::Call(CallExpr {
            name: name.into(),
            args,
        }))
    }

    #[must_use]
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    #[must_use]
    pub fn and(left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Logical {
            op: LogicalOp::And,
            left: Box::new(left),
            right: Some(Box::new(right)),
        })
    }

    #[must_use]
    pub fn or(left: Expr, right: Expr) -> Self {
        Self::new(ExprKind::Logical {
            op: LogicalOp::Or,
            left: Box::new(left),
            right: Some(Box::new(right)),
        })
    }

    #[must_use]
    pub fn not(operand: Expr) -> Self {
        Self::new(ExprKind::Logical {
            op: LogicalOp::Not,
            left: Box::new(operand),
            right: None,
        })
    }

    #[must_use]
    pub fn neg(operand: Expr) -> Self {
        Self::new(ExprKind::Unary {
            op: UnaryOp::Neg,
            operand: Box::new(operand),
        })
    }

    /// Typing annotation `expr : TypeName` (or a bare target when the
    /// annotation is absent).
    #[must_use]
    pub fn typed(expr: Expr, type_name: Option<String>) -> Self {
        Self::new(ExprKind::Typed {
            expr: Box::new(expr),
            type_name,
        })
    }

    /// Whether this node is the bare identifier `name`.
    #[must_use]
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, ExprKind::Ident(text) if text == name)
    }
}

impl Stmt {
    /// Assignment with an unannotated target.
    #[must_use]
    pub fn assign(target: Expr, rhs: Expr) -> Self {
        Self::Assign {
            lhs: Expr::typed(target, None),
            rhs,
        }
    }

    /// Assignment with an annotated target, `target : TypeName = rhs`.
    #[must_use]
    pub fn assign_typed(target: Expr, type_name: impl Into<String>, rhs: Expr) -> Self {
        Self::Assign {
            lhs: Expr::typed(target, Some(type_name.into())),
            rhs,
        }
    }
}
