//! Abstract syntax tree for the Quill compiler.
//!
//! This crate defines the data model the scanner/parser collaborator
//! delivers to the compiler core:
//!
//! - [`Program`] - declared classes plus the top-level statement block
//! - [`Block`], [`Stmt`], [`Expr`] - the statement/expression tree; every
//!   expression carries a nullable inferred-type slot that the checker
//!   fills in
//! - [`ops`] - operator enums and the operator-to-method desugaring table
//! - [`printer`] - a debug printer reconstructing source-like text
//!
//! Parent nodes exclusively own their children; there are no cycles and
//! no back references. Phases that need the enclosing class or a symbol
//! table receive them as context parameters instead.

pub mod ops;
pub mod printer;
pub mod program;
pub mod tree;

pub use ops::{BinaryOp, LogicalOp, UnaryOp};
pub use program::{ClassDecl, MethodDecl, Param, Program};
pub use tree::{Block, CallExpr, Expr, ExprKind, Member, Stmt, TypeAlternative};

/// The receiver keyword. `this` is always considered initialized and
/// resolves to the owning class during inference.
pub const SELF_NAME: &str = "this";

/// Name of the class every class chain ends at.
pub const OBJ_CLASS: &str = "Obj";

/// Name of the built-in integer class.
pub const INT_CLASS: &str = "Int";

/// Name of the built-in string class.
pub const STRING_CLASS: &str = "String";

/// Name of the built-in boolean class.
pub const BOOLEAN_CLASS: &str = "Boolean";

/// Name of the distinguished "nothing" class.
pub const NOTHING_CLASS: &str = "Nothing";
