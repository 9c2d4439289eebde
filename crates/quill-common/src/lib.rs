//! Common types for the Quill compiler.
//!
//! This crate is the base layer shared by every compiler phase (AST,
//! binder, checker, emitter, driver). Placing the cross-phase types here
//! establishes a clear dependency hierarchy:
//!
//! ```text
//! common (base layer)
//!   ↓
//! ast → binder → checker → emitter → driver
//! ```
//!
//! No crate in the chain depends on one that appears later.

pub mod class_id;
pub mod errors;
pub mod newline;

pub use class_id::ClassId;
pub use errors::{CompileError, CompileResult, ErrorKind, Stage};
pub use newline::NewLineKind;
