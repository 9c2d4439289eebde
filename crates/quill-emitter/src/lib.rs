//! C code emission for the Quill compiler.
//!
//! Translates the typed AST into a C program built from object structs,
//! per-class dispatch records, constructor and method functions, and a
//! labeled control-flow lowering of structured statements. Classes are
//! emitted supers-first so every subclass's structs begin with its
//! super's prefix, which is what permits polymorphic pointer casts.

pub mod emit;
pub mod names;
pub mod writer;

pub use emit::emit_program;
pub use writer::{CodeWriter, EmitOptions};
