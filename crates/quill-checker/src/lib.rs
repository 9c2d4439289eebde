//! Semantic analysis passes for the Quill compiler.
//!
//! Three passes run over the registry built by the binder, in order:
//!
//! 1. [`return_paths`] - proves every method with a non-`Nothing` return
//!    returns on all paths, appending an implicit `return none` where
//!    the declared return admits it
//! 2. [`assignment`] - flow-sensitive definite-assignment analysis;
//!    discovers each class's field set from its constructor
//! 3. [`infer`] - flow-insensitive fixed-point type inference, dispatch
//!    resolution and the post-inference field-subtype check
//!
//! Any pass rejects with a categorized error; later passes never run on
//! rejection.

pub mod assignment;
pub mod infer;
pub mod return_paths;

use quill_binder::{Method, Registry};
use quill_common::CompileResult;

/// Run all checker passes over an already-validated hierarchy.
pub fn run(registry: &mut Registry, main: &mut Method) -> CompileResult<()> {
    return_paths::check_return_paths(registry)?;
    assignment::check_initialization(registry, main)?;
    infer::infer_types(registry, main)
}
