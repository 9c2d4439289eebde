//! Compiler driver for the Quill language.
//!
//! Wires the phases together for one compilation:
//! registry bootstrap → hierarchy check → return-path check →
//! definite-assignment → type inference → C emission. Any stage rejects
//! with a categorized error and later stages never run.
//!
//! The scanner/parser collaborator owns the executable; this crate
//! exposes the pipeline as a library, plus the output-path and
//! error-reporting conventions it shares with embedders.

use anyhow::Context;
use quill_ast::Program;
use quill_binder::{Method, Registry, hierarchy};
use quill_common::{CompileError, CompileResult};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

pub use quill_ast as ast;
pub use quill_common::{ClassId, CompileError as Error, ErrorKind, Stage};
pub use quill_emitter::EmitOptions;

/// Result of a successful compilation, for embedders that want to look
/// at the analyzed program as well as the generated code.
#[derive(Debug)]
pub struct Compilation {
    pub registry: Registry,
    pub main: Method,
    pub code: String,
}

/// Compile a parsed program to C source text.
pub fn compile(program: Program) -> CompileResult<String> {
    compile_with_options(program, EmitOptions::default()).map(|c| c.code)
}

/// Compile a parsed program, keeping the analyzed registry around.
pub fn compile_with_options(
    program: Program,
    options: EmitOptions,
) -> CompileResult<Compilation> {
    trace!(source = %quill_ast::printer::program_to_string(&program));

    let mut registry = Registry::with_builtins();
    for class in program.classes {
        registry.declare(class)?;
    }
    let mut main = Method::entry(program.main);

    hierarchy::check(&mut registry)?;
    quill_checker::run(&mut registry, &mut main)?;
    debug!("semantic analysis completed");

    let code = quill_emitter::emit_program(&registry, &main, options);
    Ok(Compilation {
        registry,
        main,
        code,
    })
}

/// Compile and write the output next to the source: the input path with
/// its final extension replaced by `.c`.
pub fn compile_to_file(program: Program, source_path: &Path) -> anyhow::Result<PathBuf> {
    let code = compile(program)?;
    let path = output_path(source_path);
    std::fs::write(&path, code).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

/// The output path for a given source path.
#[must_use]
pub fn output_path(source_path: &Path) -> PathBuf {
    source_path.with_extension("c")
}

/// Print the single-line user-visible form on standard error.
pub fn report(error: &CompileError) {
    eprintln!("{error}");
}

/// Report the error and exit with its stage-specific code.
pub fn report_and_exit(error: &CompileError) -> ! {
    report(error);
    std::process::exit(error.exit_code())
}
