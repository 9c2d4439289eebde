//! Indentation-aware text writer for the emitted C file.

use quill_common::NewLineKind;

/// Emitter configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmitOptions {
    pub newline: NewLineKind,
}

/// Append-only output buffer. Each top-level emission is written in
/// full before the next begins.
#[derive(Debug)]
pub struct CodeWriter {
    out: String,
    options: EmitOptions,
}

impl CodeWriter {
    #[must_use]
    pub fn new(options: EmitOptions) -> Self {
        Self {
            out: String::new(),
            options,
        }
    }

    /// Write text to output.
    pub fn write(&mut self, text: &str) {
        self.out.push_str(text);
    }

    /// Write a newline.
    pub fn write_line(&mut self) {
        self.out.push_str(self.options.newline.as_str());
    }

    /// Write `level` tabs.
    pub fn write_indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push('\t');
        }
    }

    /// Write an indented line followed by a newline.
    pub fn line(&mut self, level: usize, text: &str) {
        self.write_indent(level);
        self.write(text);
        self.write_line();
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }
}
