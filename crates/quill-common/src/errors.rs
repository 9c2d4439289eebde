//! Error taxonomy for the compiler.
//!
//! Every failure is categorized by a kind and attributed to one of the
//! pipeline stages. The user-visible form is a single line on standard
//! error, `<ErrorKind> | <message>`, and the process exit code is
//! stage-specific, so embedders can tell a hierarchy failure from an
//! inference failure without parsing messages.

use serde::Serialize;
use std::fmt;

/// Compiler pipeline stage an error is attributed to.
///
/// Exit codes are disjoint powers of two, one per stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Stage {
    Scanner,
    Parser,
    ClassHierarchy,
    InitializeBeforeUse,
    TypeInference,
}

impl Stage {
    /// Process exit code reserved for this stage.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Scanner => 4,
            Self::Parser => 8,
            Self::ClassHierarchy => 16,
            Self::InitializeBeforeUse => 32,
            Self::TypeInference => 64,
        }
    }
}

/// Exhaustive list of failure kinds, one kind per failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    // Propagated from the external scanner/parser collaborator.
    Scanner,
    Parser,
    // Class hierarchy stage.
    CyclicInheritance,
    UnknownSuper,
    UnknownType,
    InheritedMethodReturnType,
    InheritedMethodParamCount,
    InheritedMethodParamType,
    NameCollision,
    MissingReturn,
    NothingParam,
    DuplicateClass,
    DuplicateParam,
    // Initialize-before-use stage.
    UninitializedVar,
    DuplicateMember,
    FieldClassMatch,
    Constructor,
    MissingSuperFields,
    // Type inference stage.
    TypingError,
    UnknownConstructor,
    UnknownBinOp,
    MethodError,
    FunctionCall,
    IfCondType,
    WhileCondType,
    BinOp,
    BoolOp,
    UniOp,
    ReturnType,
    ReturnNothing,
    TypecaseError,
    TypecaseMismatch,
    SubtypeFieldType,
    ThisError,
    FieldError,
    AmbiguousInference,
}

impl ErrorKind {
    /// The kind's name as shown on standard error.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scanner => "Scanner",
            Self::Parser => "Parser",
            Self::CyclicInheritance => "CyclicInheritance",
            Self::UnknownSuper => "UnknownSuper",
            Self::UnknownType => "UnknownType",
            Self::InheritedMethodReturnType => "InheritedMethodReturnType",
            Self::InheritedMethodParamCount => "InheritedMethodParamCount",
            Self::InheritedMethodParamType => "InheritedMethodParamType",
            Self::NameCollision => "NameCollision",
            Self::MissingReturn => "MissingReturn",
            Self::NothingParam => "NothingParam",
            Self::DuplicateClass => "DuplicateClass",
            Self::DuplicateParam => "DuplicateParam",
            Self::UninitializedVar => "UninitializedVar",
            Self::DuplicateMember => "DuplicateMember",
            Self::FieldClassMatch => "FieldClassMatch",
            Self::Constructor => "Constructor",
            Self::MissingSuperFields => "MissingSuperFields",
            Self::TypingError => "TypingError",
            Self::UnknownConstructor => "UnknownConstructor",
            Self::UnknownBinOp => "UnknownBinOp",
            Self::MethodError => "MethodError",
            Self::FunctionCall => "FunctionCall",
            Self::IfCondType => "IfCondType",
            Self::WhileCondType => "WhileCondType",
            Self::BinOp => "BinOp",
            Self::BoolOp => "BoolOp",
            Self::UniOp => "UniOp",
            Self::ReturnType => "ReturnType",
            Self::ReturnNothing => "ReturnNothing",
            Self::TypecaseError => "TypecaseError",
            Self::TypecaseMismatch => "TypecaseMismatch",
            Self::SubtypeFieldType => "SubtypeFieldType",
            Self::ThisError => "ThisError",
            Self::FieldError => "FieldError",
            Self::AmbiguousInference => "AmbiguousInference",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A categorized, single-line compiler error.
#[derive(Clone, Debug, Serialize)]
pub struct CompileError {
    pub stage: Stage,
    pub kind: ErrorKind,
    pub message: String,
}

impl CompileError {
    #[must_use]
    pub fn new(stage: Stage, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for a class-hierarchy stage error.
    #[must_use]
    pub fn hierarchy(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(Stage::ClassHierarchy, kind, message)
    }

    /// Shorthand for an initialize-before-use stage error.
    #[must_use]
    pub fn init(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(Stage::InitializeBeforeUse, kind, message)
    }

    /// Shorthand for a type-inference stage error.
    #[must_use]
    pub fn inference(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(Stage::TypeInference, kind, message)
    }

    /// Exit code reserved for the stage this error belongs to.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.stage.exit_code()
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.kind, self.message)
    }
}

impl std::error::Error for CompileError {}

pub type CompileResult<T> = Result<T, CompileError>;
