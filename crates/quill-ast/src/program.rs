//! Parsed-program surface delivered by the parser collaborator.
//!
//! The parser contract: each class declaration supplies its name, super
//! name (or none for an implicit `Obj`), constructor parameter list,
//! constructor body and method list. Each method supplies its name,
//! parameter list, declared return type name (absent means `Nothing`)
//! and body.

use crate::tree::Block;

/// A parameter to a constructor or method, as parsed.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_name: String,
}

impl Param {
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A method declaration, as parsed.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Param>,
    /// `None` is equivalent to a declared return of `Nothing`.
    pub return_type: Option<String>,
    pub body: Block,
}

impl MethodDecl {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        params: Vec<Param>,
        return_type: Option<String>,
        body: Block,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
            body,
        }
    }
}

/// A class declaration, as parsed.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    /// `None` defaults to extending `Obj`.
    pub super_name: Option<String>,
    /// Constructor parameters.
    pub params: Vec<Param>,
    /// Constructor body.
    pub constructor: Block,
    pub methods: Vec<MethodDecl>,
}

impl ClassDecl {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        super_name: Option<String>,
        params: Vec<Param>,
        constructor: Block,
        methods: Vec<MethodDecl>,
    ) -> Self {
        Self {
            name: name.into(),
            super_name,
            params,
            constructor,
            methods,
        }
    }
}

/// A whole parsed program: declared classes plus the top-level block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub classes: Vec<ClassDecl>,
    pub main: Block,
}

impl Program {
    #[must_use]
    pub fn new(classes: Vec<ClassDecl>, main: Block) -> Self {
        Self { classes, main }
    }
}
