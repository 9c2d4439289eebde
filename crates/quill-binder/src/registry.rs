//! The class registry and its records.
//!
//! The registry exclusively owns every class record; a class record owns
//! its constructor, methods, fields and their body ASTs. All other
//! references between classes are `ClassId` handles whose referent lives
//! as long as the registry.

use crate::inits::InitSet;
use crate::symbols::SymbolTable;
use indexmap::IndexMap;
use quill_ast::{self as ast, Block};
use quill_common::{ClassId, CompileError, CompileResult, ErrorKind};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Parameter name used by the built-in binary-operator methods.
const OTHER_PARAM: &str = "other";

/// Ancestor chains are short in practice; keep them inline.
pub type AncestorChain = SmallVec<[ClassId; 8]>;

/// A constructor or method parameter with its resolved type.
#[derive(Clone, Debug)]
pub struct Param {
    pub name: String,
    pub type_name: String,
    /// Resolved by the hierarchy check.
    pub ty: Option<ClassId>,
}

impl Param {
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            ty: None,
        }
    }

    /// The resolved parameter type.
    #[must_use]
    pub fn class(&self) -> ClassId {
        debug_assert!(self.ty.is_some(), "parameter resolved by hierarchy check");
        self.ty.unwrap_or(ClassId::OBJ)
    }
}

/// A field record; the type is discovered from the constructor's symbol
/// table after inference.
#[derive(Clone, Debug, Default)]
pub struct Field {
    pub ty: Option<ClassId>,
}

/// A method record. The constructor of a class is a method named like
/// the class itself whose declared return is the class.
#[derive(Debug, Default)]
pub struct Method {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type_name: String,
    /// Resolved by the hierarchy check.
    pub return_type: Option<ClassId>,
    pub body: Block,
    /// Populated by type inference.
    pub symbol_table: SymbolTable,
    /// Populated by the definite-assignment pass: every `(name,
    /// is-field)` pair that may be initialized somewhere in the body,
    /// plus parameters.
    pub init_list: InitSet,
}

impl Method {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        params: Vec<Param>,
        return_type_name: Option<String>,
        body: Block,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            return_type_name: return_type_name.unwrap_or_else(|| ast::NOTHING_CLASS.to_string()),
            return_type: None,
            body,
            symbol_table: SymbolTable::new(),
            init_list: InitSet::new(),
        }
    }

    /// The synthetic method holding a program's top-level statements.
    #[must_use]
    pub fn entry(body: Block) -> Self {
        let mut method = Self::new("_main", Vec::new(), None, body);
        method.return_type = Some(ClassId::NOTHING);
        method
    }

    /// The resolved declared return type.
    #[must_use]
    pub fn return_class(&self) -> ClassId {
        debug_assert!(
            self.return_type.is_some(),
            "return type resolved by hierarchy check"
        );
        self.return_type.unwrap_or(ClassId::NOTHING)
    }

    #[must_use]
    pub fn has_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }
}

/// One class record.
#[derive(Debug)]
pub struct ClassData {
    pub name: String,
    /// Declared super name; `None` only for `Obj`.
    pub super_name: Option<String>,
    /// Resolved by the hierarchy check; `None` only for `Obj`.
    pub super_id: Option<ClassId>,
    pub constructor: Method,
    pub methods: BTreeMap<String, Method>,
    /// Discovered from constructor assignments by the
    /// definite-assignment pass; typed after inference.
    pub fields: BTreeMap<String, Field>,
    pub is_user_defined: bool,
}

/// Mapping class-name → class record, initialized once per compilation
/// with the built-ins.
#[derive(Debug)]
pub struct Registry {
    classes: Vec<ClassData>,
    by_name: IndexMap<String, ClassId>,
}

impl Registry {
    /// A registry holding only the built-in classes, in the fixed
    /// [`ClassId`] slot order.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            classes: Vec::new(),
            by_name: IndexMap::new(),
        };

        let mut obj = builtin_class(ast::OBJ_CLASS, None);
        add_builtin_binop(&mut obj, "EQUALS", ast::BOOLEAN_CLASS, ast::OBJ_CLASS);
        add_builtin_nullary(&mut obj, "PRINT", ast::OBJ_CLASS);
        add_builtin_nullary(&mut obj, "STR", ast::STRING_CLASS);
        registry.add_class(obj);

        let mut int = builtin_class(ast::INT_CLASS, Some(ast::OBJ_CLASS));
        add_builtin_nullary(&mut int, "STR", ast::STRING_CLASS);
        for op in ["PLUS", "MINUS", "TIMES", "DIVIDE"] {
            add_builtin_binop(&mut int, op, ast::INT_CLASS, ast::INT_CLASS);
        }
        add_builtin_binop(&mut int, "EQUALS", ast::BOOLEAN_CLASS, ast::OBJ_CLASS);
        for op in ["LESS", "ATMOST", "MORE", "ATLEAST"] {
            add_builtin_binop(&mut int, op, ast::BOOLEAN_CLASS, ast::INT_CLASS);
        }
        registry.add_class(int);

        let mut string = builtin_class(ast::STRING_CLASS, Some(ast::OBJ_CLASS));
        add_builtin_nullary(&mut string, "STR", ast::STRING_CLASS);
        add_builtin_binop(&mut string, "PLUS", ast::STRING_CLASS, ast::STRING_CLASS);
        add_builtin_binop(&mut string, "EQUALS", ast::BOOLEAN_CLASS, ast::OBJ_CLASS);
        for op in ["LESS", "ATMOST", "MORE", "ATLEAST"] {
            add_builtin_binop(&mut string, op, ast::BOOLEAN_CLASS, ast::STRING_CLASS);
        }
        registry.add_class(string);

        let mut boolean = builtin_class(ast::BOOLEAN_CLASS, Some(ast::OBJ_CLASS));
        add_builtin_nullary(&mut boolean, "STR", ast::STRING_CLASS);
        add_builtin_binop(&mut boolean, "EQUALS", ast::BOOLEAN_CLASS, ast::OBJ_CLASS);
        registry.add_class(boolean);

        registry.add_class(builtin_class(ast::NOTHING_CLASS, Some(ast::OBJ_CLASS)));

        debug_assert_eq!(registry.lookup(ast::OBJ_CLASS), Some(ClassId::OBJ));
        debug_assert_eq!(registry.lookup(ast::NOTHING_CLASS), Some(ClassId::NOTHING));
        registry
    }

    /// Register a user class declaration. Fails with `DuplicateClass`
    /// when the name reuses a built-in or an earlier user name.
    pub fn declare(&mut self, decl: ast::ClassDecl) -> CompileResult<ClassId> {
        if self.by_name.contains_key(&decl.name) {
            return Err(CompileError::hierarchy(
                ErrorKind::DuplicateClass,
                format!("Duplicate class named \"{}\"", decl.name),
            ));
        }

        let mut methods = BTreeMap::new();
        for method in decl.methods {
            if methods.contains_key(&method.name) {
                return Err(CompileError::hierarchy(
                    ErrorKind::NameCollision,
                    format!(
                        "Class \"{}\" declares method \"{}\" twice",
                        decl.name, method.name
                    ),
                ));
            }
            methods.insert(
                method.name.clone(),
                Method::new(
                    method.name,
                    convert_params(method.params),
                    method.return_type,
                    method.body,
                ),
            );
        }

        let constructor = Method::new(
            decl.name.clone(),
            convert_params(decl.params),
            Some(decl.name.clone()),
            decl.constructor,
        );

        Ok(self.add_class(ClassData {
            name: decl.name,
            super_name: Some(decl.super_name.unwrap_or_else(|| ast::OBJ_CLASS.to_string())),
            super_id: None,
            constructor,
            methods,
            fields: BTreeMap::new(),
            is_user_defined: true,
        }))
    }

    fn add_class(&mut self, mut data: ClassData) -> ClassId {
        let id = ClassId(self.classes.len() as u32);
        data.constructor.return_type = Some(id);
        self.by_name.insert(data.name.clone(), id);
        self.classes.push(data);
        id
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn get(&self, id: ClassId) -> &ClassData {
        &self.classes[id.index()]
    }

    #[must_use]
    pub fn get_mut(&mut self, id: ClassId) -> &mut ClassData {
        &mut self.classes[id.index()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// All class ids in registration order (built-ins first).
    #[must_use]
    pub fn ids(&self) -> Vec<ClassId> {
        (0..self.classes.len() as u32).map(ClassId).collect()
    }

    /// User-declared class ids in declaration order.
    #[must_use]
    pub fn user_class_ids(&self) -> Vec<ClassId> {
        self.ids()
            .into_iter()
            .filter(|id| self.get(*id).is_user_defined)
            .collect()
    }

    /// Resolve a method by name in `class`, walking the super chain.
    /// Returns the defining class along with the record; `None` when the
    /// method does not exist anywhere on the chain.
    #[must_use]
    pub fn find_method(&self, class: ClassId, name: &str) -> Option<(ClassId, &Method)> {
        let mut cur = Some(class);
        let mut steps = 0;
        while let Some(id) = cur {
            let data = self.get(id);
            if let Some(method) = data.methods.get(name) {
                return Some((id, method));
            }
            cur = data.super_id;
            steps += 1;
            if steps > self.classes.len() {
                break;
            }
        }
        None
    }

    #[must_use]
    pub fn has_method(&self, class: ClassId, name: &str) -> bool {
        self.find_method(class, name).is_some()
    }

    /// Whether `class` or any ancestor declares a field `name`.
    #[must_use]
    pub fn has_field(&self, class: ClassId, name: &str) -> bool {
        self.ancestors(class)
            .iter()
            .any(|id| self.get(*id).fields.contains_key(name))
    }

    /// The chain `class, super(class), …, Obj`. Bounded by the registry
    /// size so it terminates even on an unvalidated cyclic hierarchy.
    #[must_use]
    pub fn ancestors(&self, class: ClassId) -> AncestorChain {
        let mut chain = AncestorChain::new();
        let mut cur = Some(class);
        while let Some(id) = cur {
            if chain.len() > self.classes.len() {
                break;
            }
            chain.push(id);
            cur = self.get(id).super_id;
        }
        chain
    }

    /// Reflexive-transitive subtype relation: `a ≤ b` iff walking `a`'s
    /// super chain reaches `b`.
    #[must_use]
    pub fn is_subtype(&self, a: ClassId, b: ClassId) -> bool {
        self.ancestors(a).contains(&b)
    }

    /// Least common ancestor: the deepest class that is an ancestor of
    /// both. `Obj` is the universal upper bound.
    #[must_use]
    pub fn lca(&self, a: ClassId, b: ClassId) -> ClassId {
        if a == b {
            return a;
        }
        let chain_a = self.ancestors(a);
        let chain_b = self.ancestors(b);
        // Scan from the root downward to the last shared element.
        let mut shared = ClassId::OBJ;
        for (x, y) in chain_a.iter().rev().zip(chain_b.iter().rev()) {
            if x != y {
                break;
            }
            shared = *x;
        }
        shared
    }

    /// Longest ancestor chain in the hierarchy; bounds the inference
    /// fixed point.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.ids()
            .into_iter()
            .map(|id| self.ancestors(id).len())
            .max()
            .unwrap_or(1)
    }
}

fn convert_params(params: Vec<ast::Param>) -> Vec<Param> {
    params
        .into_iter()
        .map(|p| Param::new(p.name, p.type_name))
        .collect()
}

fn builtin_class(name: &str, super_name: Option<&str>) -> ClassData {
    ClassData {
        name: name.to_string(),
        super_name: super_name.map(str::to_string),
        super_id: None,
        constructor: Method::new(name, Vec::new(), Some(name.to_string()), Block::empty()),
        methods: BTreeMap::new(),
        fields: BTreeMap::new(),
        is_user_defined: false,
    }
}

fn add_builtin_binop(class: &mut ClassData, name: &str, return_type: &str, param_type: &str) {
    class.methods.insert(
        name.to_string(),
        Method::new(
            name,
            vec![Param::new(OTHER_PARAM, param_type)],
            Some(return_type.to_string()),
            Block::empty(),
        ),
    );
}

fn add_builtin_nullary(class: &mut ClassData, name: &str, return_type: &str) {
    class.methods.insert(
        name.to_string(),
        Method::new(
            name,
            Vec::new(),
            Some(return_type.to_string()),
            Block::empty(),
        ),
    );
}
