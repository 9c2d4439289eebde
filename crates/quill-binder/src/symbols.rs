//! Per-method symbol table.
//!
//! Symbols are keyed by `(name, is-field)` so a local and a field may
//! share a spelling. The dirty flag is raised whenever a type is added
//! or changed and cleared at the start of each inference iteration; the
//! fixed point has converged once an iteration leaves the flag clear.

use quill_common::ClassId;
use rustc_hash::FxHashMap;

/// One symbol and its currently inferred type.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: String,
    pub is_field: bool,
    pub ty: Option<ClassId>,
}

/// Mapping `(symbol-name, is-field)` → symbol record, with a dirty flag.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: FxHashMap<(String, bool), Symbol>,
    dirty: bool,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol, replacing any previous entry. Raises the dirty
    /// flag.
    pub fn insert(&mut self, name: &str, is_field: bool, ty: Option<ClassId>) {
        self.symbols.insert(
            (name.to_string(), is_field),
            Symbol {
                name: name.to_string(),
                is_field,
                ty,
            },
        );
        self.dirty = true;
    }

    /// Update a symbol's type; raises the dirty flag only when the type
    /// actually changes.
    pub fn update(&mut self, name: &str, is_field: bool, ty: ClassId) {
        let key = (name.to_string(), is_field);
        debug_assert!(self.symbols.contains_key(&key), "update of unknown symbol");
        match self.symbols.get_mut(&key) {
            Some(symbol) => {
                if symbol.ty != Some(ty) {
                    symbol.ty = Some(ty);
                    self.dirty = true;
                }
            }
            None => self.insert(name, is_field, Some(ty)),
        }
    }

    /// Set a symbol's type without touching the dirty flag.
    ///
    /// Used for scoped rebinding (typecase alternatives): the narrowing
    /// is undone before the iteration's net change is assessed, so it
    /// must not count as fixed-point progress.
    pub fn rebind(&mut self, name: &str, is_field: bool, ty: Option<ClassId>) {
        let key = (name.to_string(), is_field);
        match self.symbols.get_mut(&key) {
            Some(symbol) => symbol.ty = ty,
            None => {
                self.symbols.insert(
                    key,
                    Symbol {
                        name: name.to_string(),
                        is_field,
                        ty,
                    },
                );
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: &str, is_field: bool) -> Option<&Symbol> {
        self.symbols.get(&(name.to_string(), is_field))
    }

    /// The symbol's inferred type, if the symbol exists and has one.
    #[must_use]
    pub fn type_of(&self, name: &str, is_field: bool) -> Option<ClassId> {
        self.get(name, is_field).and_then(|s| s.ty)
    }

    #[must_use]
    pub fn contains(&self, name: &str, is_field: bool) -> bool {
        self.get(name, is_field).is_some()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// Symbols in a deterministic order for emission.
    #[must_use]
    pub fn sorted(&self) -> Vec<&Symbol> {
        let mut out: Vec<&Symbol> = self.symbols.values().collect();
        out.sort_by(|a, b| (&a.name, a.is_field).cmp(&(&b.name, b.is_field)));
        out
    }
}
