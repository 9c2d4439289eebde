//! Initialized-variable set.
//!
//! The lattice element of the definite-assignment analysis: a set of
//! `(name, is-field)` pairs with union and intersection. Branches are
//! analyzed on independent copies and joined with
//! [`InitSet::intersect_with`]; may-init accumulation uses
//! [`InitSet::union_with`].

use rustc_hash::FxHashSet;

/// A set of `(name, is-field)` pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InitSet {
    vars: FxHashSet<(String, bool)>,
}

impl InitSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, is_field: bool) {
        self.vars.insert((name.to_string(), is_field));
    }

    #[must_use]
    pub fn contains(&self, name: &str, is_field: bool) -> bool {
        self.vars.contains(&(name.to_string(), is_field))
    }

    /// Grow this set to include everything in `other`.
    pub fn union_with(&mut self, other: &InitSet) {
        for var in &other.vars {
            self.vars.insert(var.clone());
        }
    }

    /// Shrink this set to the pairs also present in `other`.
    pub fn intersect_with(&mut self, other: &InitSet) {
        self.vars.retain(|var| other.vars.contains(var));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, bool)> {
        self.vars.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
