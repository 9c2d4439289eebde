//! Class registry, hierarchy validation and symbol tables.
//!
//! This crate provides:
//! - [`Registry`] - the single owner of all class records, pre-populated
//!   with the built-in classes `Obj`, `Int`, `String`, `Boolean` and
//!   `Nothing`
//! - [`hierarchy`] - super resolution, cycle detection and
//!   override-compatibility checking
//! - [`SymbolTable`] - per-method `(name, is-field)` symbol storage with
//!   the dirty flag driving the inference fixed point
//! - [`InitSet`] - the lattice element of the definite-assignment
//!   analysis

pub mod hierarchy;
pub mod inits;
pub mod registry;
pub mod symbols;

pub use inits::InitSet;
pub use registry::{ClassData, Field, Method, Param, Registry};
pub use symbols::{Symbol, SymbolTable};
