//! Deterministic generated-name helpers.
//!
//! The runtime header provides the built-in counterparts of these names
//! (`obj_Int`, `the_class_Obj_struct`, …), so the scheme must line up
//! exactly with `builtins.h`.

/// Object pointer typedef: `obj_<Class>`.
#[must_use]
pub fn object_type(class: &str) -> String {
    format!("obj_{class}")
}

/// Per-instance record: `obj_<Class>_struct`.
#[must_use]
pub fn object_struct(class: &str) -> String {
    format!("obj_{class}_struct")
}

/// Dispatch-record pointer typedef: `class_<Class>`.
#[must_use]
pub fn class_type(class: &str) -> String {
    format!("class_{class}")
}

/// Dispatch-record struct: `class_<Class>_struct`.
#[must_use]
pub fn class_struct(class: &str) -> String {
    format!("class_{class}_struct")
}

/// The constant dispatch-record instance: `the_class_<Class>`.
#[must_use]
pub fn dispatch_record(class: &str) -> String {
    format!("the_class_{class}")
}

/// Backing struct of the dispatch-record instance:
/// `the_class_<Class>_struct`.
#[must_use]
pub fn dispatch_record_struct(class: &str) -> String {
    format!("the_class_{class}_struct")
}

/// Constructor function: `new_<Class>`.
#[must_use]
pub fn constructor_fn(class: &str) -> String {
    format!("new_{class}")
}

/// Method function: `<Class>_method_<name>`.
#[must_use]
pub fn method_fn(class: &str, method: &str) -> String {
    format!("{class}_method_{method}")
}

/// Temporary variable: `__temp_var_<n>`, zero-padded.
#[must_use]
pub fn temp_var(counter: u64) -> String {
    format!("__temp_var_{counter:04}")
}

/// Label: `<header><n>`, zero-padded.
#[must_use]
pub fn label(header: &str, counter: u64) -> String {
    format!("{header}{counter:04}")
}
