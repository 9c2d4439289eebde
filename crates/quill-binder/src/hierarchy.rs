//! Hierarchy validation.
//!
//! Runs in four steps, any of which rejects the program:
//!
//! 1. resolve super links, parameter types and declared return types
//! 2. detect inheritance cycles
//! 3. check override compatibility (covariant returns, equal parameter
//!    counts, contravariant parameter types)
//! 4. reject method names that collide with class names

use crate::registry::{Param, Registry};
use quill_ast as ast;
use quill_common::{ClassId, CompileError, CompileResult, ErrorKind};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::debug;

/// Validate the whole hierarchy.
pub fn check(registry: &mut Registry) -> CompileResult<()> {
    debug!("hierarchy: resolving super links and declared types");
    resolve_types(registry)?;
    detect_cycles(registry)?;
    check_overrides(registry)?;
    check_name_collisions(registry)?;
    Ok(())
}

fn resolve_types(registry: &mut Registry) -> CompileResult<()> {
    for cid in registry.ids() {
        resolve_super(registry, cid)?;
        resolve_constructor_params(registry, cid)?;
        resolve_method_signatures(registry, cid)?;
    }
    Ok(())
}

fn resolve_super(registry: &mut Registry, cid: ClassId) -> CompileResult<()> {
    let super_id = {
        let class = registry.get(cid);
        match &class.super_name {
            None => None,
            Some(super_name) => match registry.lookup(super_name) {
                Some(id) => Some(id),
                None => {
                    return Err(CompileError::hierarchy(
                        ErrorKind::UnknownSuper,
                        format!(
                            "For class \"{}\", unknown super class: {super_name}",
                            class.name
                        ),
                    ));
                }
            },
        }
    };
    registry.get_mut(cid).super_id = super_id;
    Ok(())
}

fn resolve_constructor_params(registry: &mut Registry, cid: ClassId) -> CompileResult<()> {
    let tys = resolve_params(registry, &registry.get(cid).constructor.params)?;
    apply_param_types(&mut registry.get_mut(cid).constructor.params, &tys);
    Ok(())
}

fn resolve_method_signatures(registry: &mut Registry, cid: ClassId) -> CompileResult<()> {
    let method_names: Vec<String> = registry.get(cid).methods.keys().cloned().collect();
    for name in method_names {
        let (param_tys, return_ty) = {
            let class = registry.get(cid);
            let method = &class.methods[&name];
            let param_tys = resolve_params(registry, &method.params)?;
            let return_ty = match registry.lookup(&method.return_type_name) {
                Some(id) => id,
                None => {
                    return Err(CompileError::hierarchy(
                        ErrorKind::UnknownType,
                        format!(
                            "Class: {}, method {name}, unknown return type \"{}\"",
                            class.name, method.return_type_name
                        ),
                    ));
                }
            };
            (param_tys, return_ty)
        };
        let class = registry.get_mut(cid);
        if let Some(method) = class.methods.get_mut(&name) {
            apply_param_types(&mut method.params, &param_tys);
            method.return_type = Some(return_ty);
        }
    }
    Ok(())
}

/// Resolve a parameter list, forbidding `Nothing` and duplicate names.
fn resolve_params(registry: &Registry, params: &[Param]) -> CompileResult<Vec<ClassId>> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut out = Vec::with_capacity(params.len());
    for param in params {
        if !seen.insert(param.name.as_str()) {
            return Err(CompileError::hierarchy(
                ErrorKind::DuplicateParam,
                format!("Duplicate parameter \"{}\"", param.name),
            ));
        }
        if param.type_name == ast::NOTHING_CLASS {
            return Err(CompileError::hierarchy(
                ErrorKind::NothingParam,
                format!(
                    "Parameter {} cannot have type \"{}\"",
                    param.name,
                    ast::NOTHING_CLASS
                ),
            ));
        }
        match registry.lookup(&param.type_name) {
            Some(id) => out.push(id),
            None => {
                return Err(CompileError::hierarchy(
                    ErrorKind::UnknownType,
                    format!("Unknown class \"{}\"", param.type_name),
                ));
            }
        }
    }
    Ok(out)
}

fn apply_param_types(params: &mut [Param], tys: &[ClassId]) {
    for (param, ty) in params.iter_mut().zip(tys) {
        param.ty = Some(*ty);
    }
}

fn detect_cycles(registry: &Registry) -> CompileResult<()> {
    for cid in registry.ids() {
        let mut seen: SmallVec<[ClassId; 8]> = SmallVec::new();
        let mut cur = registry.get(cid).super_id;
        while let Some(id) = cur {
            if id == cid || seen.contains(&id) {
                return Err(CompileError::hierarchy(
                    ErrorKind::CyclicInheritance,
                    format!("Class {} has a cyclic inheritance", registry.get(cid).name),
                ));
            }
            seen.push(id);
            cur = registry.get(id).super_id;
        }
    }
    Ok(())
}

/// For every method that shadows one on an ancestor: the return type is
/// covariant, the parameter count matches, and each parameter type is
/// contravariant.
fn check_overrides(registry: &Registry) -> CompileResult<()> {
    for cid in registry.ids() {
        let class = registry.get(cid);
        let Some(super_id) = class.super_id else {
            continue;
        };
        for (name, method) in &class.methods {
            let Some((_, super_method)) = registry.find_method(super_id, name) else {
                continue;
            };
            if method.params.len() != super_method.params.len() {
                return Err(CompileError::hierarchy(
                    ErrorKind::InheritedMethodParamCount,
                    format!(
                        "Class \"{}\" has method \"{name}\" whose parameter count does not match its super class.",
                        class.name
                    ),
                ));
            }
            if !registry.is_subtype(method.return_class(), super_method.return_class()) {
                return Err(CompileError::hierarchy(
                    ErrorKind::InheritedMethodReturnType,
                    format!(
                        "Class \"{}\" has method \"{name}\" whose return type is not a subtype of its super class.",
                        class.name
                    ),
                ));
            }
            for (param, super_param) in method.params.iter().zip(&super_method.params) {
                if !registry.is_subtype(super_param.class(), param.class()) {
                    return Err(CompileError::hierarchy(
                        ErrorKind::InheritedMethodParamType,
                        format!(
                            "Class \"{}\" has method \"{name}\" whose parameter \"{}\" does not match its super class parameter type.",
                            class.name, param.name
                        ),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn check_name_collisions(registry: &Registry) -> CompileResult<()> {
    for cid in registry.ids() {
        for name in registry.get(cid).methods.keys() {
            if registry.lookup(name).is_some() {
                return Err(CompileError::hierarchy(
                    ErrorKind::NameCollision,
                    format!("\"{name}\" is both a class and method name."),
                ));
            }
        }
    }
    Ok(())
}
