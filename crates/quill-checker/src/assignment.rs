//! Definite-assignment analysis.
//!
//! A flow-sensitive walk threading two sets through each method body:
//! `inits`, the variables certainly initialized at the program point,
//! and `all_inits`, everything that may be initialized somewhere.
//! Branches are analyzed on independent copies and joined by
//! intersection; loop bodies and typecase alternatives contribute to the
//! may-set only.
//!
//! Constructors run first: every field certainly initialized by the
//! constructor becomes a field of the class, and a field initialized on
//! some but not all paths is rejected. Methods are then analyzed with
//! the full field set and their parameters pre-seeded.

use quill_ast::{Block, Expr, ExprKind, Member, SELF_NAME, Stmt};
use quill_binder::{InitSet, Method, Registry};
use quill_common::{ClassId, CompileError, CompileResult, ErrorKind};
use tracing::debug;

/// Run the pass over every constructor, method and the entry block.
pub fn check_initialization(registry: &mut Registry, main: &mut Method) -> CompileResult<()> {
    // Constructors first: field discovery feeds the method analysis and
    // the super-field check.
    for cid in registry.ids() {
        check_constructor(registry, cid)?;
    }
    verify_super_fields(registry)?;
    for cid in registry.ids() {
        check_methods(registry, cid)?;
    }
    check_entry(main)
}

/// Walk context; the analysis itself never consults the registry.
#[derive(Clone, Copy)]
struct Pass {
    in_constructor: bool,
    /// Inside any constructor or method (as opposed to the top-level
    /// block), where `this.f` is meaningful.
    in_class: bool,
}

fn check_constructor(registry: &mut Registry, cid: ClassId) -> CompileResult<()> {
    let (all, field_names) = {
        let class = registry.get(cid);
        let mut inits = InitSet::new();
        for param in &class.constructor.params {
            inits.add(&param.name, false);
        }
        let mut all = inits.clone();
        let pass = Pass {
            in_constructor: true,
            in_class: true,
        };
        pass.check_block(&class.constructor.body, &mut inits, &mut all)?;

        // A field seen on some path but absent from the must-set was not
        // initialized on every completing path.
        for (name, is_field) in all.iter() {
            if *is_field && !inits.contains(name, true) {
                return Err(CompileError::init(
                    ErrorKind::Constructor,
                    format!(
                        "Constructor for class {} does not initialize \"{name}\" on all paths",
                        class.name
                    ),
                ));
            }
        }

        let field_names: Vec<String> = inits
            .iter()
            .filter(|(_, is_field)| *is_field)
            .map(|(name, _)| name.clone())
            .collect();
        (all, field_names)
    };

    let class = registry.get_mut(cid);
    class.constructor.init_list = all;
    for name in field_names {
        debug!(class = %class.name, field = %name, "discovered field");
        class.fields.entry(name).or_default();
    }
    Ok(())
}

/// Every user class must initialize at least the fields of its super
/// class; checking each class against its direct parent covers the
/// whole chain.
fn verify_super_fields(registry: &Registry) -> CompileResult<()> {
    for cid in registry.user_class_ids() {
        let class = registry.get(cid);
        let Some(super_id) = class.super_id else {
            continue;
        };
        let super_class = registry.get(super_id);
        for name in super_class.fields.keys() {
            if !class.fields.contains_key(name) {
                return Err(CompileError::init(
                    ErrorKind::MissingSuperFields,
                    format!("Class \"{}\" missing fields from its super class.", class.name),
                ));
            }
        }
    }
    Ok(())
}

fn check_methods(registry: &mut Registry, cid: ClassId) -> CompileResult<()> {
    // Member-name hygiene is checked once per class, against the
    // discovered field set.
    let field_names: Vec<String> = registry.get(cid).fields.keys().cloned().collect();
    for name in &field_names {
        if registry.has_method(cid, name) {
            return Err(CompileError::init(
                ErrorKind::DuplicateMember,
                format!(
                    "Class \"{}\" has duplicate field and method {name}",
                    registry.get(cid).name
                ),
            ));
        }
        if *name == registry.get(cid).name {
            return Err(CompileError::init(
                ErrorKind::FieldClassMatch,
                format!("Class \"{name}\" has a field of the same name"),
            ));
        }
    }

    let mut fields_list = InitSet::new();
    for name in &field_names {
        fields_list.add(name, true);
    }

    let method_names: Vec<String> = registry.get(cid).methods.keys().cloned().collect();
    for method_name in method_names {
        let all = {
            let class = registry.get(cid);
            let method = &class.methods[method_name.as_str()];
            let mut inits = fields_list.clone();
            for param in &method.params {
                inits.add(&param.name, false);
            }
            let mut all = inits.clone();
            let pass = Pass {
                in_constructor: false,
                in_class: true,
            };
            pass.check_block(&method.body, &mut inits, &mut all)?;
            all.union_with(&inits);
            all
        };
        if let Some(method) = registry.get_mut(cid).methods.get_mut(&method_name) {
            method.init_list = all;
        }
    }
    Ok(())
}

fn check_entry(main: &mut Method) -> CompileResult<()> {
    let mut inits = InitSet::new();
    let mut all = InitSet::new();
    let pass = Pass {
        in_constructor: false,
        in_class: false,
    };
    pass.check_block(&main.body, &mut inits, &mut all)?;
    all.union_with(&inits);
    main.init_list = all;
    Ok(())
}

impl Pass {
    fn check_block(
        self,
        block: &Block,
        inits: &mut InitSet,
        all: &mut InitSet,
    ) -> CompileResult<()> {
        for stmt in &block.stmts {
            self.check_stmt(stmt, inits, all)?;
        }
        Ok(())
    }

    fn check_stmt(self, stmt: &Stmt, inits: &mut InitSet, all: &mut InitSet) -> CompileResult<()> {
        match stmt {
            Stmt::Expr(expr) => self.check_expr(expr, inits),
            Stmt::Assign { lhs, rhs } => {
                // The right side is evaluated first; only then does the
                // bound name become initialized. The left side is then
                // rechecked because it may itself read sub-expressions.
                self.check_expr(rhs, inits)?;
                self.record_assignment(lhs, inits);
                all.union_with(inits);
                self.check_expr(lhs, inits)
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                self.check_expr(cond, inits)?;
                let mut else_inits = inits.clone();
                self.check_block(then_block, inits, all)?;
                self.check_block(else_block, &mut else_inits, all)?;
                all.union_with(inits);
                all.union_with(&else_inits);
                inits.intersect_with(&else_inits);
                Ok(())
            }
            Stmt::While { cond, body } => {
                self.check_expr(cond, inits)?;
                // The loop may not execute: the body's assignments reach
                // the may-set only.
                let mut body_inits = inits.clone();
                self.check_block(body, &mut body_inits, all)?;
                all.union_with(&body_inits);
                Ok(())
            }
            Stmt::Return(value) => match value {
                Some(expr) => self.check_expr(expr, inits),
                None => Ok(()),
            },
            Stmt::Typecase {
                scrutinee,
                alternatives,
            } => {
                self.check_expr(scrutinee, inits)?;
                all.union_with(inits);
                for alt in alternatives {
                    let mut alt_inits = inits.clone();
                    alt_inits.add(&alt.binding, false);
                    self.check_block(&alt.block, &mut alt_inits, all)?;
                    all.union_with(&alt_inits);
                }
                // No alternative is guaranteed to match: no must-adds.
                Ok(())
            }
        }
    }

    fn check_expr(self, expr: &Expr, inits: &InitSet) -> CompileResult<()> {
        match &expr.kind {
            ExprKind::Int(_) | ExprKind::Bool(_) | ExprKind::Str(_) | ExprKind::Nothing => Ok(()),
            ExprKind::Ident(name) => {
                if name == SELF_NAME || inits.contains(name, false) {
                    Ok(())
                } else {
                    Err(uninitialized(name, false))
                }
            }
            ExprKind::Access { object, member } => match member {
                Member::Field(field) => {
                    if object.is_ident(SELF_NAME) {
                        if self.in_constructor && !inits.contains(field, true) {
                            return Err(uninitialized(field, true));
                        }
                        // Outside the constructor fields are established
                        // by the constructor and always readable.
                        return Ok(());
                    }
                    self.check_expr(object, inits)
                }
                Member::Call(call) => {
                    self.check_expr(object, inits)?;
                    for arg in &call.args {
                        self.check_expr(arg, inits)?;
                    }
                    Ok(())
                }
            },
            ExprKind::Call(call) => {
                // The trailing name is a constructor, not a read.
                for arg in &call.args {
                    self.check_expr(arg, inits)?;
                }
                Ok(())
            }
            ExprKind::Binary { left, right, .. } => {
                self.check_expr(left, inits)?;
                self.check_expr(right, inits)
            }
            ExprKind::Logical { left, right, .. } => {
                self.check_expr(left, inits)?;
                match right {
                    Some(right) => self.check_expr(right, inits),
                    None => Ok(()),
                }
            }
            ExprKind::Unary { operand, .. } => self.check_expr(operand, inits),
            ExprKind::Typed { expr, .. } => self.check_expr(expr, inits),
        }
    }

    /// Add the name bound by an assignment target to the must-set.
    fn record_assignment(self, lhs: &Expr, inits: &mut InitSet) {
        match &lhs.kind {
            ExprKind::Typed { expr, .. } => self.record_assignment(expr, inits),
            ExprKind::Ident(name) => inits.add(name, false),
            ExprKind::Access { object, member } => {
                if self.in_class && object.is_ident(SELF_NAME) {
                    if let Member::Field(field) = member {
                        inits.add(field, true);
                    }
                }
            }
            _ => {}
        }
    }
}

fn uninitialized(name: &str, is_field: bool) -> CompileError {
    let prefix = if is_field { "Field variable" } else { "Variable" };
    CompileError::init(
        ErrorKind::UninitializedVar,
        format!("{prefix} \"{name}\" is used before initialization."),
    )
}
