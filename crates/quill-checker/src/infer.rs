//! Fixed-point type inference.
//!
//! For each method a fresh symbol table is seeded from the method's
//! init list (fields with their already-known types, parameters with
//! their declared types) and the body is walked repeatedly until an
//! iteration leaves the table's dirty flag clear. Node types only move
//! upward in the subtype lattice; symbol cells grow by least common
//! ancestor, except that field cells outside the constructor are fixed
//! and writes to them incur a subtype obligation instead.
//!
//! Constructors are inferred before the methods of their class so the
//! discovered field types can seed the method symbol tables.

use quill_ast::{
    Block, Expr, ExprKind, LogicalOp, Member, SELF_NAME, Stmt, TypeAlternative, UnaryOp,
};
use quill_binder::{Method, Registry, SymbolTable};
use quill_common::{ClassId, CompileError, CompileResult, ErrorKind};
use std::mem;
use tracing::{debug, trace};

/// Infer every user class (constructor first, then methods) and the
/// entry block, then check field types against super classes.
pub fn infer_types(registry: &mut Registry, main: &mut Method) -> CompileResult<()> {
    for cid in registry.user_class_ids() {
        infer_constructor(registry, cid)?;
        update_field_types(registry, cid);
        let method_names: Vec<String> = registry.get(cid).methods.keys().cloned().collect();
        for name in method_names {
            infer_class_method(registry, cid, &name)?;
        }
    }
    infer_entry(registry, main)?;
    check_field_subtypes(registry)
}

fn infer_constructor(registry: &mut Registry, cid: ClassId) -> CompileResult<()> {
    debug!(class = %registry.get(cid).name, "inferring constructor");
    let mut table = seed_symbols(registry, Some(cid), &registry.get(cid).constructor)?;
    let mut body = mem::take(&mut registry.get_mut(cid).constructor.body);
    let result = run_fixed_point(registry, &mut table, &mut body, Some(cid), None, true);
    let constructor = &mut registry.get_mut(cid).constructor;
    constructor.body = body;
    constructor.symbol_table = table;
    result
}

fn infer_class_method(registry: &mut Registry, cid: ClassId, name: &str) -> CompileResult<()> {
    debug!(class = %registry.get(cid).name, method = name, "inferring method");
    let (mut table, return_type) = {
        let class = registry.get(cid);
        let method = &class.methods[name];
        (
            seed_symbols(registry, Some(cid), method)?,
            method.return_class(),
        )
    };
    let mut body = match registry.get_mut(cid).methods.get_mut(name) {
        Some(method) => mem::take(&mut method.body),
        None => return Ok(()),
    };
    let result = run_fixed_point(
        registry,
        &mut table,
        &mut body,
        Some(cid),
        Some(return_type),
        false,
    );
    if let Some(method) = registry.get_mut(cid).methods.get_mut(name) {
        method.body = body;
        method.symbol_table = table;
    }
    result
}

fn infer_entry(registry: &Registry, main: &mut Method) -> CompileResult<()> {
    debug!("inferring entry block");
    let mut table = seed_symbols(registry, None, main)?;
    let mut body = mem::take(&mut main.body);
    let result = run_fixed_point(
        registry,
        &mut table,
        &mut body,
        None,
        Some(ClassId::NOTHING),
        false,
    );
    main.body = body;
    main.symbol_table = table;
    result
}

/// Build the symbol table for a method from its init list and
/// parameters.
fn seed_symbols(
    registry: &Registry,
    cid: Option<ClassId>,
    method: &Method,
) -> CompileResult<SymbolTable> {
    let mut table = SymbolTable::new();
    for (name, is_field) in method.init_list.iter() {
        let ty = if *is_field {
            let class = match cid {
                Some(cid) => registry.get(cid),
                None => {
                    return Err(CompileError::inference(
                        ErrorKind::FieldError,
                        format!("Field \"{name}\" referenced outside of a class"),
                    ));
                }
            };
            match class.fields.get(name) {
                Some(field) => field.ty,
                None => {
                    return Err(CompileError::inference(
                        ErrorKind::FieldError,
                        format!(
                            "Class \"{}\" has no field \"{name}\" established by its constructor",
                            class.name
                        ),
                    ));
                }
            }
        } else {
            None
        };
        table.insert(name, *is_field, ty);
    }
    for param in &method.params {
        table.insert(&param.name, false, Some(param.class()));
    }
    Ok(table)
}

/// After the constructor's fixed point, its symbol table holds the final
/// type of each discovered field.
fn update_field_types(registry: &mut Registry, cid: ClassId) {
    let class = registry.get_mut(cid);
    let names: Vec<String> = class.fields.keys().cloned().collect();
    for name in names {
        let ty = class.constructor.symbol_table.type_of(&name, true);
        if let Some(field) = class.fields.get_mut(&name) {
            field.ty = ty;
        }
    }
}

/// For every field shared with the super class, the subclass's inferred
/// type must be a subtype of the super class's.
fn check_field_subtypes(registry: &Registry) -> CompileResult<()> {
    for cid in registry.user_class_ids() {
        let class = registry.get(cid);
        let Some(super_id) = class.super_id else {
            continue;
        };
        let super_class = registry.get(super_id);
        for (name, field) in &class.fields {
            let Some(super_field) = super_class.fields.get(name) else {
                continue;
            };
            if let (Some(sub_ty), Some(super_ty)) = (field.ty, super_field.ty) {
                if !registry.is_subtype(sub_ty, super_ty) {
                    return Err(CompileError::inference(
                        ErrorKind::SubtypeFieldType,
                        format!(
                            "Class {} field \"{name}\" type not subtype of super class.",
                            class.name
                        ),
                    ));
                }
            }
        }
    }
    Ok(())
}

fn run_fixed_point(
    registry: &Registry,
    table: &mut SymbolTable,
    body: &mut Block,
    this_class: Option<ClassId>,
    return_type: Option<ClassId>,
    is_constructor: bool,
) -> CompileResult<()> {
    // A stuck fixed point is a compiler bug surfaced as an error; each
    // symbol can climb at most the hierarchy depth.
    let limit = (table.len() + 1) * (registry.max_depth() + 1);
    let mut ctx = InferCtx {
        registry,
        symbols: table,
        this_class,
        return_type,
        is_constructor,
    };
    let mut iterations = 0usize;
    loop {
        ctx.symbols.clear_dirty();
        ctx.infer_block(body)?;
        if !ctx.symbols.is_dirty() {
            trace!(iterations, "fixed point reached");
            return Ok(());
        }
        iterations += 1;
        if iterations > limit {
            return Err(CompileError::inference(
                ErrorKind::AmbiguousInference,
                "type inference failed to reach a fixed point",
            ));
        }
    }
}

/// Read-only class context plus the mutable symbol table, threaded down
/// the walk instead of storing back-pointers on the AST.
struct InferCtx<'a> {
    registry: &'a Registry,
    symbols: &'a mut SymbolTable,
    this_class: Option<ClassId>,
    /// `None` inside a constructor.
    return_type: Option<ClassId>,
    is_constructor: bool,
}

impl<'a> InferCtx<'a> {
    fn class_name(&self, id: ClassId) -> &'a str {
        &self.registry.get(id).name
    }

    /// Least upper bound of an optional slot and a type.
    fn lub(&self, slot: Option<ClassId>, ty: ClassId) -> ClassId {
        match slot {
            Some(existing) => self.registry.lca(existing, ty),
            None => ty,
        }
    }

    /// The node's inferred type, required to be known at this point.
    fn expr_class(&self, expr: &Expr, what: &str) -> CompileResult<ClassId> {
        expr.ty.ok_or_else(|| {
            CompileError::inference(
                ErrorKind::AmbiguousInference,
                format!("unable to infer a type for {what}"),
            )
        })
    }

    fn infer_block(&mut self, block: &mut Block) -> CompileResult<()> {
        for stmt in &mut block.stmts {
            self.infer_stmt(stmt)?;
        }
        Ok(())
    }

    fn infer_stmt(&mut self, stmt: &mut Stmt) -> CompileResult<()> {
        match stmt {
            Stmt::Expr(expr) => self.infer_expr(expr),
            Stmt::Assign { lhs, rhs } => {
                self.infer_expr(rhs)?;
                let inferred = self.expr_class(rhs, "assignment right-hand side")?;
                self.update_inferred(lhs, inferred, false)?;
                self.infer_expr(lhs)
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                self.infer_expr(cond)?;
                if cond.ty != Some(ClassId::BOOLEAN) {
                    return Err(CompileError::inference(
                        ErrorKind::IfCondType,
                        "If conditional not of type Boolean",
                    ));
                }
                self.infer_block(then_block)?;
                self.infer_block(else_block)
            }
            Stmt::While { cond, body } => {
                self.infer_expr(cond)?;
                if cond.ty != Some(ClassId::BOOLEAN) {
                    return Err(CompileError::inference(
                        ErrorKind::WhileCondType,
                        "While conditional not of type Boolean",
                    ));
                }
                self.infer_block(body)
            }
            Stmt::Return(value) => self.infer_return(value.as_mut()),
            Stmt::Typecase {
                scrutinee,
                alternatives,
            } => self.infer_typecase(scrutinee, alternatives),
        }
    }

    fn infer_return(&mut self, value: Option<&mut Expr>) -> CompileResult<()> {
        if self.is_constructor {
            let this_class = match self.this_class {
                Some(id) => id,
                None => {
                    return Err(CompileError::inference(
                        ErrorKind::ThisError,
                        "constructor context without an owning class",
                    ));
                }
            };
            return match value {
                Some(expr) => {
                    self.infer_expr(expr)?;
                    if expr.ty != Some(this_class) {
                        return Err(CompileError::inference(
                            ErrorKind::ReturnType,
                            "Constructor return must match the constructed class",
                        ));
                    }
                    Ok(())
                }
                None => Err(CompileError::inference(
                    ErrorKind::ReturnType,
                    "Constructor return must match the constructed class",
                )),
            };
        }

        let declared = self.return_type.unwrap_or(ClassId::NOTHING);
        match value {
            None => {
                if declared != ClassId::NOTHING {
                    return Err(CompileError::inference(
                        ErrorKind::ReturnNothing,
                        "Return without a value in a method that returns a value",
                    ));
                }
                Ok(())
            }
            Some(expr) => {
                self.infer_expr(expr)?;
                let ty = self.expr_class(expr, "return value")?;
                if !self.registry.is_subtype(ty, declared) {
                    return Err(CompileError::inference(
                        ErrorKind::ReturnType,
                        format!("Invalid return type \"{}\"", self.class_name(ty)),
                    ));
                }
                Ok(())
            }
        }
    }

    fn infer_typecase(
        &mut self,
        scrutinee: &mut Expr,
        alternatives: &mut [TypeAlternative],
    ) -> CompileResult<()> {
        self.infer_expr(scrutinee)?;

        // Each binding is narrowed only for the span of its alternative;
        // the rebinding is scoped so it neither dirties the table nor
        // leaks out of the typecase.
        let mut snapshots: Vec<(String, Option<ClassId>)> = Vec::new();
        let mut bound: Vec<(String, ClassId)> = Vec::new();

        for alt in alternatives {
            let alt_class = match self.registry.lookup(&alt.class_name) {
                Some(id) => id,
                None => {
                    return Err(CompileError::inference(
                        ErrorKind::UnknownType,
                        format!("Unknown class \"{}\"", alt.class_name),
                    ));
                }
            };

            let snapshot = match snapshots.iter().find(|(name, _)| *name == alt.binding) {
                Some((_, ty)) => *ty,
                None => {
                    let ty = match self.symbols.get(&alt.binding, false) {
                        Some(symbol) => symbol.ty,
                        None => {
                            return Err(CompileError::inference(
                                ErrorKind::TypecaseError,
                                format!("Typecase binding \"{}\" is not a known symbol", alt.binding),
                            ));
                        }
                    };
                    snapshots.push((alt.binding.clone(), ty));
                    ty
                }
            };
            if let Some(outer) = snapshot {
                if !self.registry.is_subtype(alt_class, outer) {
                    return Err(CompileError::inference(
                        ErrorKind::TypecaseError,
                        format!("Cannot reconcile type for variable {}", alt.binding),
                    ));
                }
            }

            self.symbols.rebind(&alt.binding, false, Some(alt_class));
            bound.push((alt.binding.clone(), alt_class));
            self.infer_block(&mut alt.block)?;
            if self.symbols.type_of(&alt.binding, false) != Some(alt_class) {
                return Err(CompileError::inference(
                    ErrorKind::TypecaseMismatch,
                    format!("Typecase var \"{}\" inferred type mismatch.", alt.binding),
                ));
            }
        }

        // Restore every binding; one that only exists for the typecase
        // keeps the join of its alternative classes so it can still be
        // declared in the emitted code.
        for (name, snapshot) in snapshots {
            let restored = match snapshot {
                Some(ty) => Some(ty),
                None => bound
                    .iter()
                    .filter(|(n, _)| *n == name)
                    .map(|(_, ty)| *ty)
                    .reduce(|a, b| self.registry.lca(a, b)),
            };
            self.symbols.rebind(&name, false, restored);
        }
        Ok(())
    }

    fn infer_expr(&mut self, expr: &mut Expr) -> CompileResult<()> {
        let Expr { kind, ty } = expr;
        match kind {
            ExprKind::Int(_) => {
                *ty = Some(ClassId::INT);
                Ok(())
            }
            ExprKind::Bool(_) => {
                *ty = Some(ClassId::BOOLEAN);
                Ok(())
            }
            ExprKind::Str(_) => {
                *ty = Some(ClassId::STRING);
                Ok(())
            }
            ExprKind::Nothing => {
                *ty = Some(ClassId::NOTHING);
                Ok(())
            }
            ExprKind::Ident(name) => self.infer_ident(name, ty),
            ExprKind::Access { object, member } => self.infer_access(object, member, ty),
            ExprKind::Call(call) => {
                // A call without a receiver is a constructor invocation.
                let registry = self.registry;
                let class_id = match registry.lookup(&call.name) {
                    Some(id) => id,
                    None => {
                        return Err(CompileError::inference(
                            ErrorKind::UnknownConstructor,
                            format!("Unknown class for constructor \"{}\"", call.name),
                        ));
                    }
                };
                let constructor = &registry.get(class_id).constructor;
                let what = call.name.clone();
                self.check_call_args(constructor, &mut call.args, ErrorKind::FunctionCall, &what)?;
                *ty = Some(self.lub(*ty, class_id));
                Ok(())
            }
            ExprKind::Binary { op, left, right } => {
                self.infer_expr(left)?;
                let left_ty = self.expr_class(left, "binary operand")?;
                let registry = self.registry;
                let (_, method) = match registry.find_method(left_ty, op.method_name()) {
                    Some(found) => found,
                    None => {
                        return Err(CompileError::inference(
                            ErrorKind::BinOp,
                            format!(
                                "Operator \"{}\" does not exist for class {}",
                                op.symbol(),
                                registry.get(left_ty).name
                            ),
                        ));
                    }
                };
                if method.params.len() != 1 {
                    return Err(CompileError::inference(
                        ErrorKind::BinOp,
                        format!(
                            "Binary operator \"{}\" for class \"{}\" should take exactly one argument",
                            op.symbol(),
                            registry.get(left_ty).name
                        ),
                    ));
                }
                self.infer_expr(right)?;
                let right_ty = self.expr_class(right, "binary operand")?;
                let param = &method.params[0];
                if !registry.is_subtype(right_ty, param.class()) {
                    return Err(CompileError::inference(
                        ErrorKind::BinOp,
                        format!(
                            "Invalid right type \"{}\" for operator \"{}\"",
                            registry.get(right_ty).name,
                            op.symbol()
                        ),
                    ));
                }
                *ty = Some(self.lub(*ty, method.return_class()));
                Ok(())
            }
            ExprKind::Logical { op, left, right } => {
                self.infer_expr(left)?;
                if left.ty != Some(ClassId::BOOLEAN) {
                    return Err(CompileError::inference(
                        ErrorKind::BoolOp,
                        format!("Invalid left operand type for \"{}\"", op.symbol()),
                    ));
                }
                match op {
                    LogicalOp::And | LogicalOp::Or => {
                        let right = match right {
                            Some(right) => right,
                            None => {
                                return Err(CompileError::inference(
                                    ErrorKind::BoolOp,
                                    format!("Right operand missing for \"{}\"", op.symbol()),
                                ));
                            }
                        };
                        self.infer_expr(right)?;
                        if right.ty != Some(ClassId::BOOLEAN) {
                            return Err(CompileError::inference(
                                ErrorKind::BoolOp,
                                format!("Invalid right operand type for \"{}\"", op.symbol()),
                            ));
                        }
                    }
                    LogicalOp::Not => {}
                }
                let merged = self.lub(*ty, ClassId::BOOLEAN);
                if merged != ClassId::BOOLEAN {
                    return Err(CompileError::inference(
                        ErrorKind::BoolOp,
                        format!("Invalid result type for boolean operator \"{}\"", op.symbol()),
                    ));
                }
                *ty = Some(merged);
                Ok(())
            }
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Neg => {
                    self.infer_expr(operand)?;
                    let operand_ty = match operand.ty {
                        Some(t) => t,
                        None => {
                            return Err(CompileError::inference(
                                ErrorKind::UniOp,
                                "Unary operator applied to an expression of no type",
                            ));
                        }
                    };
                    if operand_ty != ClassId::INT {
                        return Err(CompileError::inference(
                            ErrorKind::UniOp,
                            format!(
                                "Operator \"{}\" does not match type {}",
                                op.symbol(),
                                self.class_name(operand_ty)
                            ),
                        ));
                    }
                    *ty = Some(ClassId::INT);
                    Ok(())
                }
            },
            ExprKind::Typed {
                expr: inner,
                type_name,
            } => {
                if ty.is_none() {
                    if let Some(type_name) = type_name {
                        *ty = Some(self.resolve_annotation(type_name)?);
                    }
                }
                self.infer_expr(inner)?;
                let inner_ty = self.expr_class(inner, "annotated expression")?;
                match *ty {
                    Some(annotated) => {
                        if !self.registry.is_subtype(inner_ty, annotated) {
                            return Err(CompileError::inference(
                                ErrorKind::TypingError,
                                format!(
                                    "Unable to cast type {} to {}",
                                    self.class_name(inner_ty),
                                    self.class_name(annotated)
                                ),
                            ));
                        }
                    }
                    None => *ty = Some(inner_ty),
                }
                Ok(())
            }
        }
    }

    fn infer_ident(&mut self, name: &str, ty: &mut Option<ClassId>) -> CompileResult<()> {
        if name == SELF_NAME {
            return match self.this_class {
                Some(this_class) => {
                    *ty = Some(self.lub(*ty, this_class));
                    Ok(())
                }
                None => Err(CompileError::inference(
                    ErrorKind::ThisError,
                    "\"this\" used outside of a class",
                )),
            };
        }

        let sym_ty = match self.symbols.get(name, false) {
            Some(symbol) => symbol.ty,
            None => {
                return Err(CompileError::inference(
                    ErrorKind::TypingError,
                    format!("Unknown symbol \"{name}\""),
                ));
            }
        };
        if let Some(sym_ty) = sym_ty {
            *ty = Some(self.lub(*ty, sym_ty));
        }
        Ok(())
    }

    fn infer_access(
        &mut self,
        object: &mut Expr,
        member: &mut Member,
        ty: &mut Option<ClassId>,
    ) -> CompileResult<()> {
        // The receiver is either `this`, a plain symbol, or an arbitrary
        // expression.
        let object_class = if object.is_ident(SELF_NAME) {
            match self.this_class {
                Some(this_class) => this_class,
                None => {
                    return Err(CompileError::inference(
                        ErrorKind::ThisError,
                        "\"this\" used outside of a class",
                    ));
                }
            }
        } else if let ExprKind::Ident(name) = &object.kind {
            let sym_ty = match self.symbols.get(name, false) {
                Some(symbol) => symbol.ty,
                None => {
                    return Err(CompileError::inference(
                        ErrorKind::TypingError,
                        format!("Unknown symbol \"{name}\""),
                    ));
                }
            };
            match sym_ty {
                Some(t) => t,
                None => {
                    return Err(CompileError::inference(
                        ErrorKind::AmbiguousInference,
                        format!("unable to resolve receiver \"{name}\""),
                    ));
                }
            }
        } else {
            self.infer_expr(object)?;
            self.expr_class(object, "receiver")?
        };
        object.ty = Some(object_class);

        match member {
            Member::Field(field) => {
                if !self.registry.has_field(object_class, field) {
                    return Err(CompileError::inference(
                        ErrorKind::FieldError,
                        format!(
                            "Unknown field \"{field}\" for type \"{}\"",
                            self.class_name(object_class)
                        ),
                    ));
                }
                let sym_ty = match self.symbols.get(field, true) {
                    Some(symbol) => symbol.ty,
                    None => {
                        return Err(CompileError::inference(
                            ErrorKind::FieldError,
                            format!("Field \"{field}\" is not accessible here"),
                        ));
                    }
                };
                if let Some(sym_ty) = sym_ty {
                    *ty = Some(self.lub(*ty, sym_ty));
                }
                Ok(())
            }
            Member::Call(call) => {
                let registry = self.registry;
                let (_, method) = match registry.find_method(object_class, &call.name) {
                    Some(found) => found,
                    None => {
                        return Err(CompileError::inference(
                            ErrorKind::MethodError,
                            format!(
                                "Unknown method \"{}\" in cls \"{}\"",
                                call.name,
                                registry.get(object_class).name
                            ),
                        ));
                    }
                };
                let what = call.name.clone();
                self.check_call_args(method, &mut call.args, ErrorKind::FunctionCall, &what)?;
                *ty = Some(self.lub(*ty, method.return_class()));
                Ok(())
            }
        }
    }

    /// Arity and per-argument subtype obligations shared by constructor
    /// and method calls.
    fn check_call_args(
        &mut self,
        method: &Method,
        args: &mut [Expr],
        kind: ErrorKind,
        what: &str,
    ) -> CompileResult<()> {
        if method.params.len() != args.len() {
            return Err(CompileError::inference(
                kind,
                format!("Wrong arg count for method {what}"),
            ));
        }
        for (arg, param) in args.iter_mut().zip(&method.params) {
            self.infer_expr(arg)?;
            let arg_ty = self.expr_class(arg, "argument")?;
            if !self.registry.is_subtype(arg_ty, param.class()) {
                return Err(CompileError::inference(
                    kind,
                    format!("Param {} type error", param.name),
                ));
            }
        }
        Ok(())
    }

    fn resolve_annotation(&self, type_name: &str) -> CompileResult<ClassId> {
        self.registry.lookup(type_name).ok_or_else(|| {
            CompileError::inference(
                ErrorKind::UnknownType,
                format!("Unknown type name \"{type_name}\""),
            )
        })
    }

    /// Propagate an inferred type into an assignment target, updating
    /// the symbol table.
    fn update_inferred(
        &mut self,
        expr: &mut Expr,
        inferred: ClassId,
        is_field: bool,
    ) -> CompileResult<()> {
        let Expr { kind, ty } = expr;
        match kind {
            ExprKind::Typed {
                expr: inner,
                type_name,
            } => match type_name {
                Some(type_name) => {
                    let declared = match *ty {
                        Some(declared) => declared,
                        None => self.resolve_annotation(type_name)?,
                    };
                    *ty = Some(declared);
                    if !self.registry.is_subtype(inferred, declared) {
                        return Err(CompileError::inference(
                            ErrorKind::TypingError,
                            format!(
                                "Unable to cast type {} to {}",
                                self.class_name(inferred),
                                self.class_name(declared)
                            ),
                        ));
                    }
                    self.update_inferred(inner, declared, is_field)?;
                    let inner_ty = self.expr_class(inner, "assignment target")?;
                    if !self.registry.is_subtype(inner_ty, declared) {
                        return Err(CompileError::inference(
                            ErrorKind::TypingError,
                            format!(
                                "Unable to cast type {} to {}",
                                self.class_name(inner_ty),
                                self.class_name(declared)
                            ),
                        ));
                    }
                    Ok(())
                }
                None => {
                    let merged = self.lub(*ty, inferred);
                    self.update_inferred(inner, merged, is_field)?;
                    let inner_ty = self.expr_class(inner, "assignment target")?;
                    *ty = Some(self.registry.lca(merged, inner_ty));
                    Ok(())
                }
            },
            ExprKind::Ident(name) => {
                if name == SELF_NAME {
                    return Err(CompileError::inference(
                        ErrorKind::ThisError,
                        "Cannot assign to \"this\"",
                    ));
                }
                let sym_ty = match self.symbols.get(name, is_field) {
                    Some(symbol) => symbol.ty,
                    None => {
                        return Err(CompileError::inference(
                            ErrorKind::TypingError,
                            format!("Unknown symbol \"{name}\""),
                        ));
                    }
                };
                let new_ty = match sym_ty {
                    Some(existing) => self.registry.lca(inferred, existing),
                    None => inferred,
                };
                self.symbols.update(name, is_field, new_ty);
                *ty = Some(self.lub(*ty, new_ty));
                Ok(())
            }
            ExprKind::Access { object, member } => {
                if object.is_ident(SELF_NAME) {
                    if let Member::Field(field) = member {
                        let sym_ty = match self.symbols.get(field, true) {
                            Some(symbol) => symbol.ty,
                            None => {
                                return Err(CompileError::inference(
                                    ErrorKind::FieldError,
                                    format!("Field \"{field}\" is not accessible here"),
                                ));
                            }
                        };
                        if self.is_constructor {
                            // Field cells grow only inside the
                            // constructor.
                            let new_ty = match sym_ty {
                                Some(existing) => self.registry.lca(inferred, existing),
                                None => inferred,
                            };
                            self.symbols.update(field, true, new_ty);
                            *ty = Some(new_ty);
                        } else {
                            match sym_ty {
                                Some(established) => {
                                    if !self.registry.is_subtype(inferred, established) {
                                        return Err(CompileError::inference(
                                            ErrorKind::TypingError,
                                            format!("Type error for field {field}"),
                                        ));
                                    }
                                    *ty = Some(established);
                                }
                                None => {
                                    self.symbols.update(field, true, inferred);
                                    *ty = Some(inferred);
                                }
                            }
                        }
                        return Ok(());
                    }
                }
                // Any other target shape carries the inferred type on
                // the node only.
                *ty = Some(inferred);
                Ok(())
            }
            _ => Err(CompileError::inference(
                ErrorKind::TypingError,
                "invalid assignment target",
            )),
        }
    }
}
