//! The lowering itself.
//!
//! Every intermediate value lands in a fresh numbered temporary;
//! structured statements lower to labels and unconditional jumps.
//! Label and temporary counters are fields of the emitter, so they
//! reset with each compilation and stay monotone within one.

use crate::names;
use crate::writer::{CodeWriter, EmitOptions};
use quill_ast::{Block, CallExpr, Expr, ExprKind, LogicalOp, Member, SELF_NAME, Stmt, UnaryOp};
use quill_binder::{Method, Registry};
use quill_common::ClassId;
use std::slice;
use tracing::debug;

/// Emit a whole checked program as C source.
#[must_use]
pub fn emit_program<'a>(registry: &'a Registry, main: &'a Method, options: EmitOptions) -> String {
    let mut emitter = Emitter::new(registry, options);
    emitter.emit_includes();
    for cid in emitter.topo_user_classes() {
        emitter.emit_class(cid);
    }
    emitter.emit_entry(main);
    emitter.finish()
}

struct Emitter<'a> {
    registry: &'a Registry,
    writer: CodeWriter,
    label_count: u64,
    temp_count: u64,
    /// Declared return type of the function currently being emitted.
    return_type: Option<ClassId>,
    /// Symbol table of the function currently being emitted.
    symbols: Option<&'a quill_binder::SymbolTable>,
}

impl<'a> Emitter<'a> {
    fn new(registry: &'a Registry, options: EmitOptions) -> Self {
        Self {
            registry,
            writer: CodeWriter::new(options),
            label_count: 0,
            temp_count: 0,
            return_type: None,
            symbols: None,
        }
    }

    fn finish(self) -> String {
        self.writer.finish()
    }

    // =========================================================================
    // Small helpers
    // =========================================================================

    fn line(&mut self, indent: usize, text: &str) {
        self.writer.line(indent, text);
    }

    fn blank(&mut self) {
        self.writer.write_line();
    }

    fn comment(&mut self, indent: usize, text: &str) {
        self.writer.line(indent, &format!("/* {text} */"));
    }

    fn emit_label(&mut self, indent: usize, label: &str) {
        self.writer
            .line(indent, &format!("{label}: ; /* Null statement */"));
    }

    fn emit_goto(&mut self, indent: usize, label: &str) {
        self.writer.line(indent, &format!("goto {label};"));
    }

    fn next_temp(&mut self) -> String {
        let name = names::temp_var(self.temp_count);
        self.temp_count += 1;
        name
    }

    fn next_label(&mut self, header: &str) -> String {
        let label = names::label(header, self.label_count);
        self.label_count += 1;
        label
    }

    fn class_name(&self, id: ClassId) -> &'a str {
        &self.registry.get(id).name
    }

    fn object_type(&self, id: ClassId) -> String {
        names::object_type(self.class_name(id))
    }

    /// The node's inferred class; inference guarantees it is set.
    fn node_class(&self, expr: &Expr) -> ClassId {
        debug_assert!(expr.ty.is_some(), "expression typed during inference");
        expr.ty.unwrap_or(ClassId::OBJ)
    }

    /// Store `value` into a fresh temporary of the given class; in
    /// target position the temporary holds the address instead.
    fn store_temp(&mut self, value: &str, ty: ClassId, indent: usize, is_lhs: bool) -> String {
        let name = self.next_temp();
        let obj_ty = self.object_type(ty);
        if is_lhs {
            self.line(indent, &format!("{obj_ty} * {name} = &({value});"));
            format!("(*{name})")
        } else {
            self.line(indent, &format!("{obj_ty} {name} = {value};"));
            name
        }
    }

    // =========================================================================
    // Class layout
    // =========================================================================

    /// User classes, supers before subclasses.
    fn topo_user_classes(&self) -> Vec<ClassId> {
        let mut ordered: Vec<ClassId> = Vec::new();
        for cid in self.registry.user_class_ids() {
            let mut stack: Vec<ClassId> = Vec::new();
            let mut cur = Some(cid);
            while let Some(id) = cur {
                let class = self.registry.get(id);
                if !class.is_user_defined || ordered.contains(&id) {
                    break;
                }
                stack.push(id);
                cur = class.super_id;
            }
            while let Some(id) = stack.pop() {
                if !ordered.contains(&id) {
                    ordered.push(id);
                }
            }
        }
        ordered
    }

    /// Method slots in dispatch order: the super's order with overrides
    /// replacing in place, then new methods appended sorted by name.
    /// Each entry names the class whose implementation fills the slot.
    fn layout_methods(&self, cid: ClassId) -> Vec<(ClassId, String)> {
        let mut list = match self.registry.get(cid).super_id {
            Some(super_id) => self.layout_methods(super_id),
            None => Vec::new(),
        };
        for name in self.registry.get(cid).methods.keys() {
            match list.iter_mut().find(|(_, slot)| slot == name) {
                Some(slot) => *slot = (cid, name.clone()),
                None => list.push((cid, name.clone())),
            }
        }
        list
    }

    /// Field slots in the same inherited-then-appended order.
    fn layout_fields(&self, cid: ClassId) -> Vec<(ClassId, String)> {
        let mut list = match self.registry.get(cid).super_id {
            Some(super_id) => self.layout_fields(super_id),
            None => Vec::new(),
        };
        for name in self.registry.get(cid).fields.keys() {
            match list.iter_mut().find(|(_, slot)| slot == name) {
                Some(slot) => *slot = (cid, name.clone()),
                None => list.push((cid, name.clone())),
            }
        }
        list
    }

    fn field_class(&self, owner: ClassId, name: &str) -> ClassId {
        self.registry
            .get(owner)
            .fields
            .get(name)
            .and_then(|f| f.ty)
            .unwrap_or(ClassId::OBJ)
    }

    // =========================================================================
    // Top-level structure
    // =========================================================================

    fn emit_includes(&mut self) {
        self.line(0, "#include <stdlib.h>");
        self.line(0, "#include <stdio.h>");
        self.line(0, "#include <stdbool.h>");
        self.line(0, "#include \"builtins.h\"");
        self.blank();
    }

    fn emit_class(&mut self, cid: ClassId) {
        let registry = self.registry;
        let name = registry.get(cid).name.clone();
        debug!(class = %name, "emitting class");

        self.line(
            0,
            &format!("/*======================= {name} =======================*/"),
        );
        self.line(
            0,
            "/* Typedefs Required for Separation of class and object structs */",
        );
        self.line(0, &format!("struct {};", names::class_struct(&name)));
        self.line(
            0,
            &format!(
                "typedef struct {}* {};",
                names::class_struct(&name),
                names::class_type(&name)
            ),
        );
        self.blank();

        self.emit_object_struct(cid, &name);
        self.blank();
        self.emit_class_struct(cid, &name);
        self.blank();
        self.emit_prototypes(cid);
        self.blank();
        self.emit_dispatch_record(cid, &name);
        self.blank();

        self.emit_constructor(cid);
        let method_names: Vec<String> = registry.get(cid).methods.keys().cloned().collect();
        for method_name in method_names {
            self.emit_method(cid, &method_name);
        }
        self.blank();
    }

    /// The per-instance record: the `clazz` pointer followed by the
    /// transitively inherited fields.
    fn emit_object_struct(&mut self, cid: ClassId, name: &str) {
        self.line(0, &format!("typedef struct {} {{", names::object_struct(name)));
        self.line(1, &format!("{} clazz;", names::class_type(name)));
        for (owner, field) in self.layout_fields(cid) {
            let field_ty = self.field_class(owner, &field);
            let obj_ty = self.object_type(field_ty);
            self.line(1, &format!("{obj_ty} {field};"));
        }
        self.line(0, &format!("}} * {};", names::object_type(name)));
    }

    /// The dispatch record's type: `super_` pointer, constructor
    /// pointer, then method pointers in layout order.
    fn emit_class_struct(&mut self, cid: ClassId, name: &str) {
        let registry = self.registry;
        self.line(0, &format!("struct {} {{", names::class_struct(name)));
        self.line(
            1,
            &format!("{} super_;", names::class_type(self.class_name(ClassId::OBJ))),
        );

        let ctor_params: Vec<String> = registry
            .get(cid)
            .constructor
            .params
            .iter()
            .map(|p| self.object_type(p.class()))
            .collect();
        self.line(
            1,
            &format!(
                "{} (*constructor)({});",
                names::object_type(name),
                ctor_params.join(", ")
            ),
        );

        for (owner, method_name) in self.layout_methods(cid) {
            let method = &registry.get(owner).methods[method_name.as_str()];
            let mut params = vec![self.object_type(owner)];
            params.extend(method.params.iter().map(|p| self.object_type(p.class())));
            let return_ty = self.object_type(method.return_class());
            self.line(
                1,
                &format!("{return_ty} (*{method_name})({});", params.join(", ")),
            );
        }
        self.line(0, "};");
    }

    fn constructor_signature(&self, cid: ClassId) -> String {
        let class = self.registry.get(cid);
        let params: Vec<String> = class
            .constructor
            .params
            .iter()
            .map(|p| format!("{} {}", self.object_type(p.class()), p.name))
            .collect();
        format!(
            "{} {}({})",
            names::object_type(&class.name),
            names::constructor_fn(&class.name),
            params.join(", ")
        )
    }

    fn method_signature(&self, cid: ClassId, method_name: &str) -> String {
        let class = self.registry.get(cid);
        let method = &class.methods[method_name];
        let mut params = vec![format!("{} {SELF_NAME}", names::object_type(&class.name))];
        params.extend(
            method
                .params
                .iter()
                .map(|p| format!("{} {}", self.object_type(p.class()), p.name)),
        );
        format!(
            "{} {}({})",
            self.object_type(method.return_class()),
            names::method_fn(&class.name, method_name),
            params.join(", ")
        )
    }

    fn emit_prototypes(&mut self, cid: ClassId) {
        let ctor = self.constructor_signature(cid);
        self.line(0, &format!("{ctor};"));
        let method_names: Vec<String> = self.registry.get(cid).methods.keys().cloned().collect();
        for method_name in method_names {
            let signature = self.method_signature(cid, &method_name);
            self.line(0, &format!("{signature};"));
        }
    }

    /// The constant dispatch-record instance: super pointer, constructor
    /// and, for each slot, the nearest implementation.
    fn emit_dispatch_record(&mut self, cid: ClassId, name: &str) {
        let registry = self.registry;
        let super_name = match registry.get(cid).super_id {
            Some(super_id) => registry.get(super_id).name.clone(),
            None => self.class_name(ClassId::OBJ).to_string(),
        };

        let mut entries = vec![
            format!(
                "({})&{}",
                names::class_type(self.class_name(ClassId::OBJ)),
                names::dispatch_record_struct(&super_name)
            ),
            names::constructor_fn(name),
        ];
        for (owner, method_name) in self.layout_methods(cid) {
            entries.push(names::method_fn(self.class_name(owner), &method_name));
        }

        self.line(
            0,
            &format!(
                "struct {} {} = {{",
                names::class_struct(name),
                names::dispatch_record_struct(name)
            ),
        );
        let last = entries.len() - 1;
        for (i, entry) in entries.iter().enumerate() {
            let separator = if i == last { "" } else { "," };
            self.writer.line(1, &format!("{entry}{separator}"));
        }
        self.line(0, "};");
        self.blank();
        self.line(
            0,
            &format!(
                "{} {} = &{};",
                names::class_type(name),
                names::dispatch_record(name),
                names::dispatch_record_struct(name)
            ),
        );
    }

    /// Locals are every symbol that is not a field, not a parameter and
    /// not `this`.
    fn emit_locals(&mut self, indent: usize, method: &Method) {
        for symbol in method.symbol_table.sorted() {
            if symbol.is_field || symbol.name == SELF_NAME || method.has_param(&symbol.name) {
                continue;
            }
            let ty = symbol.ty.unwrap_or(ClassId::OBJ);
            let obj_ty = self.object_type(ty);
            self.line(indent, &format!("{obj_ty} {};", symbol.name));
        }
    }

    fn emit_constructor(&mut self, cid: ClassId) {
        let registry = self.registry;
        let class = registry.get(cid);
        let name = class.name.clone();

        self.return_type = Some(cid);
        self.symbols = Some(&class.constructor.symbol_table);

        self.blank();
        let signature = self.constructor_signature(cid);
        self.line(0, &format!("{signature} {{"));
        let obj_ty = names::object_type(&name);
        self.line(
            1,
            &format!(
                "{obj_ty} {SELF_NAME} = ({obj_ty})malloc(sizeof(struct {}));",
                names::object_struct(&name)
            ),
        );
        self.line(
            1,
            &format!("{SELF_NAME}->clazz = {};", names::dispatch_record(&name)),
        );
        self.emit_locals(1, &class.constructor);
        self.comment(1, "Method statements");
        self.emit_block(&class.constructor.body, 0);
        self.line(1, &format!("return {SELF_NAME};"));
        self.line(0, "}");

        self.symbols = None;
        self.return_type = None;
    }

    fn emit_method(&mut self, cid: ClassId, method_name: &str) {
        let registry = self.registry;
        let method = &registry.get(cid).methods[method_name];

        self.return_type = Some(method.return_class());
        self.symbols = Some(&method.symbol_table);

        self.blank();
        let signature = self.method_signature(cid, method_name);
        self.line(0, &format!("{signature} {{"));
        self.emit_locals(1, method);
        self.emit_block(&method.body, 0);
        self.line(0, "}");

        self.symbols = None;
        self.return_type = None;
    }

    fn emit_entry(&mut self, main: &'a Method) {
        debug!("emitting entry wrappers");
        self.return_type = Some(ClassId::NOTHING);
        self.symbols = Some(&main.symbol_table);

        self.blank();
        self.line(
            0,
            &format!("{} _main() {{", self.object_type(ClassId::NOTHING)),
        );
        self.emit_locals(1, main);
        self.comment(1, "main Method Body");
        self.emit_block(&main.body, 0);
        self.line(1, "return none;");
        self.line(0, "}");

        self.blank();
        self.line(0, "int main() {");
        self.line(1, "_main();");
        self.line(0, "}");

        self.symbols = None;
        self.return_type = None;
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn emit_block(&mut self, block: &Block, indent: usize) {
        for stmt in &block.stmts {
            self.emit_stmt(stmt, indent + 1);
        }
    }

    fn emit_stmt(&mut self, stmt: &Stmt, indent: usize) {
        match stmt {
            Stmt::Expr(expr) => {
                self.emit_expr(expr, indent, false);
            }
            Stmt::Assign { lhs, rhs } => {
                let rhs_text = self.emit_expr(rhs, indent, false);
                let lhs_text = self.emit_expr(lhs, indent, true);
                let cast = self.object_type(self.node_class(lhs));
                self.line(indent, &format!("{lhs_text} = ({cast})({rhs_text});"));
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                let if_label = self.next_label("if");
                let else_label = self.next_label("else");
                let end_label = self.next_label("end_if");

                self.emit_eval_branch(cond, indent, &if_label, &else_label);
                self.comment(indent, "True Part If");
                self.emit_label(indent, &if_label);
                self.emit_block(then_block, indent + 1);
                self.emit_goto(indent, &end_label);
                self.comment(indent, "False Part If");
                self.emit_label(indent, &else_label);
                self.emit_block(else_block, indent + 1);
                self.comment(indent, "End If");
                self.emit_label(indent, &end_label);
            }
            Stmt::While { cond, body } => {
                let test_label = self.next_label("test_cond");
                let again_label = self.next_label("loop_again");
                let end_label = self.next_label("end_while");

                self.comment(indent, "WHILE Loop Start");
                self.emit_goto(indent, &test_label);
                self.emit_label(indent, &again_label);
                self.emit_block(body, indent + 1);
                self.emit_label(indent, &test_label);
                self.emit_eval_branch(cond, indent, &again_label, &end_label);
                self.emit_label(indent, &end_label);
                self.comment(indent, "END WHILE Loop");
            }
            Stmt::Return(value) => {
                let cast = self.object_type(self.return_type.unwrap_or(ClassId::NOTHING));
                match value {
                    Some(expr) => {
                        let text = self.emit_expr(expr, indent, false);
                        self.line(indent, &format!("return ({cast})({text});"));
                    }
                    None => self.line(indent, &format!("return ({cast})(none);")),
                }
            }
            Stmt::Typecase {
                scrutinee,
                alternatives,
            } => self.emit_typecase(scrutinee, alternatives, indent),
        }
    }

    fn emit_typecase(
        &mut self,
        scrutinee: &Expr,
        alternatives: &[quill_ast::TypeAlternative],
        indent: usize,
    ) {
        let end_label = self.next_label("end_typecase");
        let mut labels: Vec<String> = alternatives
            .iter()
            .map(|alt| self.next_label(&format!("typecase_{}_", alt.class_name)))
            .collect();
        labels.push(end_label.clone());

        self.comment(indent, "Typecase START");
        let scrutinee_text = self.emit_expr(scrutinee, indent, false);
        let class_obj = names::class_type(self.class_name(ClassId::OBJ));

        for (i, alt) in alternatives.iter().enumerate() {
            self.comment(indent, &format!("Typecase Type - {}", alt.class_name));
            self.emit_label(indent, &labels[i]);
            self.line(
                indent,
                &format!(
                    "if(!is_subtype(({class_obj}){scrutinee_text}->clazz, ({class_obj})(&{}))) {{ goto {}; }}",
                    names::dispatch_record_struct(&alt.class_name),
                    labels[i + 1]
                ),
            );

            // Bind the alternative's variable to the scrutinee.
            let binding_ty = self
                .symbols
                .and_then(|table| table.type_of(&alt.binding, false))
                .unwrap_or(ClassId::OBJ);
            let cast = self.object_type(binding_ty);
            self.line(
                indent + 1,
                &format!("{} = ({cast})({scrutinee_text});", alt.binding),
            );

            self.emit_block(&alt.block, indent);
            self.emit_goto(indent, &end_label);
        }

        self.emit_label(indent, &end_label);
        self.comment(indent, "Typecase END");
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Lower an expression, returning the C text (a temporary, an
    /// identifier, or a literal constant) holding its value. In target
    /// position the returned text is a dereferenced address temporary.
    fn emit_expr(&mut self, expr: &Expr, indent: usize, is_lhs: bool) -> String {
        match &expr.kind {
            ExprKind::Int(value) => {
                self.store_temp(&format!("int_literal({value})"), self.node_class(expr), indent, false)
            }
            ExprKind::Bool(value) => {
                if *value {
                    "lit_true".to_string()
                } else {
                    "lit_false".to_string()
                }
            }
            ExprKind::Str(value) => self.store_temp(
                &format!("str_literal(\"{value}\")"),
                self.node_class(expr),
                indent,
                false,
            ),
            ExprKind::Nothing => "none".to_string(),
            ExprKind::Ident(name) => name.clone(),
            ExprKind::Access { object, member } => {
                let object_text = match &object.kind {
                    ExprKind::Ident(name) => name.clone(),
                    _ => self.emit_expr(object, indent, is_lhs),
                };
                match member {
                    Member::Field(field) => self.store_temp(
                        &format!("{object_text}->{field}"),
                        self.node_class(expr),
                        indent,
                        is_lhs,
                    ),
                    Member::Call(call) => self.emit_dispatch(
                        self.node_class(object),
                        &object_text,
                        &call.name,
                        &call.args,
                        self.node_class(expr),
                        indent,
                        is_lhs,
                    ),
                }
            }
            ExprKind::Call(call) => self.emit_constructor_call(expr, call, indent, is_lhs),
            ExprKind::Binary { op, left, right } => {
                let left_text = match &left.kind {
                    ExprKind::Ident(name) => name.clone(),
                    _ => self.emit_expr(left, indent, false),
                };
                self.emit_dispatch(
                    self.node_class(left),
                    &left_text,
                    op.method_name(),
                    slice::from_ref(right.as_ref()),
                    self.node_class(expr),
                    indent,
                    is_lhs,
                )
            }
            ExprKind::Logical { op, left, right } => {
                self.emit_logical(*op, left, right.as_deref(), indent)
            }
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Neg => {
                    // Negation lowers as 0 - operand.
                    let zero = self.store_temp("int_literal(0)", ClassId::INT, indent, false);
                    self.emit_dispatch(
                        ClassId::INT,
                        &zero,
                        "MINUS",
                        slice::from_ref(operand.as_ref()),
                        self.node_class(expr),
                        indent,
                        is_lhs,
                    )
                }
            },
            ExprKind::Typed {
                expr: inner,
                type_name,
            } => {
                let text = self.emit_expr(inner, indent, is_lhs);
                if type_name.is_none() {
                    text
                } else {
                    self.store_temp(&text, self.node_class(expr), indent, is_lhs)
                }
            }
        }
    }

    fn emit_args(&mut self, args: &[Expr], indent: usize) -> Vec<String> {
        args.iter()
            .map(|arg| match &arg.kind {
                ExprKind::Ident(name) => name.clone(),
                _ => self.emit_expr(arg, indent, false),
            })
            .collect()
    }

    /// Method call through the dispatch record, with explicit casts of
    /// the receiver and every argument to the declared types.
    fn emit_dispatch(
        &mut self,
        object_class: ClassId,
        object_text: &str,
        method_name: &str,
        args: &[Expr],
        result_ty: ClassId,
        indent: usize,
        is_lhs: bool,
    ) -> String {
        let arg_texts = self.emit_args(args, indent);
        let registry = self.registry;
        let Some((definer, method)) = registry.find_method(object_class, method_name) else {
            debug_assert!(false, "method resolved during inference");
            return object_text.to_string();
        };

        let mut text = format!(
            "{object_text}->clazz->{method_name}(({}){object_text}",
            self.object_type(definer)
        );
        for (arg_text, param) in arg_texts.iter().zip(&method.params) {
            text.push_str(&format!(", ({}){arg_text}", self.object_type(param.class())));
        }
        text.push(')');
        self.store_temp(&text, result_ty, indent, is_lhs)
    }

    fn emit_constructor_call(
        &mut self,
        expr: &Expr,
        call: &CallExpr,
        indent: usize,
        is_lhs: bool,
    ) -> String {
        let arg_texts = self.emit_args(&call.args, indent);
        let registry = self.registry;
        let node_ty = self.node_class(expr);
        let Some(class_id) = registry.lookup(&call.name) else {
            debug_assert!(false, "constructor resolved during inference");
            return String::new();
        };
        let params = &registry.get(class_id).constructor.params;

        let mut text = String::new();
        if class_id != node_ty {
            text.push_str(&format!("({})", self.object_type(node_ty)));
        }
        text.push_str(&names::constructor_fn(&call.name));
        text.push('(');
        for (i, (arg_text, param)) in arg_texts.iter().zip(params).enumerate() {
            if i > 0 {
                text.push_str(", ");
            }
            text.push_str(&format!("({}){arg_text}", self.object_type(param.class())));
        }
        text.push(')');
        self.store_temp(&text, node_ty, indent, is_lhs)
    }

    fn emit_logical(
        &mut self,
        op: LogicalOp,
        left: &Expr,
        right: Option<&Expr>,
        indent: usize,
    ) -> String {
        match op {
            LogicalOp::Not => {
                self.comment(indent, "NOT Start");
                let operand = self.emit_expr(left, indent, false);
                self.store_temp(
                    &format!("({operand} == lit_false)"),
                    ClassId::BOOLEAN,
                    indent,
                    false,
                )
            }
            LogicalOp::And | LogicalOp::Or => {
                let result = self.store_temp("lit_false", ClassId::BOOLEAN, indent, false);
                let halfway_label = self.next_label(&format!("{}_HALFWAY", op.symbol()));
                let true_label = self.next_label(&format!("{}_TRUE", op.symbol()));
                let end_label = self.next_label(&format!("{}_END", op.symbol()));

                self.comment(indent, &format!("{} Left Condition", op.symbol()));
                match op {
                    LogicalOp::And => {
                        self.emit_eval_branch(left, indent + 1, &halfway_label, &end_label);
                    }
                    _ => self.emit_eval_branch(left, indent + 1, &true_label, &halfway_label),
                }
                self.emit_label(indent, &halfway_label);

                self.comment(indent, &format!("{} Right Condition", op.symbol()));
                if let Some(right) = right {
                    self.emit_eval_branch(right, indent + 1, &true_label, &end_label);
                }

                self.comment(indent, "Boolean Get True");
                self.emit_label(indent, &true_label);
                self.line(indent, &format!("{result} = lit_true;"));

                self.emit_label(indent, &end_label);
                self.comment(indent, &format!("{} End", op.symbol()));
                result
            }
        }
    }

    /// Lower a condition against a (true-target, false-target) pair.
    /// Short-circuit operators jump directly; everything else evaluates
    /// to a value compared against `lit_true`.
    fn emit_eval_branch(&mut self, expr: &Expr, indent: usize, true_label: &str, false_label: &str) {
        match &expr.kind {
            ExprKind::Bool(value) => {
                if *value {
                    self.emit_goto(indent, true_label);
                } else {
                    self.emit_goto(indent, false_label);
                }
            }
            ExprKind::Logical { op, left, right } => match op {
                LogicalOp::Not => {
                    // Swap the targets.
                    self.emit_eval_branch(left, indent, false_label, true_label);
                }
                LogicalOp::And => {
                    let halfway_label = self.next_label("halfway");
                    self.comment(indent, "Generate AND");
                    self.emit_eval_branch(left, indent + 1, &halfway_label, false_label);
                    self.emit_label(indent, &halfway_label);
                    if let Some(right) = right {
                        self.emit_eval_branch(right, indent + 1, true_label, false_label);
                    }
                }
                LogicalOp::Or => {
                    let halfway_label = self.next_label("halfway");
                    self.comment(indent, "Generate OR");
                    self.emit_eval_branch(left, indent + 1, true_label, &halfway_label);
                    self.emit_label(indent, &halfway_label);
                    if let Some(right) = right {
                        self.emit_eval_branch(right, indent + 1, true_label, false_label);
                    }
                }
            },
            _ => {
                let value = self.emit_expr(expr, indent, false);
                self.line(
                    indent,
                    &format!("if(lit_true == {value}) {{ goto {true_label}; }}"),
                );
                self.emit_goto(indent, false_label);
            }
        }
    }
}
