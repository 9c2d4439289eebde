//! Debug printer reconstructing source-like text from the AST.
//!
//! Used by driver tracing and by tests that want a readable dump of a
//! built program. The output is close to, but not guaranteed to be,
//! re-parseable source.

use crate::program::{ClassDecl, MethodDecl, Param, Program};
use crate::tree::{Block, CallExpr, Expr, ExprKind, Member, Stmt};
use std::fmt::Write;

/// Render a whole program.
#[must_use]
pub fn program_to_string(program: &Program) -> String {
    let mut out = String::new();
    for (i, class) in program.classes.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        write_class(&mut out, class);
    }
    if !program.classes.is_empty() && !program.main.is_empty() {
        out.push_str("\n\n");
    }
    write_block(&mut out, &program.main, 0);
    out
}

/// Render a single expression.
#[must_use]
pub fn expr_to_string(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

fn write_class(out: &mut String, class: &ClassDecl) {
    let _ = write!(out, "class {}(", class.name);
    write_params(out, &class.params);
    out.push(')');
    if let Some(super_name) = &class.super_name {
        let _ = write!(out, " extends {super_name}");
    }
    out.push_str(" {\n");
    write_block(out, &class.constructor, 1);
    for method in &class.methods {
        if !class.constructor.is_empty() {
            out.push('\n');
        }
        write_method(out, method);
    }
    out.push_str("}");
}

fn write_method(out: &mut String, method: &MethodDecl) {
    let _ = write!(out, "\tdef {}(", method.name);
    write_params(out, &method.params);
    out.push(')');
    if let Some(return_type) = &method.return_type {
        let _ = write!(out, " : {return_type}");
    }
    out.push_str(" {\n");
    write_block(out, &method.body, 2);
    out.push_str("\t}\n");
}

fn write_params(out: &mut String, params: &[Param]) {
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{} : {}", param.name, param.type_name);
    }
}

fn write_block(out: &mut String, block: &Block, depth: usize) {
    for stmt in &block.stmts {
        out.push_str(&"\t".repeat(depth));
        write_stmt(out, stmt, depth);
        out.push_str(";\n");
    }
}

fn write_stmt(out: &mut String, stmt: &Stmt, depth: usize) {
    let indent = "\t".repeat(depth);
    match stmt {
        Stmt::Expr(expr) => write_expr(out, expr),
        Stmt::Assign { lhs, rhs } => {
            write_expr(out, lhs);
            out.push_str(" = ");
            write_expr(out, rhs);
        }
        Stmt::If {
            cond,
            then_block,
            else_block,
        } => {
            out.push_str("if ");
            write_expr(out, cond);
            out.push_str(" {\n");
            write_block(out, then_block, depth + 1);
            let _ = write!(out, "{indent}}}");
            if !else_block.is_empty() {
                out.push_str(" else {\n");
                write_block(out, else_block, depth + 1);
                let _ = write!(out, "{indent}}}");
            }
        }
        Stmt::While { cond, body } => {
            out.push_str("while ");
            write_expr(out, cond);
            out.push_str(" {\n");
            write_block(out, body, depth + 1);
            let _ = write!(out, "{indent}}}");
        }
        Stmt::Return(value) => {
            out.push_str("return");
            if let Some(value) = value {
                out.push(' ');
                write_expr(out, value);
            }
        }
        Stmt::Typecase {
            scrutinee,
            alternatives,
        } => {
            out.push_str("typecase ");
            write_expr(out, scrutinee);
            out.push_str(" {\n");
            for alt in alternatives {
                let _ = write!(out, "{indent}\t{} : {} {{\n", alt.binding, alt.class_name);
                write_block(out, &alt.block, depth + 2);
                let _ = write!(out, "{indent}\t}}\n");
            }
            let _ = write!(out, "{indent}}}");
        }
    }
}

fn write_call(out: &mut String, call: &CallExpr) {
    let _ = write!(out, "{}(", call.name);
    for (i, arg) in call.args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_expr(out, arg);
    }
    out.push(')');
}

fn write_expr(out: &mut String, expr: &Expr) {
    match &expr.kind {
        ExprKind::Int(value) => {
            let _ = write!(out, "{value}");
        }
        ExprKind::Bool(value) => out.push_str(if *value { "true" } else { "false" }),
        ExprKind::Str(value) => {
            let _ = write!(out, "\"{value}\"");
        }
        ExprKind::Nothing => out.push_str("none"),
        ExprKind::Ident(name) => out.push_str(name),
        ExprKind::Access { object, member } => {
            write_expr(out, object);
            out.push('.');
            match member {
                Member::Field(name) => out.push_str(name),
                Member::Call(call) => write_call(out, call),
            }
        }
        ExprKind::Call(call) => write_call(out, call),
        ExprKind::Binary { op, left, right } => {
            out.push('(');
            write_expr(out, left);
            let _ = write!(out, " {} ", op.symbol());
            write_expr(out, right);
            out.push(')');
        }
        ExprKind::Logical { op, left, right } => {
            out.push('(');
            match right {
                Some(right) => {
                    write_expr(out, left);
                    let _ = write!(out, " {} ", op.symbol());
                    write_expr(out, right);
                }
                None => {
                    let _ = write!(out, "{} ", op.symbol());
                    write_expr(out, left);
                }
            }
            out.push(')');
        }
        ExprKind::Unary { op, operand } => {
            let _ = write!(out, "({} ", op.symbol());
            write_expr(out, operand);
            out.push(')');
        }
        ExprKind::Typed { expr, type_name } => {
            write_expr(out, expr);
            if let Some(type_name) = type_name {
                let _ = write!(out, " : {type_name}");
            }
        }
    }
}
