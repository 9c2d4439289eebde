//! Return-path check.
//!
//! A block returns on all paths iff any contained statement does; an if
//! returns on all paths iff both branches do; while and typecase are
//! conservatively treated as not returning. Methods whose declared
//! return admits `Nothing` get an implicit `return none` appended;
//! anything else without a return on every path is rejected.

use quill_ast::{Block, Expr, Stmt};
use quill_binder::Registry;
use quill_common::{ClassId, CompileError, CompileResult, ErrorKind};
use tracing::debug;

/// Check every user-class method, appending implicit returns.
pub fn check_return_paths(registry: &mut Registry) -> CompileResult<()> {
    for cid in registry.user_class_ids() {
        let method_names: Vec<String> = registry.get(cid).methods.keys().cloned().collect();
        for name in method_names {
            let (returns, admits_nothing, class_name) = {
                let class = registry.get(cid);
                let method = &class.methods[name.as_str()];
                (
                    block_returns_on_all_paths(&method.body),
                    registry.is_subtype(ClassId::NOTHING, method.return_class()),
                    class.name.clone(),
                )
            };
            if returns {
                continue;
            }
            if !admits_nothing {
                return Err(CompileError::hierarchy(
                    ErrorKind::MissingReturn,
                    format!(
                        "Method {name} for class {class_name} does not have a return on all paths."
                    ),
                ));
            }
            debug!(class = %class_name, method = %name, "appending implicit return none");
            if let Some(method) = registry.get_mut(cid).methods.get_mut(&name) {
                method.body.append(Stmt::Return(Some(Expr::nothing())));
            }
        }
    }
    Ok(())
}

/// Whether every path through the block hits a return.
#[must_use]
pub fn block_returns_on_all_paths(block: &Block) -> bool {
    block.stmts.iter().any(stmt_returns_on_all_paths)
}

fn stmt_returns_on_all_paths(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(_) => true,
        Stmt::If {
            then_block,
            else_block,
            ..
        } => block_returns_on_all_paths(then_block) && block_returns_on_all_paths(else_block),
        // A while body may never run; no typecase alternative is
        // guaranteed to match.
        Stmt::While { .. } | Stmt::Typecase { .. } | Stmt::Expr(_) | Stmt::Assign { .. } => false,
    }
}
