//! The Statement Checker: validates each statement form, tracks
//! loop/call/statement nesting, and decides whether a function body has an
//! overall return statement.

use super::expr;
use super::Checker;
use crate::parsing::{CallDecl, ExprKind, Stmt, StmtBlock};

/// Check one `CallDecl`'s signature and body.
pub(super) fn check_call(checker: &mut Checker, call: &CallDecl) {
    if call.name == checker.builtins.main {
        if call.ret != checker.builtins.void {
            checker.diags.error_at(call.pos, "Main function should have return Void type");
        }
        if !call.params.is_empty() {
            checker.diags.error_at(call.pos, "Main function should not have parameters");
        }
    }

    if !checker.builtins.is_type_tag(call.ret) {
        let msg = format!("Return type: {} is incorrect", checker.interner.resolve(call.ret));
        checker.diags.error_at(call.pos, msg);
    }

    if call.params.len() > 6 {
        let msg = format!("Function {} should not have more than six parameters", checker.interner.resolve(call.name));
        checker.diags.error_at(call.pos, msg);
    }

    checker.formal_par_table.enterscope();

    for param in &call.params {
        if param.ty == checker.builtins.void {
            let msg = format!(
                "Function {}'s parameter {} cannot have Void type",
                checker.interner.resolve(call.name),
                checker.interner.resolve(param.name)
            );
            checker.diags.error_at(param.pos, msg);
        }
        else if checker.formal_par_table.probe(param.name).is_some() {
            let msg = format!(
                "Function {}'s parameter {} has already been declared",
                checker.interner.resolve(call.name),
                checker.interner.resolve(param.name)
            );
            checker.diags.error_at(param.pos, msg);
        }
        else {
            checker.formal_par_table.addid(param.name, param.ty);
        }
    }

    checker.has_return = false;
    checker.return_type = call.ret;
    checker.call_level += 1;

    check_block(checker, &call.body);

    checker.call_level -= 1;

    if !checker.has_return {
        let msg = format!("Function {} must have an overall return statement", checker.interner.resolve(call.name));
        checker.diags.error_at(call.pos, msg);
    }

    checker.formal_par_table.exitscope();
}

fn check_block(checker: &mut Checker, block: &StmtBlock) {
    checker.stmt_level += 1;
    checker.local_var_table.enterscope();

    for local in &block.locals {
        if local.ty == checker.builtins.void {
            let msg = format!("Variable {} cannot have Void type", checker.interner.resolve(local.name));
            checker.diags.error_at(local.pos, msg);
        }
        else if checker.local_var_table.probe(local.name).is_some() {
            let msg = format!("Variable {} has already been defined", checker.interner.resolve(local.name));
            checker.diags.error_at(local.pos, msg);
        }
        else {
            checker.local_var_table.addid(local.name, local.ty);
        }
    }

    for stmt in &block.stmts {
        check_stmt(checker, stmt);
    }

    checker.local_var_table.exitscope();
    checker.stmt_level -= 1;
}

fn check_stmt(checker: &mut Checker, stmt: &Stmt) {
    match stmt {
        Stmt::Block(block) => check_block(checker, block),

        Stmt::If { cond, then_block, else_block, pos } => {
            let cond_ty = expr::check_expr(checker, cond);
            if cond_ty != checker.builtins.bool_ {
                let msg = format!("Condition type must be Bool, not {}", checker.interner.resolve(cond_ty));
                checker.diags.error_at(*pos, msg);
            }
            check_block(checker, then_block);
            check_block(checker, else_block);
        }

        Stmt::While { cond, body, pos } => {
            checker.loop_level += 1;
            let cond_ty = expr::check_expr(checker, cond);
            if cond_ty != checker.builtins.bool_ {
                let msg = format!("Condition type must be Bool, not {}", checker.interner.resolve(cond_ty));
                checker.diags.error_at(*pos, msg);
            }
            check_block(checker, body);
            checker.loop_level -= 1;
        }

        Stmt::For { init, cond, step, body, pos } => {
            checker.loop_level += 1;

            expr::check_expr(checker, init);
            let cond_ty = expr::check_expr(checker, cond);
            if !matches!(cond.kind, ExprKind::NoExpr) && cond_ty != checker.builtins.bool_ {
                let msg = format!("Condition type must be Bool, not {}", checker.interner.resolve(cond_ty));
                checker.diags.error_at(*pos, msg);
            }
            expr::check_expr(checker, step);

            check_block(checker, body);
            checker.loop_level -= 1;
        }

        Stmt::Return { value, pos } => {
            if checker.stmt_level == checker.call_level {
                checker.has_return = true;
            }

            let value_ty = expr::check_expr(checker, value);
            if value_ty != checker.return_type {
                let msg = format!(
                    "Returns {}, but need {}",
                    checker.interner.resolve(value_ty),
                    checker.interner.resolve(checker.return_type)
                );
                checker.diags.error_at(*pos, msg);
            }
        }

        Stmt::Break { pos } => {
            if checker.loop_level == 0 {
                checker.diags.error_at(*pos, "break must be used in a loop sentence");
            }
        }

        Stmt::Continue { pos } => {
            if checker.loop_level == 0 {
                checker.diags.error_at(*pos, "continue must be used in a loop sentence");
            }
        }

        Stmt::ExprStmt { expr: e, .. } => {
            expr::check_expr(checker, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checking::declare;
    use crate::diagnostics::Diagnostics;
    use crate::intern::{Builtins, Interner};
    use crate::lexing::lex;
    use crate::parsing::{parse, Decl};

    fn run(source: &str) -> Diagnostics {
        let mut interner = Interner::new();
        let builtins = Builtins::install(&mut interner);
        let tokens = lex(source).unwrap();
        let decls = parse(tokens, &mut interner).unwrap();

        let mut checker = Checker::new(&interner, builtins);
        declare::install_calls(&mut checker, &decls);
        declare::install_global_vars(&mut checker, &decls);

        for decl in &decls {
            if let Decl::CallDecl(call) = decl {
                check_call(&mut checker, call);
            }
        }

        checker.diags
    }

    #[test]
    fn break_outside_loop_is_rejected() {
        let diags = run("Void main() { break; return; }");
        assert_eq!(diags.lines(), &["1: break must be used in a loop sentence"]);
    }

    #[test]
    fn break_inside_while_is_accepted() {
        let diags = run("Void main() { while (true) { break; } return; }");
        assert!(!diags.has_errors());
    }

    #[test]
    fn overall_return_must_be_at_top_level_of_the_body() {
        let diags = run("Void main() { if (true) { return; } return; }");
        // The nested return doesn't satisfy the overall-return requirement,
        // but the function also has a top-level one, so this should be clean.
        assert!(!diags.has_errors());
    }

    #[test]
    fn missing_overall_return_is_reported() {
        let diags = run("Void main() { if (true) { return; } }");
        assert!(diags.lines().iter().any(|line| line.contains("must have an overall return statement")));
    }

    #[test]
    fn main_with_wrong_signature_reports_both_errors() {
        let diags = run("Int main(Int x) { return 0; }");
        assert!(diags.lines().iter().any(|l| l.contains("Main function should have return Void type")));
        assert!(diags.lines().iter().any(|l| l.contains("Main function should not have parameters")));
    }

    #[test]
    fn for_loop_with_empty_clauses_type_checks() {
        let diags = run("Void main() { for (;;) { break; } return; }");
        assert!(!diags.has_errors());
    }
}
