//! The Declaration Installer: two source-order passes over the
//! top-level declaration list that populate the function and global-variable
//! environments before any function body is checked.

use super::Checker;
use crate::parsing::Decl;

/// Enter `func_table`/`func_para_table` and record every top-level
/// `CallDecl`'s signature. Pre-installs `printf` so it resolves as a
/// built-in call without ever having a user-supplied body.
pub(super) fn install_calls(checker: &mut Checker, decls: &[Decl]) {
    checker.func_table.enterscope();
    checker.func_para_table.enterscope();

    checker.func_table.addid(checker.builtins.printf, checker.builtins.void);
    checker.func_para_table.addid(checker.builtins.printf, Vec::new());

    for decl in decls {
        let call = match decl {
            Decl::CallDecl(call) => call,
            Decl::VariableDecl(_) => continue,
        };

        if call.name == checker.builtins.printf {
            checker.diags.error_at(call.pos, "Function printf cannot be defined");
        }
        else if checker.func_table.probe(call.name).is_some() {
            let msg = format!("Function {} has already been defined", checker.interner.resolve(call.name));
            checker.diags.error_at(call.pos, msg);
        }
        else {
            checker.func_table.addid(call.name, call.ret);
            checker.func_para_table.addid(call.name, call.params.clone());
        }
    }
}

/// Enter `global_var_table` and record every top-level `VariableDecl`. Run
/// after `main`'s existence has been decided, so that globals never affect
/// whether `main` was found.
pub(super) fn install_global_vars(checker: &mut Checker, decls: &[Decl]) {
    checker.global_var_table.enterscope();

    for decl in decls {
        let var = match decl {
            Decl::VariableDecl(var) => var,
            Decl::CallDecl(_) => continue,
        };

        if var.ty == checker.builtins.void {
            let msg = format!("Variable {} cannot have Void type", checker.interner.resolve(var.name));
            checker.diags.error_at(var.pos, msg);
        }
        else if checker.global_var_table.probe(var.name).is_some() {
            let msg = format!("Variable {} has already been defined", checker.interner.resolve(var.name));
            checker.diags.error_at(var.pos, msg);
        }
        else {
            checker.global_var_table.addid(var.name, var.ty);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::{Builtins, Interner};

    #[test]
    fn printf_cannot_be_redefined() {
        let mut interner = Interner::new();
        let builtins = Builtins::install(&mut interner);
        let printf = interner.intern("printf");

        let tokens = crate::lexing::lex("Int printf() { return 0; }").unwrap();
        let decls = crate::parsing::parse(tokens, &mut interner).unwrap();

        let mut checker = Checker::new(&interner, builtins);
        install_calls(&mut checker, &decls);

        assert_eq!(checker.diags.lines(), &["1: Function printf cannot be defined"]);
        assert_eq!(checker.func_table.lookup(printf), Some(&builtins.void));
    }

    #[test]
    fn duplicate_functions_are_reported_once_per_extra_occurrence() {
        let mut interner = Interner::new();
        let builtins = Builtins::install(&mut interner);

        let tokens = crate::lexing::lex("Void foo() { return; } Void foo() { return; } Void foo() { return; }").unwrap();
        let decls = crate::parsing::parse(tokens, &mut interner).unwrap();

        let mut checker = Checker::new(&interner, builtins);
        install_calls(&mut checker, &decls);

        assert_eq!(checker.diags.count(), 2);
    }

    #[test]
    fn void_globals_are_rejected() {
        let mut interner = Interner::new();
        let builtins = Builtins::install(&mut interner);

        let tokens = crate::lexing::lex("Void g;").unwrap();
        let decls = crate::parsing::parse(tokens, &mut interner).unwrap();

        let mut checker = Checker::new(&interner, builtins);
        install_global_vars(&mut checker, &decls);

        assert_eq!(checker.diags.count(), 1);
    }
}
