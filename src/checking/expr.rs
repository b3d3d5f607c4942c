//! Expression Type Rules: assigns a type to every expression node and
//! writes it back into the node's type slot. On any error the slot is
//! poisoned to `Void` so the surrounding context degrades gracefully instead
//! of unwinding.

use super::Checker;
use crate::intern::Sym;
use crate::parsing::{Expr, ExprKind};
use crate::stream::Position;

/// Type-check one expression node, write its inferred type into the node,
/// and return that type.
pub(super) fn check_expr(checker: &mut Checker, expr: &Expr) -> Sym {
    let ty = compute_type(checker, expr);
    expr.set_type(ty);
    ty
}

fn compute_type(checker: &mut Checker, expr: &Expr) -> Sym {
    match &expr.kind {
        ExprKind::IntLiteral(_) => checker.builtins.int,
        ExprKind::FloatLiteral(_) => checker.builtins.float,
        ExprKind::StringLiteral(_) => checker.builtins.string,
        ExprKind::BoolLiteral(_) => checker.builtins.bool_,
        ExprKind::NoExpr => checker.builtins.void,

        ExprKind::Object(name) => resolve_name(checker, *name, expr.pos).unwrap_or(checker.builtins.void),

        ExprKind::Assign { lvalue, value } => check_assign(checker, expr.pos, *lvalue, value),

        ExprKind::Call { name, actuals } => check_call(checker, expr.pos, *name, actuals),

        ExprKind::Neg(operand) => check_neg(checker, expr.pos, operand),
        ExprKind::Not(operand) => check_not(checker, expr.pos, operand),
        ExprKind::Bitnot(operand) => check_bitnot(checker, expr.pos, operand),

        ExprKind::Add(lhs, rhs) => check_arithmetic(checker, expr.pos, "+", lhs, rhs),
        ExprKind::Sub(lhs, rhs) => check_arithmetic(checker, expr.pos, "-", lhs, rhs),
        ExprKind::Mul(lhs, rhs) => check_arithmetic(checker, expr.pos, "*", lhs, rhs),
        ExprKind::Div(lhs, rhs) => check_arithmetic(checker, expr.pos, "/", lhs, rhs),
        ExprKind::Mod(lhs, rhs) => check_mod(checker, expr.pos, lhs, rhs),

        ExprKind::Lt(lhs, rhs) => check_relational(checker, expr.pos, "<", lhs, rhs),
        ExprKind::Le(lhs, rhs) => check_relational(checker, expr.pos, "<=", lhs, rhs),
        ExprKind::Gt(lhs, rhs) => check_relational(checker, expr.pos, ">", lhs, rhs),
        ExprKind::Ge(lhs, rhs) => check_relational(checker, expr.pos, ">=", lhs, rhs),

        ExprKind::Eq(lhs, rhs) => check_equality(checker, expr.pos, "==", lhs, rhs),
        ExprKind::Ne(lhs, rhs) => check_equality(checker, expr.pos, "!=", lhs, rhs),

        ExprKind::And(lhs, rhs) => check_logical(checker, expr.pos, "&&", lhs, rhs),
        ExprKind::Or(lhs, rhs) => check_logical(checker, expr.pos, "||", lhs, rhs),

        ExprKind::Xor(lhs, rhs) => check_xor(checker, expr.pos, lhs, rhs),

        ExprKind::Bitand(lhs, rhs) => check_bitwise(checker, expr.pos, "&", lhs, rhs),
        ExprKind::Bitor(lhs, rhs) => check_bitwise(checker, expr.pos, "|", lhs, rhs),
    }
}

/// Resolve an identifier against `local_var_table`, then `formal_par_table`
/// (innermost frame only - formals live in exactly one scope), then
/// `global_var_table`. Reports "object has not been defined" and returns
/// `None` on failure.
///
/// Used by `Object` only - `Assign`'s lvalue has its own resolver
/// (`resolve_lvalue`) with a distinct unresolved-name message.
fn resolve_name(checker: &mut Checker, name: Sym, pos: Position) -> Option<Sym> {
    if let Some(&ty) = checker.local_var_table.lookup(name) {
        return Some(ty);
    }
    if let Some(&ty) = checker.formal_par_table.probe(name) {
        return Some(ty);
    }
    if let Some(&ty) = checker.global_var_table.lookup(name) {
        return Some(ty);
    }

    let msg = format!("object {} has not been defined", checker.interner.resolve(name));
    checker.diags.error_at(pos, msg);
    None
}

fn resolve_lvalue(checker: &mut Checker, name: Sym, pos: Position) -> Option<Sym> {
    if let Some(&ty) = checker.local_var_table.lookup(name) {
        return Some(ty);
    }
    if let Some(&ty) = checker.formal_par_table.probe(name) {
        return Some(ty);
    }
    if let Some(&ty) = checker.global_var_table.lookup(name) {
        return Some(ty);
    }

    let msg = format!("Left value {} has not been defined", checker.interner.resolve(name));
    checker.diags.error_at(pos, msg);
    None
}

fn check_assign(checker: &mut Checker, pos: Position, lvalue: Sym, value: &Expr) -> Sym {
    let value_ty = check_expr(checker, value);

    match resolve_lvalue(checker, lvalue, pos) {
        Some(lhs_ty) => {
            if lhs_ty != value_ty {
                let msg = format!(
                    "Right value's type is {} but needs {}",
                    checker.interner.resolve(value_ty),
                    checker.interner.resolve(lhs_ty)
                );
                checker.diags.error_at(pos, msg);
            }
            lhs_ty
        }
        None => checker.builtins.void,
    }
}

fn check_call(checker: &mut Checker, pos: Position, name: Sym, actuals: &[Expr]) -> Sym {
    if name == checker.builtins.printf {
        return check_printf(checker, pos, actuals);
    }

    let ret = match checker.func_table.lookup(name).copied() {
        Some(ret) => ret,
        None => {
            let msg = format!("Function {} has not been defined", checker.interner.resolve(name));
            checker.diags.error_at(pos, msg);
            return checker.builtins.void;
        }
    };

    let params = checker.func_para_table.lookup(name).cloned().unwrap_or_default();

    if actuals.len() != params.len() {
        let msg = format!("Function {} is used with wrong number of parameters", checker.interner.resolve(name));
        checker.diags.error_at(pos, msg);
        for actual in actuals {
            check_expr(checker, actual);
        }
    }
    else {
        for (i, (actual, param)) in actuals.iter().zip(params.iter()).enumerate() {
            let actual_ty = check_expr(checker, actual);
            if actual_ty != param.ty {
                let msg = format!(
                    "Function {} called with wrong type of parameter {}",
                    checker.interner.resolve(name),
                    i + 1
                );
                checker.diags.error_at(pos, msg);
                break;
            }
        }
    }

    ret
}

fn check_printf(checker: &mut Checker, pos: Position, actuals: &[Expr]) -> Sym {
    if actuals.is_empty() {
        checker.diags.error_at(pos, "printf function must have at least one parameter");
        return checker.builtins.void;
    }

    let first_ty = check_expr(checker, &actuals[0]);
    if first_ty != checker.builtins.string {
        checker.diags.error_at(pos, "printf function's first parameter must be String type");
        return checker.builtins.void;
    }

    for actual in &actuals[1..] {
        check_expr(checker, actual);
    }

    checker.builtins.void
}

fn check_neg(checker: &mut Checker, pos: Position, operand: &Expr) -> Sym {
    let builtins = checker.builtins;
    let ty = check_expr(checker, operand);

    if ty == builtins.int {
        builtins.int
    }
    else if ty == builtins.float {
        builtins.float
    }
    else {
        let msg = format!("Incompatible operand type for unary -: {}", checker.interner.resolve(ty));
        checker.diags.error_at(pos, msg);
        builtins.void
    }
}

fn check_not(checker: &mut Checker, pos: Position, operand: &Expr) -> Sym {
    let builtins = checker.builtins;
    let ty = check_expr(checker, operand);

    if ty == builtins.bool_ {
        builtins.bool_
    }
    else {
        let msg = format!("Incompatible operand type for !: {}", checker.interner.resolve(ty));
        checker.diags.error_at(pos, msg);
        builtins.void
    }
}

fn check_bitnot(checker: &mut Checker, pos: Position, operand: &Expr) -> Sym {
    let builtins = checker.builtins;
    let ty = check_expr(checker, operand);

    if ty == builtins.int {
        builtins.int
    }
    else {
        let msg = format!("Incompatible operand type for ~: {}", checker.interner.resolve(ty));
        checker.diags.error_at(pos, msg);
        builtins.void
    }
}

fn check_arithmetic(checker: &mut Checker, pos: Position, symbol: &str, lhs: &Expr, rhs: &Expr) -> Sym {
    let builtins = checker.builtins;
    let lhs_ty = check_expr(checker, lhs);
    let rhs_ty = check_expr(checker, rhs);

    if lhs_ty == builtins.int && rhs_ty == builtins.int {
        builtins.int
    }
    else if (lhs_ty == builtins.int || lhs_ty == builtins.float) && (rhs_ty == builtins.int || rhs_ty == builtins.float) {
        builtins.float
    }
    else {
        report_binary_mismatch(checker, pos, symbol, lhs_ty, rhs_ty);
        builtins.void
    }
}

fn check_mod(checker: &mut Checker, pos: Position, lhs: &Expr, rhs: &Expr) -> Sym {
    let builtins = checker.builtins;
    let lhs_ty = check_expr(checker, lhs);
    let rhs_ty = check_expr(checker, rhs);

    if lhs_ty == builtins.int && rhs_ty == builtins.int {
        builtins.int
    }
    else {
        report_binary_mismatch(checker, pos, "%", lhs_ty, rhs_ty);
        builtins.void
    }
}

fn check_relational(checker: &mut Checker, pos: Position, symbol: &str, lhs: &Expr, rhs: &Expr) -> Sym {
    let builtins = checker.builtins;
    let lhs_ty = check_expr(checker, lhs);
    let rhs_ty = check_expr(checker, rhs);
    let is_numeric = |ty: Sym| ty == builtins.int || ty == builtins.float;

    if is_numeric(lhs_ty) && is_numeric(rhs_ty) {
        builtins.bool_
    }
    else {
        report_binary_mismatch(checker, pos, symbol, lhs_ty, rhs_ty);
        builtins.void
    }
}

fn check_equality(checker: &mut Checker, pos: Position, symbol: &str, lhs: &Expr, rhs: &Expr) -> Sym {
    let builtins = checker.builtins;
    let lhs_ty = check_expr(checker, lhs);
    let rhs_ty = check_expr(checker, rhs);
    let is_numeric = |ty: Sym| ty == builtins.int || ty == builtins.float;

    let comparable = (is_numeric(lhs_ty) && is_numeric(rhs_ty)) || (lhs_ty == builtins.bool_ && rhs_ty == builtins.bool_);

    if comparable {
        builtins.bool_
    }
    else {
        report_binary_mismatch(checker, pos, symbol, lhs_ty, rhs_ty);
        builtins.void
    }
}

fn check_logical(checker: &mut Checker, pos: Position, symbol: &str, lhs: &Expr, rhs: &Expr) -> Sym {
    let builtins = checker.builtins;
    let lhs_ty = check_expr(checker, lhs);
    let rhs_ty = check_expr(checker, rhs);

    if lhs_ty == builtins.bool_ && rhs_ty == builtins.bool_ {
        builtins.bool_
    }
    else {
        report_binary_mismatch(checker, pos, symbol, lhs_ty, rhs_ty);
        builtins.void
    }
}

fn check_xor(checker: &mut Checker, pos: Position, lhs: &Expr, rhs: &Expr) -> Sym {
    let builtins = checker.builtins;
    let lhs_ty = check_expr(checker, lhs);
    let rhs_ty = check_expr(checker, rhs);

    if lhs_ty == builtins.bool_ && rhs_ty == builtins.bool_ {
        builtins.bool_
    }
    else if lhs_ty == builtins.int && rhs_ty == builtins.int {
        builtins.int
    }
    else {
        report_binary_mismatch(checker, pos, "^", lhs_ty, rhs_ty);
        builtins.void
    }
}

fn check_bitwise(checker: &mut Checker, pos: Position, symbol: &str, lhs: &Expr, rhs: &Expr) -> Sym {
    let builtins = checker.builtins;
    let lhs_ty = check_expr(checker, lhs);
    let rhs_ty = check_expr(checker, rhs);

    if lhs_ty == builtins.int && rhs_ty == builtins.int {
        builtins.int
    }
    else {
        report_binary_mismatch(checker, pos, symbol, lhs_ty, rhs_ty);
        builtins.void
    }
}

fn report_binary_mismatch(checker: &mut Checker, pos: Position, symbol: &str, lhs_ty: Sym, rhs_ty: Sym) {
    let msg = format!(
        "Incompatible operand types for {}: {} and {}",
        symbol,
        checker.interner.resolve(lhs_ty),
        checker.interner.resolve(rhs_ty)
    );
    checker.diags.error_at(pos, msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::{Builtins, Interner};
    use crate::lexing::lex;
    use crate::parsing::parse;

    fn check_program_exprs(source: &str) -> Vec<Sym> {
        let mut interner = Interner::new();
        let builtins = Builtins::install(&mut interner);
        let tokens = lex(source).unwrap();
        let decls = parse(tokens, &mut interner).unwrap();

        let mut checker = Checker::new(&interner, builtins);
        super::super::declare::install_calls(&mut checker, &decls);
        super::super::declare::install_global_vars(&mut checker, &decls);

        let mut types = Vec::new();
        for decl in &decls {
            if let crate::parsing::Decl::CallDecl(call) = decl {
                checker.formal_par_table.enterscope();
                for param in &call.params {
                    checker.formal_par_table.addid(param.name, param.ty);
                }
                checker.local_var_table.enterscope();
                for stmt in &call.body.stmts {
                    if let crate::parsing::Stmt::ExprStmt { expr, .. } = stmt {
                        types.push(check_expr(&mut checker, expr));
                    }
                }
                checker.local_var_table.exitscope();
                checker.formal_par_table.exitscope();
            }
        }
        types
    }

    #[test]
    fn int_plus_int_is_int() {
        let mut interner = Interner::new();
        let builtins = Builtins::install(&mut interner);
        let mut checker = Checker::new(&interner, builtins);

        let lhs = Expr::new(ExprKind::IntLiteral(1), Position::new());
        let rhs = Expr::new(ExprKind::IntLiteral(2), Position::new());
        let expr = Expr::new(ExprKind::Add(Box::new(lhs), Box::new(rhs)), Position::new());

        assert_eq!(check_expr(&mut checker, &expr), builtins.int);
        assert!(!checker.diags.has_errors());
    }

    #[test]
    fn int_plus_float_promotes_to_float() {
        let mut interner = Interner::new();
        let builtins = Builtins::install(&mut interner);
        let mut checker = Checker::new(&interner, builtins);

        let lhs = Expr::new(ExprKind::IntLiteral(1), Position::new());
        let rhs = Expr::new(ExprKind::FloatLiteral(2.0), Position::new());
        let expr = Expr::new(ExprKind::Add(Box::new(lhs), Box::new(rhs)), Position::new());

        assert_eq!(check_expr(&mut checker, &expr), builtins.float);
    }

    #[test]
    fn string_equality_is_rejected() {
        let mut interner = Interner::new();
        let builtins = Builtins::install(&mut interner);
        let mut checker = Checker::new(&interner, builtins);

        let lhs = Expr::new(ExprKind::StringLiteral("a".to_string()), Position::new());
        let rhs = Expr::new(ExprKind::StringLiteral("b".to_string()), Position::new());
        let expr = Expr::new(ExprKind::Eq(Box::new(lhs), Box::new(rhs)), Position::new());

        assert_eq!(check_expr(&mut checker, &expr), builtins.void);
        assert_eq!(checker.diags.count(), 1);
    }

    #[test]
    fn printf_with_non_string_first_argument_short_circuits() {
        // The call itself still type-checks to Void; the point of this test
        // is that it doesn't panic walking a second, unchecked actual.
        let types = check_program_exprs("Void main() { printf(1, 2); return; }");
        assert_eq!(types.len(), 1);
    }

    #[test]
    fn undefined_object_is_reported() {
        let mut interner = Interner::new();
        let builtins = Builtins::install(&mut interner);
        let name = interner.intern("x");
        let mut checker = Checker::new(&interner, builtins);

        let expr = Expr::new(ExprKind::Object(name), Position::new());
        assert_eq!(check_expr(&mut checker, &expr), builtins.void);
        assert_eq!(checker.diags.lines(), &["object x has not been defined"]);
    }
}
