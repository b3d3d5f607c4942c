//! End-to-end scenarios and laws for the semantic analysis pass: lex, parse
//! and check a literal program string, then inspect the resulting
//! diagnostics.

use cflat::checking;
use cflat::intern::{Builtins, Interner};
use cflat::lexing;
use cflat::parsing;

fn check(source: &str) -> cflat::diagnostics::Diagnostics {
    let mut interner = Interner::new();
    Builtins::install(&mut interner);

    let tokens = lexing::lex(source).expect("lex should succeed");
    let decls = parsing::parse(tokens, &mut interner).expect("parse should succeed");
    checking::semant(&decls, &interner)
}

#[test]
fn missing_main() {
    let diags = check("Int foo() { return 0; }");
    assert_eq!(diags.lines(), &["Main function has not been defined"]);
    assert!(diags.has_errors());
}

#[test]
fn main_with_wrong_signature() {
    let diags = check("Int main(Int x) { return 0; }");
    assert!(diags.lines().iter().any(|l| l == "Main function should have return Void type"));
    assert!(diags.lines().iter().any(|l| l == "Main function should not have parameters"));
    assert!(diags.has_errors());
}

#[test]
fn duplicate_function() {
    let diags = check("Void main() { return; } Int main() { return 0; }");
    assert!(diags.lines().iter().any(|l| l.ends_with("Function main has already been defined")));
    assert!(diags.has_errors());
}

#[test]
fn arithmetic_promotion_compiles_cleanly() {
    let diags = check("Int g; Void main() { g = 1 + 2; return; }");
    assert!(!diags.has_errors());
}

#[test]
fn printf_compiles_cleanly() {
    let diags = check(r#"Void main() { printf("x=%d", 3, 4.0); return; }"#);
    assert!(!diags.has_errors());
}

#[test]
fn break_outside_loop() {
    let diags = check("Void main() { break; return; }");
    assert!(diags.lines().iter().any(|l| l.ends_with("break must be used in a loop sentence")));
    assert!(diags.has_errors());
}

#[test]
fn scope_shadow_law() {
    // A local `g` shadows the global `g` of a different type within its
    // block; leaving the block restores resolution to the global.
    let diags = check(
        r#"
        Int g;
        Void main() {
            g = 1;
            {
                Float g;
                g = 2.5;
            }
            g = 3;
            return;
        }
        "#,
    );
    assert!(!diags.has_errors());
}

#[test]
fn resolution_order_prefers_local_over_formal_and_global() {
    let diags = check(
        r#"
        Int x;
        Void shadow(Float x) {
            Bool x;
            x = true;
            return;
        }
        Void main() {
            return;
        }
        "#,
    );
    assert!(!diags.has_errors());
}

#[test]
fn error_count_is_monotonic_across_multiple_faults() {
    let diags = check("Void main() { break; break; break; return; }");
    assert_eq!(diags.count(), 3);
}

#[test]
fn function_missing_overall_return_is_reported() {
    let diags = check("Int f() { if (true) { return 1; } } Void main() { return; }");
    assert!(diags.lines().iter().any(|l| l.ends_with("Function f must have an overall return statement")));
}

#[test]
fn call_argument_type_mismatch_reports_first_offending_position() {
    let diags = check(
        r#"
        Void takes(Int a, Int b) { return; }
        Void main() {
            takes(1, "nope");
            return;
        }
        "#,
    );
    assert!(diags.lines().iter().any(|l| l.contains("wrong type of parameter 2")));
}
