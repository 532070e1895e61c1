//! Whole-program scenarios covering rules, lists, operators, traps and
//! fencing.

use pretty_assertions::assert_eq;

use super::{error_kind, evaluator, expr, run, value};
use crate::EvalErrorKind;

const INCREMENT_WITH_ZERO_CASE: &str = r#"
    (RuleBase f (List x))
    (Rule f 1 5 True (Hold (MathAdd x 1)))
    (Rule f 1 1 (Hold (Equals x 0)) 100)
"#;

#[test]
fn lower_precedence_rule_wins() {
    let (mut ev, _) = evaluator();
    value(&mut ev, INCREMENT_WITH_ZERO_CASE);

    assert_eq!(value(&mut ev, "(f 0)"), expr("100"));
    assert_eq!(value(&mut ev, "(f 7)"), expr("8"));
}

#[test]
fn insertion_order_does_not_change_matching() {
    let (mut ev, _) = evaluator();
    value(
        &mut ev,
        r#"
        (RuleBase f (List x))
        (Rule f 1 1 (Hold (Equals x 0)) 100)
        (Rule f 1 5 True (Hold (MathAdd x 1)))
        "#,
    );

    assert_eq!(value(&mut ev, "(f 0)"), expr("100"));
    assert_eq!(value(&mut ev, "(f 7)"), expr("8"));
}

#[test]
fn destructive_delete_leaves_shared_original() {
    let (mut ev, _) = evaluator();
    value(&mut ev, "(Set original (List a b c))");
    value(&mut ev, "(Set copy (FlatCopy original))");

    assert_eq!(value(&mut ev, "(DestructiveDelete copy 2)"), expr("(List a c)"));
    assert_eq!(value(&mut ev, "original"), expr("(List a b c)"));

    // Even without an explicit copy the stored value is shared, not edited.
    assert_eq!(value(&mut ev, "(DestructiveDelete original 2)"), expr("(List a c)"));
    assert_eq!(value(&mut ev, "original"), expr("(List a b c)"));
}

#[test]
fn redeclared_infix_overwrites_precedence() {
    let (mut ev, _) = evaluator();
    value(&mut ev, r#"(Infix "@" 20)"#);
    assert_eq!(value(&mut ev, r#"(OpPrecedence "@")"#), expr("20"));

    value(&mut ev, r#"(Infix "@" 30)"#);
    assert_eq!(value(&mut ev, r#"(OpPrecedence "@")"#), expr("30"));
}

#[test]
fn trapped_user_error_recovers_and_clears_channel() {
    let (mut ev, _) = evaluator();
    value(
        &mut ev,
        r#"
        (RuleBase g (List x))
        (Rule g 1 1 True (Hold (Check False "bad input")))
        "#,
    );

    assert_eq!(value(&mut ev, "(TrapError (g 1) -1)"), expr("-1"));
    assert_eq!(value(&mut ev, "(GetCoreError)"), expr(r#""""#));
    assert_eq!(ev.last_error(), None);
}

#[test]
fn recovery_reads_the_trapped_message() {
    let (mut ev, _) = evaluator();
    let caught = value(&mut ev, r#"(TrapError (Check False "bad input") (GetCoreError))"#);
    assert_eq!(caught, expr(r#""bad input""#));
}

#[test]
fn fenced_entry_rejects_new_rules_but_still_matches() {
    let (mut ev, _) = evaluator();
    value(
        &mut ev,
        r#"
        (RuleBase g (List x))
        (Rule g 1 1 (Hold (Equals x 0)) zero)
        (Rule g 1 2 True other)
        (Fence g 1)
        "#,
    );

    let kind = error_kind(&mut ev, "(Rule g 1 0 True third)");
    assert!(matches!(kind, EvalErrorKind::EntryFenced { ref symbol, arity: 1 } if symbol == "g"));

    assert_eq!(value(&mut ev, "(g 0)"), expr("zero"));
    assert_eq!(value(&mut ev, "(g 5)"), expr("other"));
    assert!(run(&mut ev, "(Rule g 1 3 True third)").is_err());
}
