//! Dispatch order, scoping, depth and interrupt handling.

use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;

use super::{error_kind, evaluator, expr, run, value};
use crate::{EvalErrorKind, Evaluator};

#[test]
fn atoms_evaluate_to_binding_or_themselves() {
    let (mut ev, _) = evaluator();
    assert_eq!(value(&mut ev, "unbound"), expr("unbound"));
    assert_eq!(value(&mut ev, "42"), expr("42"));
    assert_eq!(value(&mut ev, r#""text""#), expr(r#""text""#));

    value(&mut ev, "(Set unbound 3)");
    assert_eq!(value(&mut ev, "unbound"), expr("3"));
}

#[test]
fn strings_and_numbers_cannot_be_assigned() {
    let (mut ev, _) = evaluator();
    assert!(matches!(
        error_kind(&mut ev, r#"(Set "x" 1)"#),
        EvalErrorKind::ArgTypeError { index: 1, .. }
    ));
    assert!(matches!(
        error_kind(&mut ev, "(Set 3 1)"),
        EvalErrorKind::ArgTypeError { index: 1, .. }
    ));
}

#[test]
fn undeclared_head_rebuilds_with_evaluated_operands() {
    let (mut ev, _) = evaluator();
    assert_eq!(
        value(&mut ev, "(g (MathAdd 1 2) (List a))"),
        expr("(g 3 (List a))")
    );
}

#[test]
fn declared_head_without_match_returns_original() {
    let (mut ev, _) = evaluator();
    value(
        &mut ev,
        r#"
        (RuleBase f (List x))
        (Rule f 1 1 (Hold (Equals x 0)) zero)
        "#,
    );
    assert_eq!(value(&mut ev, "(f 9)"), expr("(f 9)"));
}

#[test]
fn builtin_with_wrong_arity_is_an_error() {
    let (mut ev, _) = evaluator();
    let kind = error_kind(&mut ev, "(Head a b)");
    assert!(matches!(kind, EvalErrorKind::ArityError { ref name, got: 2, .. } if name == "Head"));
}

#[test]
fn user_entry_extends_builtin_name_to_new_arity() {
    let (mut ev, _) = evaluator();
    value(
        &mut ev,
        r#"
        (RuleBase Head (List a b))
        (Rule Head 2 1 True (Hold (List b a)))
        "#,
    );
    assert_eq!(value(&mut ev, "(Head x y)"), expr("(List y x)"));
    assert_eq!(value(&mut ev, "(Head (List p q))"), expr("p"));
}

#[test]
fn prog_locals_do_not_escape() {
    let (mut ev, _) = evaluator();
    value(&mut ev, "(Set x 1)");
    assert_eq!(value(&mut ev, "(Prog (Local x) (Set x 2) x)"), expr("2"));
    assert_eq!(value(&mut ev, "x"), expr("1"));
}

#[test]
fn set_inside_prog_updates_enclosing_local() {
    let (mut ev, _) = evaluator();
    let result = value(&mut ev, "(Prog (Local n) (Set n 1) (Prog (Set n 5)) n)");
    assert_eq!(result, expr("5"));
    assert_eq!(value(&mut ev, "n"), expr("n"));
}

#[test]
fn rule_bodies_do_not_see_caller_locals() {
    let (mut ev, _) = evaluator();
    value(
        &mut ev,
        r#"
        (RuleBase peek (List a))
        (Rule peek 1 1 True (Hold z))
        "#,
    );
    assert_eq!(value(&mut ev, "(Prog (Local z) (Set z 5) (peek 1))"), expr("z"));
}

#[test]
fn macro_rule_bodies_see_caller_locals() {
    let (mut ev, _) = evaluator();
    value(
        &mut ev,
        r#"
        (DefMacroRuleBase peek (List a))
        (MacroRule peek 1 1 True z)
        "#,
    );
    assert_eq!(value(&mut ev, "(Prog (Local z) (Set z 5) (peek 1))"), expr("5"));
}

#[test]
fn macro_rule_base_declares_an_ordinary_entry() {
    let (mut ev, _) = evaluator();
    value(
        &mut ev,
        r#"
        (MacroRuleBase peek (List a))
        (MacroRule peek 1 1 True (List a z))
        "#,
    );
    let seen = value(&mut ev, "(Prog (Local z) (Set z 5) (peek (MathAdd 1 2)))");
    assert_eq!(seen, expr("(List 3 z)"));
}

#[test]
fn unfenced_bodies_see_caller_locals_with_evaluated_arguments() {
    let (mut ev, _) = evaluator();
    value(
        &mut ev,
        r#"
        (RuleBase peek (List a))
        (Rule peek 1 1 True (Hold (List a z)))
        "#,
    );
    let call = "(Prog (Local z) (Set z 5) (peek (MathAdd 1 2)))";
    assert_eq!(value(&mut ev, call), expr("(List 3 z)"));

    assert_eq!(value(&mut ev, "(UnFence peek 1)"), expr("True"));
    assert_eq!(value(&mut ev, call), expr("(List 3 5)"));
    assert_eq!(value(&mut ev, "z"), expr("z"));
    assert!(matches!(
        error_kind(&mut ev, "(UnFence peek 2)"),
        EvalErrorKind::UnknownEntry { arity: 2, .. }
    ));
}

#[test]
fn held_parameter_is_bound_unevaluated() {
    let (mut ev, _) = evaluator();
    value(
        &mut ev,
        r#"
        (RuleBase quote (List a))
        (Rule quote 1 1 True (Hold a))
        "#,
    );
    assert_eq!(value(&mut ev, "(quote (MathAdd 1 2))"), expr("3"));

    value(&mut ev, "(HoldArg quote a)");
    assert_eq!(value(&mut ev, "(quote (MathAdd 1 2))"), expr("(MathAdd 1 2)"));
}

#[test]
fn runaway_recursion_hits_depth_limit() {
    let (handler, _) = crate::OutputHandler::buffer();
    let mut ev = Evaluator::builder()
        .output(handler)
        .max_eval_depth(50)
        .build();
    value(
        &mut ev,
        r#"
        (RuleBase spin (List x))
        (Rule spin 1 1 True (Hold (spin x)))
        "#,
    );

    let kind = error_kind(&mut ev, "(spin 1)");
    assert_eq!(kind, EvalErrorKind::EvalDepthExceeded { limit: 50 });
    assert!(ev.stack().is_empty());
    assert_eq!(ev.env.depth(), 1);
    assert_eq!(ev.depth(), 0);
}

#[test]
fn max_eval_depth_builtin_changes_limit() {
    let (mut ev, _) = evaluator();
    value(&mut ev, "(MaxEvalDepth 7)");
    assert_eq!(ev.config().max_eval_depth, 7);
    assert!(matches!(
        error_kind(&mut ev, "(MaxEvalDepth 0)"),
        EvalErrorKind::ArgRangeError { .. }
    ));
}

#[test]
fn depth_errors_are_trappable() {
    let (mut ev, _) = evaluator();
    value(
        &mut ev,
        r#"
        (MaxEvalDepth 40)
        (RuleBase spin (List x))
        (Rule spin 1 1 True (Hold (spin x)))
        "#,
    );
    assert_eq!(value(&mut ev, "(TrapError (spin 1) caught)"), expr("caught"));
}

#[test]
fn failed_call_carries_backtrace_and_clears_stack() {
    let (mut ev, _) = evaluator();
    let error = run(&mut ev, "(List (Head (Nth (List a) 5)))").unwrap_err();
    assert!(matches!(error.kind, EvalErrorKind::ArgRangeError { .. }));
    let backtrace = error.backtrace.unwrap();
    assert!(!backtrace.is_empty());
    assert!(ev.stack().is_empty());
}

#[test]
fn pending_interrupt_stops_next_dispatch() {
    let (mut ev, _) = evaluator();
    ev.interrupt_handle().interrupt();
    assert_eq!(error_kind(&mut ev, "(List a)"), EvalErrorKind::Interrupted);
    // The interrupt is consumed.
    assert_eq!(value(&mut ev, "(List a)"), expr("(List a)"));
}

#[test]
fn interrupt_from_another_thread_escapes_trap() {
    let (mut ev, _) = evaluator();
    let handle = ev.interrupt_handle();
    let interrupter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        handle.interrupt();
    });

    let kind = error_kind(&mut ev, "(TrapError (While True (Set n 1)) caught)");
    interrupter.join().unwrap();

    assert_eq!(kind, EvalErrorKind::Interrupted);
    assert!(ev.stack().is_empty());
}

#[test]
fn while_loop_runs_until_predicate_fails() {
    let (mut ev, _) = evaluator();
    value(&mut ev, "(Set n 0)");
    value(&mut ev, "(While (LessThan n 5) (Set n (MathAdd n 1)))");
    assert_eq!(value(&mut ev, "n"), expr("5"));
}

#[test]
fn if_without_else_yields_false() {
    let (mut ev, _) = evaluator();
    assert_eq!(value(&mut ev, "(If (Equals 1 2) yes)"), expr("False"));
    assert_eq!(value(&mut ev, "(If (Equals 1 2) yes no)"), expr("no"));
    assert_eq!(value(&mut ev, "(If (Equals 2 2) yes no)"), expr("yes"));
}

#[test]
fn tracing_init_is_idempotent() {
    crate::init_tracing();
    crate::init_tracing();
    let (mut ev, _) = evaluator();
    assert_eq!(value(&mut ev, "(MathAdd 1 1)"), expr("2"));
}
