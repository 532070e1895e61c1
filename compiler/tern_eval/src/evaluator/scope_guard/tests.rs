#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use super::*;
use crate::strategy::{PlainStrategy, TracedStrategy};
use tern_ir::{Atom, Expr};

#[test]
fn test_scoped_evaluator_drops_on_normal_exit() {
    let mut ev = Evaluator::new();
    assert_eq!(ev.env.depth(), 1);

    {
        let scoped = ev.scoped(false);
        assert_eq!(scoped.env.depth(), 2);
    }

    assert_eq!(ev.env.depth(), 1);
}

#[test]
fn test_scoped_evaluator_drops_on_panic() {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    let mut ev = Evaluator::new();
    let result = catch_unwind(AssertUnwindSafe(|| {
        let scoped = ev.scoped(true);
        assert_eq!(scoped.env.depth(), 2);
        panic!("test panic");
    }));

    assert!(result.is_err());
    assert_eq!(ev.env.depth(), 1);
}

#[test]
fn test_with_frame_pops_on_error() {
    let mut ev = Evaluator::new();
    let result: Result<(), &str> = ev.with_frame(false, |scoped| {
        scoped.with_frame(true, |inner| {
            assert_eq!(inner.env.depth(), 3);
            Err("failed")
        })
    });
    assert!(result.is_err());
    assert_eq!(ev.env.depth(), 1);
}

#[test]
fn test_with_bindings_defines_locals() {
    let mut ev = Evaluator::new();
    let pattern = tern_patterns::Pattern::new(Expr::apply("f", [Expr::atom("x_")]), None);
    let bindings = pattern
        .match_structure(&Expr::apply("f", [Expr::integer(4)]))
        .unwrap();

    let seen = ev.with_bindings(false, &bindings, |scoped| scoped.env.get_variable("x"));
    assert_eq!(seen, Some(Expr::integer(4)));
    assert_eq!(ev.env.get_variable("x"), None);
}

#[test]
fn test_isolated_bindings_hide_caller_locals() {
    let mut ev = Evaluator::new();
    ev.env.define_local(Atom::new("y"), Expr::integer(1));
    let empty = tern_patterns::Bindings::new();

    let isolated = ev.with_bindings(false, &empty, |scoped| scoped.env.get_variable("y"));
    let inherited = ev.with_bindings(true, &empty, |scoped| scoped.env.get_variable("y"));
    assert_eq!(isolated, None);
    assert_eq!(inherited, Some(Expr::integer(1)));
}

#[test]
fn test_strategy_guard_restores_previous() {
    let mut ev = Evaluator::new();
    assert_eq!(ev.strategy_name(), "plain");

    ev.with_strategy(Box::new(TracedStrategy::all()), |traced| {
        assert_eq!(traced.strategy_name(), "traced");
        traced.with_strategy(Box::new(PlainStrategy), |plain| {
            assert_eq!(plain.strategy_name(), "plain");
        });
        assert_eq!(traced.strategy_name(), "traced");
    });

    assert_eq!(ev.strategy_name(), "plain");
}
