//! Debug sessions, tracing strategies and stack dumps.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::{error_kind, evaluator, expr, run, value};
use crate::{DebugCommand, DebugController, EvalError, EvalErrorKind, Evaluator};

/// Records every entered expression; optionally stops after `stop_after`.
struct Recorder {
    entered: Rc<RefCell<Vec<String>>>,
    stop_after: Option<usize>,
}

impl Recorder {
    fn new(stop_after: Option<usize>) -> (Self, Rc<RefCell<Vec<String>>>) {
        let entered = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder {
            entered: Rc::clone(&entered),
            stop_after,
        };
        (recorder, entered)
    }
}

impl DebugController for Recorder {
    fn on_enter(&mut self, host: &mut Evaluator) -> Result<DebugCommand, EvalError> {
        let current = host.current_expression()?;
        let mut entered = self.entered.borrow_mut();
        entered.push(current.to_string());
        if self.stop_after.is_some_and(|limit| entered.len() >= limit) {
            Ok(DebugCommand::Stop)
        } else {
            Ok(DebugCommand::Continue)
        }
    }
}

#[test]
fn controller_sees_every_dispatch() {
    let (mut ev, _) = evaluator();
    let (recorder, entered) = Recorder::new(None);

    let result = ev.custom_eval(&expr("(MathAdd 1 2)"), Box::new(recorder)).unwrap();

    assert_eq!(result, expr("3"));
    assert_eq!(*entered.borrow(), vec!["(MathAdd 1 2)", "1", "2"]);
    assert_eq!(ev.strategy_name(), "plain");
    assert!(ev.debug_session().is_none());
}

#[test]
fn stop_before_any_result_yields_the_expression() {
    let (mut ev, _) = evaluator();
    let (recorder, entered) = Recorder::new(Some(2));

    let result = ev.custom_eval(&expr("(MathAdd 1 2)"), Box::new(recorder)).unwrap();

    assert_eq!(result, expr("(MathAdd 1 2)"));
    assert_eq!(entered.borrow().len(), 2);
    assert!(ev.stack().is_empty());
    assert_eq!(ev.strategy_name(), "plain");
}

#[test]
fn stop_from_leave_hook_yields_last_result() {
    let (mut ev, _) = evaluator();
    let result = value(
        &mut ev,
        "(CustomEval Nothing (CustomEval'Stop) Nothing (MathAdd 1 2))",
    );
    assert_eq!(result, expr("1"));
}

#[test]
fn stop_is_not_trappable() {
    let (mut ev, _) = evaluator();
    let result = value(
        &mut ev,
        "(CustomEval Nothing (CustomEval'Stop) Nothing (TrapError (MathAdd 1 2) caught))",
    );
    assert_eq!(result, expr("1"));
}

#[test]
fn session_queries_need_a_session() {
    let (mut ev, _) = evaluator();
    for query in [
        "(CustomEval'Expression)",
        "(CustomEval'Result)",
        "(CustomEval'Locals)",
        "(CustomEval'Stop)",
    ] {
        assert_eq!(error_kind(&mut ev, query), EvalErrorKind::NotInDebugSession);
    }
}

#[test]
fn hooks_can_inspect_locals() {
    let (mut ev, _) = evaluator();
    value(
        &mut ev,
        r#"
        (CustomEval
            (If (Equals (CustomEval'Expression) (Hold marker)) (Set seen (CustomEval'Locals)))
            Nothing
            Nothing
            (Prog (Local b a) (Set a 1) marker))
        "#,
    );
    assert_eq!(value(&mut ev, "seen"), expr("(List a b)"));
}

#[test]
fn hooks_can_read_results() {
    let (mut ev, _) = evaluator();
    value(
        &mut ev,
        "(CustomEval Nothing (Set last (CustomEval'Result)) Nothing (MathMultiply 3 4))",
    );
    assert_eq!(value(&mut ev, "last"), expr("12"));
}

#[test]
fn trace_rule_reports_only_the_chosen_entry() {
    let (mut ev, buffer) = evaluator();
    value(
        &mut ev,
        r#"
        (RuleBase f (List x))
        (Rule f 1 5 True (Hold (MathAdd x 1)))
        "#,
    );

    assert_eq!(value(&mut ev, "(TraceRule (f x) (List (f 7)))"), expr("(List 8)"));
    assert_eq!(buffer.get_output(), "TrEnter((f 7))\nTrLeave((f 7), 8)\n");
    assert_eq!(ev.strategy_name(), "plain");
}

#[test]
fn trace_exp_reports_every_dispatch() {
    let (mut ev, buffer) = evaluator();
    assert_eq!(value(&mut ev, "(TraceExp (MathAdd 1 2))"), expr("3"));
    assert_eq!(
        buffer.get_output(),
        "TrEnter((MathAdd 1 2))\nTrEnter(1)\nTrLeave(1, 1)\nTrEnter(2)\nTrLeave(2, 2)\nTrLeave((MathAdd 1 2), 3)\n"
    );
}

#[test]
fn trace_exp_reports_errors() {
    let (mut ev, buffer) = evaluator();
    assert!(run(&mut ev, r#"(TraceExp (Check False "boom"))"#).is_err());
    let output = buffer.get_output();
    assert!(output.contains("TrError((Check False \"boom\"), boom)"), "{output}");
    assert_eq!(ev.strategy_name(), "plain");
}

#[test]
fn trace_stack_prints_backtrace_and_rethrows() {
    let (mut ev, buffer) = evaluator();
    let kind = error_kind(&mut ev, "(TraceStack (List (Nth (List a) 3)))");
    assert!(matches!(kind, EvalErrorKind::ArgRangeError { .. }));

    let output = buffer.get_output();
    assert!(output.starts_with("stack backtrace:"), "{output}");
    assert!(output.contains("Nth/2"), "{output}");
}

#[test]
fn nested_sessions_restore_outer_session() {
    let (mut ev, _) = evaluator();
    let (outer, outer_entered) = Recorder::new(None);
    ev.start_debugging(Box::new(outer));
    assert_eq!(ev.strategy_name(), "debug");

    let (inner, inner_entered) = Recorder::new(None);
    ev.custom_eval(&expr("(List a)"), Box::new(inner)).unwrap();
    assert_eq!(ev.strategy_name(), "debug");
    assert_eq!(*inner_entered.borrow(), vec!["(List a)", "a"]);

    ev.finish_debugging();
    assert_eq!(ev.strategy_name(), "plain");
    assert!(outer_entered.borrow().is_empty());
}
