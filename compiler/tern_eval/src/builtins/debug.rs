//! Debugger and tracing built-ins.

use tern_ir::Expr;
use tern_patterns::{arg_type_error, EvalResult};

use super::Call;
use crate::debugger::ExprHooks;
use crate::strategy::TracedStrategy;
use crate::Evaluator;

/// `CustomEval(enter, leave, error, expr)`.
pub(super) fn custom_eval(ev: &mut Evaluator, call: Call) -> EvalResult {
    let hooks = ExprHooks::new(ev.arg(call, 1), ev.arg(call, 2), ev.arg(call, 3));
    let expr = ev.arg(call, 4);
    ev.custom_eval(&expr, Box::new(hooks))
}

pub(super) fn expression(ev: &mut Evaluator, _call: Call) -> EvalResult {
    ev.current_expression()
}

pub(super) fn result(ev: &mut Evaluator, _call: Call) -> EvalResult {
    ev.current_result()
}

pub(super) fn locals(ev: &mut Evaluator, _call: Call) -> EvalResult {
    ev.current_locals()
}

pub(super) fn stop(ev: &mut Evaluator, _call: Call) -> EvalResult {
    ev.request_stop()?;
    Ok(Expr::boolean(true))
}

/// Evaluate the operand; if it fails, print the stack at the failure point
/// before passing the error on.
pub(super) fn trace_stack(ev: &mut Evaluator, call: Call) -> EvalResult {
    let body = ev.arg(call, 1);
    match ev.eval(&body) {
        Ok(value) => Ok(value),
        Err(error) => {
            if let Some(backtrace) = &error.backtrace {
                ev.write_output(&backtrace.to_string())?;
            }
            Err(error)
        }
    }
}

/// Evaluate the operand with every dispatch traced.
pub(super) fn trace_exp(ev: &mut Evaluator, call: Call) -> EvalResult {
    let body = ev.arg(call, 1);
    ev.with_strategy(Box::new(TracedStrategy::all()), |traced| traced.eval(&body))
}

/// `TraceRule(f(args...), expr)`: trace only calls of `f` with that many
/// operands while evaluating `expr`.
pub(super) fn trace_rule(ev: &mut Evaluator, call: Call) -> EvalResult {
    let template = ev.arg(call, 1);
    let Some((symbol, arity)) = template
        .as_form()
        .and_then(|form| form.head_atom().map(|head| (head.clone(), form.arity())))
    else {
        return Err(arg_type_error(call.name(), 1, "a call template"));
    };
    let body = ev.arg(call, 2);
    let strategy = TracedStrategy::for_rule(symbol, arity);
    ev.with_strategy(Box::new(strategy), |traced| traced.eval(&body))
}
