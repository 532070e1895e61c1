//! Type predicates.

use tern_ir::Expr;
use tern_patterns::{arg_type_error, EvalResult};

use super::Call;
use crate::Evaluator;

pub(super) fn is_function(ev: &mut Evaluator, call: Call) -> EvalResult {
    Ok(Expr::boolean(ev.arg(call, 1).as_form().is_some()))
}

pub(super) fn is_atom(ev: &mut Evaluator, call: Call) -> EvalResult {
    Ok(Expr::boolean(ev.arg(call, 1).as_atom().is_some()))
}

fn number_check(ev: &Evaluator, call: Call, allow_fraction: bool) -> bool {
    ev.arg(call, 1)
        .as_atom()
        .is_some_and(|atom| ev.numbers().is_number(atom.text(), allow_fraction))
}

pub(super) fn is_number(ev: &mut Evaluator, call: Call) -> EvalResult {
    Ok(Expr::boolean(number_check(ev, call, true)))
}

pub(super) fn is_integer(ev: &mut Evaluator, call: Call) -> EvalResult {
    Ok(Expr::boolean(number_check(ev, call, false)))
}

pub(super) fn is_list(ev: &mut Evaluator, call: Call) -> EvalResult {
    Ok(Expr::boolean(ev.arg(call, 1).is_list()))
}

pub(super) fn is_string(ev: &mut Evaluator, call: Call) -> EvalResult {
    Ok(Expr::boolean(ev.arg(call, 1).is_string()))
}

/// `IsBound(x)` looks at the variable named by its (held) operand.
pub(super) fn is_bound(ev: &mut Evaluator, call: Call) -> EvalResult {
    let operand = ev.arg(call, 1);
    let Some(name) = operand.as_atom() else {
        return Err(arg_type_error(call.name(), 1, "a variable name"));
    };
    Ok(Expr::boolean(ev.env.is_bound(name.text())))
}

pub(super) fn is_generic(ev: &mut Evaluator, call: Call) -> EvalResult {
    Ok(Expr::boolean(ev.arg(call, 1).as_opaque().is_some()))
}
