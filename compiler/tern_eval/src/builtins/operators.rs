//! Operator registry built-ins.

use tern_ir::{Atom, Expr, Fixity, MAX_PRECEDENCE};
use tern_patterns::{arg_range_error, not_an_operator, EvalError, EvalResult};

use super::Call;
use crate::Evaluator;

fn precedence_arg(ev: &Evaluator, call: Call, index: usize) -> Result<i32, EvalError> {
    let value = ev.integer_arg(call, index)?;
    match i32::try_from(value) {
        Ok(precedence) if (0..=MAX_PRECEDENCE).contains(&precedence) => Ok(precedence),
        _ => Err(arg_range_error(
            call.name(),
            index,
            format!("precedence {value} outside 0..={MAX_PRECEDENCE}"),
        )),
    }
}

fn define(ev: &mut Evaluator, call: Call, fixity: Fixity) -> EvalResult {
    let symbol = ev.symbol_arg(call, 1)?;
    let precedence = if call.arity() >= 2 {
        precedence_arg(ev, call, 2)?
    } else {
        0
    };
    ev.operators.set_operator(fixity, precedence, symbol);
    Ok(Expr::boolean(true))
}

pub(super) fn infix(ev: &mut Evaluator, call: Call) -> EvalResult {
    define(ev, call, Fixity::Infix)
}

pub(super) fn prefix(ev: &mut Evaluator, call: Call) -> EvalResult {
    define(ev, call, Fixity::Prefix)
}

pub(super) fn postfix(ev: &mut Evaluator, call: Call) -> EvalResult {
    define(ev, call, Fixity::Postfix)
}

pub(super) fn bodied(ev: &mut Evaluator, call: Call) -> EvalResult {
    define(ev, call, Fixity::Bodied)
}

fn require(done: bool, symbol: &Atom) -> EvalResult {
    if done {
        Ok(Expr::boolean(true))
    } else {
        Err(not_an_operator(symbol.text()))
    }
}

pub(super) fn right_associative(ev: &mut Evaluator, call: Call) -> EvalResult {
    let symbol = ev.symbol_arg(call, 1)?;
    let done = ev.operators.set_right_associative(symbol.text());
    require(done, &symbol)
}

pub(super) fn left_precedence(ev: &mut Evaluator, call: Call) -> EvalResult {
    let symbol = ev.symbol_arg(call, 1)?;
    let precedence = precedence_arg(ev, call, 2)?;
    let done = ev.operators.set_left_precedence(symbol.text(), precedence);
    require(done, &symbol)
}

pub(super) fn right_precedence(ev: &mut Evaluator, call: Call) -> EvalResult {
    let symbol = ev.symbol_arg(call, 1)?;
    let precedence = precedence_arg(ev, call, 2)?;
    let done = ev.operators.set_right_precedence(symbol.text(), precedence);
    require(done, &symbol)
}

fn is_fixity(ev: &Evaluator, call: Call, fixity: Fixity) -> EvalResult {
    let symbol = ev.symbol_arg(call, 1)?;
    Ok(Expr::boolean(ev.operators.is_operator(fixity, symbol.text())))
}

pub(super) fn is_infix(ev: &mut Evaluator, call: Call) -> EvalResult {
    is_fixity(ev, call, Fixity::Infix)
}

pub(super) fn is_prefix(ev: &mut Evaluator, call: Call) -> EvalResult {
    is_fixity(ev, call, Fixity::Prefix)
}

pub(super) fn is_postfix(ev: &mut Evaluator, call: Call) -> EvalResult {
    is_fixity(ev, call, Fixity::Postfix)
}

pub(super) fn is_bodied(ev: &mut Evaluator, call: Call) -> EvalResult {
    is_fixity(ev, call, Fixity::Bodied)
}

fn query(
    ev: &Evaluator,
    call: Call,
    lookup: impl FnOnce(&tern_ir::OperatorRegistries, &str) -> Option<i32>,
) -> EvalResult {
    let symbol = ev.symbol_arg(call, 1)?;
    lookup(&ev.operators, symbol.text())
        .map(|precedence| Expr::integer(i64::from(precedence)))
        .ok_or_else(|| not_an_operator(symbol.text()))
}

pub(super) fn op_precedence(ev: &mut Evaluator, call: Call) -> EvalResult {
    query(ev, call, tern_ir::OperatorRegistries::precedence)
}

pub(super) fn op_left_precedence(ev: &mut Evaluator, call: Call) -> EvalResult {
    query(ev, call, tern_ir::OperatorRegistries::left_precedence)
}

pub(super) fn op_right_precedence(ev: &mut Evaluator, call: Call) -> EvalResult {
    query(ev, call, tern_ir::OperatorRegistries::right_precedence)
}
