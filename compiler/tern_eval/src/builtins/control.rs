//! Evaluation control, variables, logic, comparison and arithmetic.

use std::cmp::Ordering;

use tern_ir::{Atom, Expr, FALSE, TRUE};
use tern_patterns::{arg_range_error, arg_type_error, user_raised, EvalError, EvalResult};

use super::Call;
use crate::Evaluator;

fn yes() -> Expr {
    Expr::atom(TRUE)
}

pub(super) fn hold(ev: &mut Evaluator, call: Call) -> EvalResult {
    Ok(ev.arg(call, 1))
}

pub(super) fn eval(ev: &mut Evaluator, call: Call) -> EvalResult {
    ev.eval_arg(call, 1)
}

/// Operand `index` as a variable name; strings and numbers are rejected.
fn variable_arg(ev: &Evaluator, call: Call, index: usize) -> Result<Atom, EvalError> {
    let atom = ev.atom_arg(call, index)?;
    if atom.is_string() || ev.numbers().is_number(atom.text(), true) {
        return Err(arg_type_error(call.name(), index, "a variable name"));
    }
    Ok(atom)
}

pub(super) fn set(ev: &mut Evaluator, call: Call) -> EvalResult {
    let name = variable_arg(ev, call, 1)?;
    let value = ev.eval_arg(call, 2)?;
    ev.env.set_variable(&name, value);
    Ok(yes())
}

/// `MacroSet(target, value)`: the target operand is evaluated to obtain the
/// variable name.
pub(super) fn macro_set(ev: &mut Evaluator, call: Call) -> EvalResult {
    let target = ev.eval_arg(call, 1)?;
    let name = match target.as_atom() {
        Some(atom) if atom.is_string() => atom.unstringified(),
        Some(atom) => atom.clone(),
        None => return Err(arg_type_error(call.name(), 1, "a variable name")),
    };
    let value = ev.eval_arg(call, 2)?;
    ev.env.set_variable(&name, value);
    Ok(yes())
}

pub(super) fn clear(ev: &mut Evaluator, call: Call) -> EvalResult {
    for index in 1..=call.arity() {
        let name = variable_arg(ev, call, index)?;
        ev.env.unset_variable(name.text());
    }
    Ok(yes())
}

/// `Local(names...)` and `MacroLocal(names...)` declare unbound locals in the
/// current frame.
pub(super) fn local(ev: &mut Evaluator, call: Call) -> EvalResult {
    for index in 1..=call.arity() {
        let name = variable_arg(ev, call, index)?;
        ev.env.bind_local(name);
    }
    Ok(yes())
}

/// `Prog(statements...)`: evaluate in a frame that inherits the caller's
/// locals; the value is the last statement's.
pub(super) fn prog(ev: &mut Evaluator, call: Call) -> EvalResult {
    let statements: Vec<Expr> = (1..=call.arity()).map(|i| ev.arg(call, i)).collect();
    ev.with_frame(true, |scoped| {
        let mut last = yes();
        for statement in &statements {
            last = scoped.eval(statement)?;
        }
        Ok(last)
    })
}

fn truth(call: Call, index: usize, value: &Expr) -> Result<bool, EvalError> {
    if value.is_true() {
        Ok(true)
    } else if value.is_false() {
        Ok(false)
    } else {
        Err(arg_type_error(call.name(), index, "True or False"))
    }
}

pub(super) fn while_loop(ev: &mut Evaluator, call: Call) -> EvalResult {
    let predicate = ev.arg(call, 1);
    let body = ev.arg(call, 2);
    loop {
        let holds = ev.eval(&predicate)?;
        if !truth(call, 1, &holds)? {
            return Ok(yes());
        }
        ev.eval(&body)?;
    }
}

/// `If(predicate, then)` or `If(predicate, then, else)`. A false predicate
/// without an else branch yields `False`.
pub(super) fn if_then(ev: &mut Evaluator, call: Call) -> EvalResult {
    let predicate = ev.eval_arg(call, 1)?;
    if truth(call, 1, &predicate)? {
        ev.eval_arg(call, 2)
    } else if call.arity() == 3 {
        ev.eval_arg(call, 3)
    } else {
        Ok(Expr::atom(FALSE))
    }
}

/// `Check(predicate, message)` raises `UserRaised(message)` unless the
/// predicate evaluates to `True`.
pub(super) fn check(ev: &mut Evaluator, call: Call) -> EvalResult {
    let predicate = ev.eval_arg(call, 1)?;
    if predicate.is_true() {
        return Ok(predicate);
    }
    let message = ev.eval_arg(call, 2)?;
    let text = match message.as_atom() {
        Some(atom) if atom.is_string() => atom.unquoted().to_string(),
        _ => return Err(arg_type_error(call.name(), 2, "a string")),
    };
    Err(user_raised(text))
}

pub(super) fn trap_error(ev: &mut Evaluator, call: Call) -> EvalResult {
    let body = ev.arg(call, 1);
    let recovery = ev.arg(call, 2);
    ev.trap(&body, &recovery)
}

pub(super) fn get_core_error(ev: &mut Evaluator, _call: Call) -> EvalResult {
    Ok(Expr::string(ev.last_error().unwrap_or_default()))
}

pub(super) fn max_eval_depth(ev: &mut Evaluator, call: Call) -> EvalResult {
    let depth = ev.count_arg(call, 1)?;
    if depth == 0 {
        return Err(arg_range_error(call.name(), 1, "depth must be positive"));
    }
    ev.config_mut().max_eval_depth = depth;
    Ok(yes())
}

pub(super) fn equals(ev: &mut Evaluator, call: Call) -> EvalResult {
    Ok(Expr::boolean(ev.arg(call, 1) == ev.arg(call, 2)))
}

/// Numeric order when both operands are numbers, text order otherwise.
fn compare(ev: &Evaluator, call: Call) -> Result<Ordering, EvalError> {
    let left = ev.atom_arg(call, 1)?;
    let right = ev.atom_arg(call, 2)?;
    let numbers = ev.numbers();
    if numbers.is_number(left.text(), true) && numbers.is_number(right.text(), true) {
        if let Some(order) = numbers.compare(left.text(), right.text()) {
            return Ok(order);
        }
    }
    Ok(left.unquoted().cmp(right.unquoted()))
}

pub(super) fn less_than(ev: &mut Evaluator, call: Call) -> EvalResult {
    Ok(Expr::boolean(compare(ev, call)? == Ordering::Less))
}

pub(super) fn greater_than(ev: &mut Evaluator, call: Call) -> EvalResult {
    Ok(Expr::boolean(compare(ev, call)? == Ordering::Greater))
}

/// Undecided operands are returned as `Not(x)`.
pub(super) fn not(ev: &mut Evaluator, call: Call) -> EvalResult {
    let value = ev.arg(call, 1);
    if value.is_true() {
        Ok(Expr::atom(FALSE))
    } else if value.is_false() {
        Ok(yes())
    } else {
        Ok(Expr::apply(call.name(), [value]))
    }
}

/// Shared body of `And` and `Or`: operands are evaluated left to right and
/// `decisive` short-circuits. Operands that are neither `True` nor `False`
/// are kept; a single one is returned as is, several are rebuilt into a
/// residual call.
fn lazy_connective(ev: &mut Evaluator, call: Call, decisive: bool) -> EvalResult {
    let mut undecided = Vec::new();
    for index in 1..=call.arity() {
        let value = ev.eval_arg(call, index)?;
        let decided = if value.is_true() {
            Some(true)
        } else if value.is_false() {
            Some(false)
        } else {
            None
        };
        match decided {
            Some(truth) if truth == decisive => return Ok(Expr::boolean(decisive)),
            Some(_) => {}
            None => undecided.push(value),
        }
    }
    match undecided.len() {
        0 => Ok(Expr::boolean(!decisive)),
        1 => Ok(undecided.swap_remove(0)),
        _ => Ok(Expr::apply(call.name(), undecided)),
    }
}

pub(super) fn and(ev: &mut Evaluator, call: Call) -> EvalResult {
    lazy_connective(ev, call, false)
}

pub(super) fn or(ev: &mut Evaluator, call: Call) -> EvalResult {
    lazy_connective(ev, call, true)
}

fn arithmetic(
    ev: &Evaluator,
    call: Call,
    op: impl FnOnce(&dyn tern_ir::NumericEngine, &str, &str) -> Option<String>,
) -> EvalResult {
    let left = ev.number_arg(call, 1)?;
    let right = ev.number_arg(call, 2)?;
    op(ev.numbers(), left.text(), right.text())
        .map(|text| Expr::atom(&text))
        .ok_or_else(|| arg_range_error(call.name(), 2, "result out of range"))
}

pub(super) fn math_add(ev: &mut Evaluator, call: Call) -> EvalResult {
    arithmetic(ev, call, |n, a, b| n.add(a, b))
}

pub(super) fn math_subtract(ev: &mut Evaluator, call: Call) -> EvalResult {
    arithmetic(ev, call, |n, a, b| n.subtract(a, b))
}

pub(super) fn math_multiply(ev: &mut Evaluator, call: Call) -> EvalResult {
    arithmetic(ev, call, |n, a, b| n.multiply(a, b))
}
