//! List and form manipulation.
//!
//! The plain operations return new spines and never touch their input. The
//! `Destructive*` variants move the operand off the stack and edit it
//! through a `UniqueForm`, which reuses the spine in place when no other
//! handle to it exists and copies it otherwise.

use tern_ir::{Expr, ExprError, Form, UniqueForm, LIST};
use tern_patterns::{arg_range_error, arg_type_error, EvalError, EvalResult};

use super::Call;
use crate::Evaluator;

fn range_error(call: Call, index: usize, error: &ExprError) -> EvalError {
    arg_range_error(call.name(), index, error.to_string())
}

pub(super) fn list(ev: &mut Evaluator, call: Call) -> EvalResult {
    Ok(Expr::list((1..=call.arity()).map(|i| ev.arg(call, i))))
}

pub(super) fn head(ev: &mut Evaluator, call: Call) -> EvalResult {
    let form = ev.form_arg(call, 1)?;
    form.operand(1)
        .cloned()
        .ok_or_else(|| arg_range_error(call.name(), 1, "expression has no operands"))
}

pub(super) fn nth(ev: &mut Evaluator, call: Call) -> EvalResult {
    let form = ev.form_arg(call, 1)?;
    let index = ev.index_arg(call, 2)?;
    form.operand(index).cloned().ok_or_else(|| {
        arg_range_error(
            call.name(),
            2,
            format!("index {index} out of range for {} operands", form.arity()),
        )
    })
}

/// All operands but the first, under the same head.
pub(super) fn tail(ev: &mut Evaluator, call: Call) -> EvalResult {
    let form = ev.form_arg(call, 1)?;
    form.deleted(1)
        .map(Expr::Form)
        .map_err(|e| range_error(call, 1, &e))
}

/// Operand count of a form, character count of a string, or size of an
/// opaque value.
pub(super) fn length(ev: &mut Evaluator, call: Call) -> EvalResult {
    let count = match &ev.arg(call, 1) {
        Expr::Form(form) => form.arity(),
        Expr::Atom(atom) if atom.is_string() => atom.unquoted().chars().count(),
        Expr::Opaque(value) => value
            .size()
            .ok_or_else(|| arg_type_error(call.name(), 1, "a sized object"))?,
        Expr::Atom(_) => return Err(arg_type_error(call.name(), 1, "a form, string or object")),
    };
    Ok(Expr::atom(&count.to_string()))
}

/// `UnList(List(f, a, b))` is `f(a, b)`.
pub(super) fn un_list(ev: &mut Evaluator, call: Call) -> EvalResult {
    let list = ev.list_arg(call, 1)?;
    Ok(Expr::form(list.operands().to_vec()))
}

/// `Listify(f(a, b))` is `List(f, a, b)`.
pub(super) fn listify(ev: &mut Evaluator, call: Call) -> EvalResult {
    let form = ev.form_arg(call, 1)?;
    Ok(Expr::list(form.elements().iter().cloned()))
}

pub(super) fn concat(ev: &mut Evaluator, call: Call) -> EvalResult {
    let mut joined = UniqueForm::new(vec![Expr::atom(LIST)]);
    for index in 1..=call.arity() {
        let list = ev.list_arg(call, index)?;
        for item in list.operands() {
            joined.push(item.clone());
        }
    }
    Ok(joined.into_expr())
}

pub(super) fn flat_copy(ev: &mut Evaluator, call: Call) -> EvalResult {
    Ok(Expr::Form(ev.form_arg(call, 1)?.flat_copy()))
}

pub(super) fn delete(ev: &mut Evaluator, call: Call) -> EvalResult {
    let form = ev.form_arg(call, 1)?;
    let index = ev.index_arg(call, 2)?;
    form.deleted(index)
        .map(Expr::Form)
        .map_err(|e| range_error(call, 2, &e))
}

pub(super) fn insert(ev: &mut Evaluator, call: Call) -> EvalResult {
    let form = ev.form_arg(call, 1)?;
    let index = ev.index_arg(call, 2)?;
    form.inserted(index, ev.arg(call, 3))
        .map(Expr::Form)
        .map_err(|e| range_error(call, 2, &e))
}

pub(super) fn replace(ev: &mut Evaluator, call: Call) -> EvalResult {
    let form = ev.form_arg(call, 1)?;
    let index = ev.index_arg(call, 2)?;
    form.replaced(index, ev.arg(call, 3))
        .map(Expr::Form)
        .map_err(|e| range_error(call, 2, &e))
}

/// Validate operand 1 and move it off the stack for editing.
fn take_unique(ev: &mut Evaluator, call: Call) -> Result<UniqueForm, EvalError> {
    ev.form_arg(call, 1)?;
    match ev.take_arg(call, 1) {
        Expr::Form(form) => Ok(Form::into_unique(form)),
        _ => Err(arg_type_error(call.name(), 1, "a compound expression")),
    }
}

pub(super) fn destructive_delete(ev: &mut Evaluator, call: Call) -> EvalResult {
    let index = ev.index_arg(call, 2)?;
    let mut unique = take_unique(ev, call)?;
    unique.delete(index).map_err(|e| range_error(call, 2, &e))?;
    Ok(unique.into_expr())
}

pub(super) fn destructive_insert(ev: &mut Evaluator, call: Call) -> EvalResult {
    let index = ev.index_arg(call, 2)?;
    let value = ev.arg(call, 3);
    let mut unique = take_unique(ev, call)?;
    unique.insert(index, value).map_err(|e| range_error(call, 2, &e))?;
    Ok(unique.into_expr())
}

pub(super) fn destructive_replace(ev: &mut Evaluator, call: Call) -> EvalResult {
    let index = ev.index_arg(call, 2)?;
    let value = ev.arg(call, 3);
    let mut unique = take_unique(ev, call)?;
    unique.replace(index, value).map_err(|e| range_error(call, 2, &e))?;
    Ok(unique.into_expr())
}

pub(super) fn destructive_reverse(ev: &mut Evaluator, call: Call) -> EvalResult {
    let mut unique = take_unique(ev, call)?;
    unique.reverse_operands();
    Ok(unique.into_expr())
}

/// Head symbol of a form as a string, or `""` for anything else.
pub(super) fn type_of(ev: &mut Evaluator, call: Call) -> EvalResult {
    let name = ev.arg(call, 1).head_name().unwrap_or_default().to_string();
    Ok(Expr::string(&name))
}
