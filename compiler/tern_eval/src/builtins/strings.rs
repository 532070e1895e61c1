//! String built-ins. Positions count characters from 1.

use tern_ir::{Atom, Expr};
use tern_patterns::{arg_range_error, EvalResult};

use super::Call;
use crate::Evaluator;

/// `Atom("abc")` is the symbol `abc`.
pub(super) fn atomize(ev: &mut Evaluator, call: Call) -> EvalResult {
    let contents = ev.string_arg(call, 1)?;
    Ok(Expr::Atom(Atom::new(&contents)))
}

/// `String(abc)` is the string `"abc"`; strings are returned unchanged.
pub(super) fn stringify(ev: &mut Evaluator, call: Call) -> EvalResult {
    let atom = ev.atom_arg(call, 1)?;
    Ok(Expr::Atom(atom.stringified()))
}

pub(super) fn concat_strings(ev: &mut Evaluator, call: Call) -> EvalResult {
    let mut joined = String::new();
    for index in 1..=call.arity() {
        joined.push_str(&ev.string_arg(call, index)?);
    }
    Ok(Expr::string(&joined))
}

/// `StringMid'Get(from, count, string)`.
pub(super) fn mid_get(ev: &mut Evaluator, call: Call) -> EvalResult {
    let from = ev.index_arg(call, 1)?;
    let count = ev.count_arg(call, 2)?;
    let text = ev.string_arg(call, 3)?;
    let length = text.chars().count();
    if from - 1 + count > length {
        return Err(arg_range_error(
            call.name(),
            2,
            format!("{count} characters from {from} exceed length {length}"),
        ));
    }
    let slice: String = text.chars().skip(from - 1).take(count).collect();
    Ok(Expr::string(&slice))
}

/// `StringMid'Set(from, replacement, string)` overwrites characters starting
/// at `from`; the replacement must fit inside the string.
pub(super) fn mid_set(ev: &mut Evaluator, call: Call) -> EvalResult {
    let from = ev.index_arg(call, 1)?;
    let replacement = ev.string_arg(call, 2)?;
    let text = ev.string_arg(call, 3)?;
    let length = text.chars().count();
    let width = replacement.chars().count();
    if from - 1 + width > length {
        return Err(arg_range_error(
            call.name(),
            2,
            format!("replacement of {width} characters at {from} exceeds length {length}"),
        ));
    }
    let result: String = text
        .chars()
        .take(from - 1)
        .chain(replacement.chars())
        .chain(text.chars().skip(from - 1 + width))
        .collect();
    Ok(Expr::string(&result))
}
