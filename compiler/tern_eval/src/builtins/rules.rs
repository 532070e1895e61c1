//! Rule-database built-ins.
//!
//! The symbol operand of every defining built-in is taken as written. For
//! `Rule`/`RulePattern` the arity, precedence, predicate (or pattern) and
//! body operands are evaluated; the `MacroRule*` variants take predicate
//! and body as written.
//!
//! `RuleBase` and `MacroRuleBase` declare the same kind of entry. Entries
//! that hold every argument and share the caller's locals come from
//! `DefMacroRuleBase`.

use tern_ir::{Atom, Expr, Fixity, MAX_PRECEDENCE};
use tern_patterns::{
    arg_range_error, arg_type_error, classify, unknown_entry, CompiledPattern, EntryFlags,
    EvalError, EvalResult, Pattern, PatternAtom, Rule,
};

use super::Call;
use crate::Evaluator;

fn yes() -> Expr {
    Expr::boolean(true)
}

/// Parameter names from a `List(a, b, ...)` operand.
fn params_arg(ev: &Evaluator, call: Call, index: usize) -> Result<Vec<Atom>, EvalError> {
    let list = ev.list_arg(call, index)?;
    list.operands()
        .iter()
        .map(|param| match param.as_atom() {
            Some(atom) if atom.is_string() => Ok(atom.unstringified()),
            Some(atom) => Ok(atom.clone()),
            None => Err(arg_type_error(call.name(), index, "a list of parameter names")),
        })
        .collect()
}

fn declare(ev: &mut Evaluator, call: Call, flags: EntryFlags) -> EvalResult {
    let symbol = ev.symbol_arg(call, 1)?;
    let params = params_arg(ev, call, 2)?;
    if flags.contains(EntryFlags::LISTED) {
        ev.operators
            .set_operator(Fixity::Bodied, MAX_PRECEDENCE, symbol.clone());
    }
    ev.rules.declare(symbol, params, flags);
    Ok(yes())
}

pub(super) fn rule_base(ev: &mut Evaluator, call: Call) -> EvalResult {
    declare(ev, call, EntryFlags::empty())
}

pub(super) fn rule_base_listed(ev: &mut Evaluator, call: Call) -> EvalResult {
    declare(ev, call, EntryFlags::LISTED)
}

pub(super) fn def_macro_rule_base(ev: &mut Evaluator, call: Call) -> EvalResult {
    declare(ev, call, EntryFlags::MACRO)
}

pub(super) fn def_macro_rule_base_listed(ev: &mut Evaluator, call: Call) -> EvalResult {
    declare(ev, call, EntryFlags::MACRO | EntryFlags::LISTED)
}

pub(super) fn hold_arg(ev: &mut Evaluator, call: Call) -> EvalResult {
    let symbol = ev.symbol_arg(call, 1)?;
    let param = ev.symbol_arg(call, 2)?;
    if ev.rules.hold_arg(symbol.text(), param.text()) {
        Ok(yes())
    } else {
        Err(arg_range_error(
            call.name(),
            2,
            format!("no rule base of {symbol} has a parameter {param}"),
        ))
    }
}

/// Evaluate operand `index` to an integer.
fn evaluated_integer(ev: &mut Evaluator, call: Call, index: usize) -> Result<i64, EvalError> {
    let value = ev.eval_arg(call, index)?;
    value
        .as_atom()
        .and_then(|atom| ev.numbers().to_index(atom.text()))
        .ok_or_else(|| arg_type_error(call.name(), index, "an integer"))
}

fn arity_operand(ev: &mut Evaluator, call: Call) -> Result<usize, EvalError> {
    let arity = evaluated_integer(ev, call, 2)?;
    usize::try_from(arity).map_err(|_| arg_range_error(call.name(), 2, "arity is negative"))
}

fn precedence_operand(ev: &mut Evaluator, call: Call, index: usize) -> Result<i32, EvalError> {
    let precedence = evaluated_integer(ev, call, index)?;
    i32::try_from(precedence)
        .map_err(|_| arg_range_error(call.name(), index, "precedence out of range"))
}

/// Operand `index` as written (macro rules) or evaluated (plain rules).
fn rule_operand(ev: &mut Evaluator, call: Call, index: usize, is_macro: bool) -> EvalResult {
    if is_macro {
        Ok(ev.arg(call, index))
    } else {
        ev.eval_arg(call, index)
    }
}

fn define_rule(ev: &mut Evaluator, call: Call, is_macro: bool) -> EvalResult {
    let symbol = ev.symbol_arg(call, 1)?;
    let arity = arity_operand(ev, call)?;
    let precedence = precedence_operand(ev, call, 3)?;
    let predicate = rule_operand(ev, call, 4, is_macro)?;
    let body = rule_operand(ev, call, 5, is_macro)?;

    let params = ev
        .rules
        .lookup(symbol.text(), arity)
        .map(|entry| entry.params().to_vec())
        .ok_or_else(|| unknown_entry(symbol.text(), arity))?;
    let guard = (!predicate.is_true()).then_some(predicate);
    let pattern = Pattern::for_parameters(&symbol, &params, guard);
    ev.rules
        .insert(symbol.text(), arity, Rule::new(pattern, body, precedence))?;
    Ok(yes())
}

pub(super) fn rule(ev: &mut Evaluator, call: Call) -> EvalResult {
    define_rule(ev, call, false)
}

pub(super) fn macro_rule(ev: &mut Evaluator, call: Call) -> EvalResult {
    define_rule(ev, call, true)
}

/// A pattern operand: a compiled pattern object, or a pattern expression.
fn pattern_from(call: Call, value: &Expr) -> Result<Pattern, EvalError> {
    if let Some(compiled) = value
        .as_opaque()
        .and_then(|object| object.downcast_ref::<CompiledPattern>())
    {
        return Ok(compiled.pattern().clone());
    }
    match value {
        Expr::Form(_) => Ok(Pattern::new(value.clone(), None)),
        _ => Err(arg_type_error(call.name(), 4, "a pattern")),
    }
}

fn define_pattern_rule(ev: &mut Evaluator, call: Call, is_macro: bool) -> EvalResult {
    let symbol = ev.symbol_arg(call, 1)?;
    let arity = arity_operand(ev, call)?;
    let precedence = precedence_operand(ev, call, 3)?;
    let pattern = rule_operand(ev, call, 4, is_macro)?;
    let body = rule_operand(ev, call, 5, is_macro)?;

    let pattern = pattern_from(call, &pattern)?;
    check_pattern_shape(call, &pattern, &symbol, arity)?;
    ev.rules
        .insert(symbol.text(), arity, Rule::new(pattern, body, precedence))?;
    Ok(yes())
}

/// A pattern for `(symbol, arity)` must be a form of that arity whose head
/// is `symbol` or a variable; anything else could never be tried.
fn check_pattern_shape(
    call: Call,
    pattern: &Pattern,
    symbol: &Atom,
    arity: usize,
) -> Result<(), EvalError> {
    let fits = pattern.source().as_form().is_some_and(|form| {
        let head_fits = form.head_atom().is_some_and(|head| {
            head.text() == symbol.text() || !matches!(classify(head), PatternAtom::Literal)
        });
        head_fits && form.arity() == arity
    });
    if fits {
        Ok(())
    } else {
        Err(arg_range_error(
            call.name(),
            4,
            format!("pattern {} can never match {symbol}/{arity}", pattern.source()),
        ))
    }
}

pub(super) fn rule_pattern(ev: &mut Evaluator, call: Call) -> EvalResult {
    define_pattern_rule(ev, call, false)
}

pub(super) fn macro_rule_pattern(ev: &mut Evaluator, call: Call) -> EvalResult {
    define_pattern_rule(ev, call, true)
}

/// `Retract(sym, arity)` drops the whole entry; `Retract(sym, arity, p)`
/// drops the earliest-inserted rule of precedence `p`. Yields whether
/// anything was removed.
pub(super) fn retract(ev: &mut Evaluator, call: Call) -> EvalResult {
    let symbol = ev.symbol_arg(call, 1)?;
    let arity = arity_operand(ev, call)?;
    let removed = if call.arity() == 3 {
        let precedence = precedence_operand(ev, call, 3)?;
        ev.rules
            .retract_where(symbol.text(), arity, |rule| rule.precedence == precedence)
            .is_some()
    } else {
        ev.rules.retract(symbol.text(), arity)
    };
    Ok(Expr::boolean(removed))
}

pub(super) fn fence(ev: &mut Evaluator, call: Call) -> EvalResult {
    let symbol = ev.symbol_arg(call, 1)?;
    let arity = arity_operand(ev, call)?;
    ev.rules.fence(symbol.text(), arity)?;
    Ok(yes())
}

/// `UnFence(sym, arity)`: bodies of the entry see their caller's locals.
pub(super) fn unfence(ev: &mut Evaluator, call: Call) -> EvalResult {
    let symbol = ev.symbol_arg(call, 1)?;
    let arity = arity_operand(ev, call)?;
    ev.rules.unfence(symbol.text(), arity)?;
    Ok(yes())
}

pub(super) fn rule_base_defined(ev: &mut Evaluator, call: Call) -> EvalResult {
    let symbol = ev.symbol_arg(call, 1)?;
    let arity = arity_operand(ev, call)?;
    Ok(Expr::boolean(ev.rules.lookup(symbol.text(), arity).is_some()))
}

pub(super) fn rule_base_arg_list(ev: &mut Evaluator, call: Call) -> EvalResult {
    let symbol = ev.symbol_arg(call, 1)?;
    let arity = arity_operand(ev, call)?;
    let entry = ev
        .rules
        .lookup(symbol.text(), arity)
        .ok_or_else(|| unknown_entry(symbol.text(), arity))?;
    Ok(Expr::list(entry.params().iter().cloned().map(Expr::Atom)))
}
