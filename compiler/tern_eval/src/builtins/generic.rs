//! Opaque objects: arrays and compiled patterns.

use tern_ir::{ArrayObject, Expr, OpaqueRef, MAX_ARRAY_SIZE};
use tern_patterns::{arg_range_error, arg_type_error, CompiledPattern, EvalError, EvalResult, Pattern};

use super::Call;
use crate::Evaluator;

fn object_arg(ev: &Evaluator, call: Call, index: usize) -> Result<OpaqueRef, EvalError> {
    ev.arg(call, index)
        .as_opaque()
        .cloned()
        .ok_or_else(|| arg_type_error(call.name(), index, "an object"))
}

pub(super) fn type_name(ev: &mut Evaluator, call: Call) -> EvalResult {
    let object = object_arg(ev, call, 1)?;
    Ok(Expr::string(object.type_name()))
}

pub(super) fn array_create(ev: &mut Evaluator, call: Call) -> EvalResult {
    let size = ev.count_arg(call, 1)?;
    let init = ev.arg(call, 2);
    let array = ArrayObject::try_new(size, &init).ok_or_else(|| {
        arg_range_error(
            call.name(),
            1,
            format!("array size {size} exceeds the limit of {MAX_ARRAY_SIZE}"),
        )
    })?;
    Ok(Expr::opaque(array))
}

pub(super) fn array_size(ev: &mut Evaluator, call: Call) -> EvalResult {
    let object = object_arg(ev, call, 1)?;
    let size = object
        .size()
        .ok_or_else(|| arg_type_error(call.name(), 1, "a sized object"))?;
    Ok(Expr::atom(&size.to_string()))
}

pub(super) fn array_get(ev: &mut Evaluator, call: Call) -> EvalResult {
    let object = object_arg(ev, call, 1)?;
    let index = ev.index_arg(call, 2)?;
    object
        .get(index)
        .ok_or_else(|| arg_range_error(call.name(), 2, format!("index {index} out of range")))
}

pub(super) fn array_set(ev: &mut Evaluator, call: Call) -> EvalResult {
    let object = object_arg(ev, call, 1)?;
    let index = ev.index_arg(call, 2)?;
    if object.set(index, ev.arg(call, 3)) {
        Ok(Expr::boolean(true))
    } else {
        Err(arg_range_error(call.name(), 2, format!("index {index} out of range")))
    }
}

/// `PatternCreate(pattern, guard)`, both taken as written. A `True` guard
/// means no guard.
pub(super) fn pattern_create(ev: &mut Evaluator, call: Call) -> EvalResult {
    let source = ev.arg(call, 1);
    let guard = ev.arg(call, 2);
    let guard = (!guard.is_true()).then_some(guard);
    Ok(Expr::opaque(CompiledPattern::new(Pattern::new(source, guard))))
}

pub(super) fn pattern_matches(ev: &mut Evaluator, call: Call) -> EvalResult {
    let object = object_arg(ev, call, 1)?;
    let Some(compiled) = object.downcast_ref::<CompiledPattern>() else {
        return Err(arg_type_error(call.name(), 1, "a pattern"));
    };
    let candidate = ev.arg(call, 2);
    let matched = compiled.matches(&candidate, ev)?;
    Ok(Expr::boolean(matched.is_some()))
}
