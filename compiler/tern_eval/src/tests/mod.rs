//! End-to-end evaluator tests.
//!
//! Programs are written in prefix notation and read with
//! `tern_ir::sexpr`; each test runs them against a fresh evaluator whose
//! output goes to a shared buffer.

#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

mod debugger_tests;
mod dispatch_tests;
mod scenario_tests;

use tern_ir::Expr;

use crate::output::{OutputHandler, SharedBuffer};
use crate::{EvalErrorKind, EvalResult, Evaluator};

/// Read one expression.
pub(super) fn expr(source: &str) -> Expr {
    tern_ir::sexpr::read(source).unwrap()
}

/// Evaluator writing to a buffer the test can inspect.
pub(super) fn evaluator() -> (Evaluator, SharedBuffer) {
    let (handler, buffer) = OutputHandler::buffer();
    let ev = Evaluator::builder().output(handler).build();
    (ev, buffer)
}

/// Evaluate every expression in `source`, returning the last result.
pub(super) fn run(ev: &mut Evaluator, source: &str) -> EvalResult {
    let program = tern_ir::sexpr::read_all(source).unwrap();
    ev.eval_all(&program)
}

/// Evaluate `source` and unwrap the result.
pub(super) fn value(ev: &mut Evaluator, source: &str) -> Expr {
    match run(ev, source) {
        Ok(value) => value,
        Err(error) => panic!("evaluating {source} failed: {error}"),
    }
}

/// Evaluate `source` and return the kind of the error it must raise.
pub(super) fn error_kind(ev: &mut Evaluator, source: &str) -> EvalErrorKind {
    match run(ev, source) {
        Ok(value) => panic!("evaluating {source} should fail, got {value}"),
        Err(error) => error.kind,
    }
}
