//! Shared helpers for pattern and rule tests.

#![allow(clippy::unwrap_used, reason = "test helpers panic on malformed fixtures")]

use tern_ir::Expr;

use crate::errors::EvalError;
use crate::pattern::{Bindings, GuardExecutor};

/// Read a fixture in prefix notation.
pub fn expr(source: &str) -> Expr {
    tern_ir::sexpr::read(source).unwrap()
}

/// Guard executor that understands `(IsZero v)`, `True` and `False`.
#[derive(Default)]
pub struct ZeroGuard {
    pub calls: usize,
}

impl GuardExecutor for ZeroGuard {
    fn eval_guard(&mut self, guard: &Expr, bindings: &Bindings) -> Result<bool, EvalError> {
        self.calls += 1;
        if guard.is_true() || guard.is_false() {
            return Ok(guard.is_true());
        }
        let form = guard
            .as_form()
            .ok_or_else(|| EvalError::new("unsupported guard"))?;
        let variable = form
            .operand(1)
            .and_then(Expr::as_atom)
            .ok_or_else(|| EvalError::new("guard needs a variable"))?;
        Ok(bindings.get(variable.text()) == Some(&Expr::atom("0")))
    }
}
