//! Pluggable evaluation strategies.
//!
//! The evaluator reports every dispatch to its active strategy: once before
//! it dispatches an expression, and once afterwards with either the result
//! or the error. The plain strategy ignores the events and is skipped
//! entirely on the hot path. The traced strategy prints them. The debug
//! strategy (see `debugger`) forwards them to a controller that may stop
//! the run.
//!
//! Hooks run with the plain strategy installed, so anything a hook
//! evaluates is not itself traced or debugged.

use tern_ir::{Atom, Expr};
use tern_patterns::{eval_depth_exceeded, EvalError};

use crate::Evaluator;

/// One observation point around a dispatch.
#[derive(Clone, Copy, Debug)]
pub enum DispatchEvent<'a> {
    /// About to dispatch `expr` at nesting `depth`.
    Enter { expr: &'a Expr, depth: usize },
    /// `expr` dispatched to `result`.
    Leave {
        expr: &'a Expr,
        result: &'a Expr,
        depth: usize,
    },
    /// `expr` raised `error`.
    Error {
        expr: &'a Expr,
        error: &'a EvalError,
        depth: usize,
    },
}

impl<'a> DispatchEvent<'a> {
    #[inline]
    pub fn expr(&self) -> &'a Expr {
        match *self {
            DispatchEvent::Enter { expr, .. }
            | DispatchEvent::Leave { expr, .. }
            | DispatchEvent::Error { expr, .. } => expr,
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        match *self {
            DispatchEvent::Enter { depth, .. }
            | DispatchEvent::Leave { depth, .. }
            | DispatchEvent::Error { depth, .. } => depth,
        }
    }
}

/// Behaviour wrapped around every dispatch.
pub trait EvalStrategy {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether `dispatch_hook` should be called at all.
    fn observes(&self) -> bool {
        true
    }

    /// Observe `event`. An error aborts the dispatch with that error.
    fn dispatch_hook(&mut self, host: &mut Evaluator, event: DispatchEvent<'_>) -> Result<(), EvalError>;

    /// Error to raise when nesting reaches `limit`.
    fn on_depth_exceeded(&mut self, expr: &Expr, limit: usize) -> EvalError {
        let _ = expr;
        eval_depth_exceeded(limit)
    }
}

/// No observation at all.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainStrategy;

impl EvalStrategy for PlainStrategy {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn observes(&self) -> bool {
        false
    }

    fn dispatch_hook(&mut self, _host: &mut Evaluator, _event: DispatchEvent<'_>) -> Result<(), EvalError> {
        Ok(())
    }
}

/// Prints `TrEnter`/`TrLeave`/`TrError` lines to the current output and
/// mirrors them as `tracing` events.
///
/// With a filter only calls of one `(symbol, arity)` are reported.
#[derive(Clone, Debug, Default)]
pub struct TracedStrategy {
    filter: Option<(Atom, usize)>,
}

impl TracedStrategy {
    /// Report every dispatch.
    pub fn all() -> Self {
        TracedStrategy { filter: None }
    }

    /// Report only calls of `symbol` with `arity` operands.
    pub fn for_rule(symbol: Atom, arity: usize) -> Self {
        TracedStrategy {
            filter: Some((symbol, arity)),
        }
    }

    fn selects(&self, expr: &Expr) -> bool {
        match &self.filter {
            None => true,
            Some((symbol, arity)) => expr
                .as_form()
                .is_some_and(|f| f.arity() == *arity && f.head_atom() == Some(symbol)),
        }
    }
}

impl EvalStrategy for TracedStrategy {
    fn name(&self) -> &'static str {
        "traced"
    }

    fn dispatch_hook(&mut self, host: &mut Evaluator, event: DispatchEvent<'_>) -> Result<(), EvalError> {
        if !self.selects(event.expr()) {
            return Ok(());
        }
        let line = match event {
            DispatchEvent::Enter { expr, depth } => {
                tracing::debug!(target: "tern_eval::trace", depth, %expr, "enter");
                format!("TrEnter({expr})\n")
            }
            DispatchEvent::Leave { expr, result, depth } => {
                tracing::debug!(target: "tern_eval::trace", depth, %expr, %result, "leave");
                format!("TrLeave({expr}, {result})\n")
            }
            DispatchEvent::Error { expr, error, depth } => {
                tracing::debug!(target: "tern_eval::trace", depth, %expr, %error, "error");
                format!("TrError({expr}, {error})\n")
            }
        };
        host.write_output(&line)
    }

    fn on_depth_exceeded(&mut self, expr: &Expr, limit: usize) -> EvalError {
        tracing::warn!(target: "tern_eval::trace", limit, %expr, "evaluation depth exceeded");
        eval_depth_exceeded(limit)
    }
}
