//! Debugger support.
//!
//! A debug session installs a `DebugStrategy` that records the expression
//! being dispatched and the last result, then hands control to a
//! `DebugController`. The controller can inspect the evaluator (current
//! expression, current result, visible locals), evaluate arbitrary code,
//! and ask the run to stop. A stopped run unwinds with `DebugStopped`,
//! which `TrapError` never catches.

use tern_ir::{Atom, Expr};
use tern_patterns::{debug_stopped, EvalError};

use crate::strategy::{DispatchEvent, EvalStrategy};
use crate::Evaluator;

/// What the controller wants after a hook.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DebugCommand {
    #[default]
    Continue,
    Stop,
}

/// Receives control at each dispatch of a debugged run.
pub trait DebugController {
    fn on_enter(&mut self, host: &mut Evaluator) -> Result<DebugCommand, EvalError> {
        let _ = host;
        Ok(DebugCommand::Continue)
    }

    fn on_leave(&mut self, host: &mut Evaluator) -> Result<DebugCommand, EvalError> {
        let _ = host;
        Ok(DebugCommand::Continue)
    }

    fn on_error(&mut self, host: &mut Evaluator, error: &EvalError) -> Result<DebugCommand, EvalError> {
        let _ = (host, error);
        Ok(DebugCommand::Continue)
    }
}

/// State of one debug session.
pub struct DebugSession {
    expression: Option<Expr>,
    result: Option<Expr>,
    stopped: bool,
    /// Strategy to restore when the session ends.
    previous: Box<dyn EvalStrategy>,
}

impl DebugSession {
    pub(crate) fn new(previous: Box<dyn EvalStrategy>) -> Self {
        DebugSession {
            expression: None,
            result: None,
            stopped: false,
            previous,
        }
    }

    /// Expression most recently entered or left.
    pub fn expression(&self) -> Option<&Expr> {
        self.expression.as_ref()
    }

    /// Result of the most recently completed dispatch.
    pub fn result(&self) -> Option<&Expr> {
        self.result.as_ref()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub(crate) fn request_stop(&mut self) {
        self.stopped = true;
    }

    pub(crate) fn into_parts(self) -> (Option<Expr>, Box<dyn EvalStrategy>) {
        (self.result, self.previous)
    }
}

/// Strategy installed for the duration of a debug session.
pub struct DebugStrategy {
    controller: Box<dyn DebugController>,
}

impl DebugStrategy {
    pub fn new(controller: Box<dyn DebugController>) -> Self {
        DebugStrategy { controller }
    }
}

impl EvalStrategy for DebugStrategy {
    fn name(&self) -> &'static str {
        "debug"
    }

    fn dispatch_hook(&mut self, host: &mut Evaluator, event: DispatchEvent<'_>) -> Result<(), EvalError> {
        let Some(session) = host.debug_session_mut() else {
            return Ok(());
        };
        if session.stopped {
            // Let the stop unwind without re-entering the controller.
            return match event {
                DispatchEvent::Error { .. } => Ok(()),
                _ => Err(debug_stopped()),
            };
        }
        let command = match event {
            DispatchEvent::Enter { expr, .. } => {
                session.expression = Some(expr.clone());
                self.controller.on_enter(host)?
            }
            DispatchEvent::Leave { expr, result, .. } => {
                session.expression = Some(expr.clone());
                session.result = Some(result.clone());
                self.controller.on_leave(host)?
            }
            DispatchEvent::Error { expr, error, .. } => {
                session.expression = Some(expr.clone());
                self.controller.on_error(host, error)?
            }
        };
        let Some(session) = host.debug_session_mut() else {
            return Ok(());
        };
        if command == DebugCommand::Stop {
            session.request_stop();
        }
        if session.stopped {
            tracing::debug!("debug session stopped");
            return Err(debug_stopped());
        }
        Ok(())
    }
}

/// Controller that evaluates user expressions at each hook, as
/// `CustomEval(enter, leave, error, expr)` does.
///
/// Hook results are discarded; hooks request a stop with `CustomEval'Stop()`.
pub struct ExprHooks {
    enter: Expr,
    leave: Expr,
    error: Expr,
}

impl ExprHooks {
    pub fn new(enter: Expr, leave: Expr, error: Expr) -> Self {
        ExprHooks { enter, leave, error }
    }
}

impl DebugController for ExprHooks {
    fn on_enter(&mut self, host: &mut Evaluator) -> Result<DebugCommand, EvalError> {
        host.eval(&self.enter)?;
        Ok(DebugCommand::Continue)
    }

    fn on_leave(&mut self, host: &mut Evaluator) -> Result<DebugCommand, EvalError> {
        host.eval(&self.leave)?;
        Ok(DebugCommand::Continue)
    }

    fn on_error(&mut self, host: &mut Evaluator, _error: &EvalError) -> Result<DebugCommand, EvalError> {
        host.eval(&self.error)?;
        Ok(DebugCommand::Continue)
    }
}

/// Names of the locals visible at the debugged dispatch point.
pub(crate) fn locals_list(names: Vec<Atom>) -> Expr {
    Expr::list(names.into_iter().map(Expr::Atom))
}
