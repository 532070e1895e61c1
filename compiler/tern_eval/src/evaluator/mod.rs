//! The rewriting evaluator.
//!
//! # Dispatch
//!
//! - Strings and numerals evaluate to themselves; other atoms to their
//!   variable value, or to themselves when unbound.
//! - Opaque values evaluate to themselves.
//! - A form headed by a built-in name whose arity the built-in accepts runs
//!   the built-in. Its operands are evaluated first unless the built-in
//!   holds them.
//! - A form with a declared rule entry for `(head, arity)` evaluates the
//!   non-held operands, then tries the entry's rules in precedence order.
//!   The first rule whose pattern and guard hold has its body evaluated in
//!   a fresh frame with the pattern variables bound. If no rule matches,
//!   the original form is the result.
//! - Any other form evaluates its operands and rebuilds itself.
//!
//! Every built-in and rule call opens a frame on the `EvalStack`; the frame
//! is closed on success and on error alike.

mod builder;
mod scope_guard;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use smallvec::SmallVec;
use tern_ir::{Atom, Expr, Form, NumericEngine, OperatorRegistries, UniqueForm};
use tern_patterns::{
    interrupted, not_in_debug_session, security_breach, Bindings, EvalError, EvalErrorKind,
    EvalResult, GuardExecutor, Rule, RuleDb,
};

use crate::builtins::{Builtin, Call, Operands};
use crate::config::EvalConfig;
use crate::debugger::{locals_list, DebugController, DebugSession, DebugStrategy};
use crate::environment::Environment;
use crate::output::{OutputHandler, OutputStack};
use crate::stack::{ensure_sufficient_stack, CallFrame, EvalStack};
use crate::strategy::{DispatchEvent, EvalStrategy, PlainStrategy};

pub use builder::EvaluatorBuilder;
pub use scope_guard::{ScopedEvaluator, StrategyGuard};

/// Cross-thread handle for interrupting a running evaluation.
///
/// The flag is polled at every dispatch; the run unwinds with
/// `Interrupted`, which `TrapError` does not catch.
#[derive(Clone, Debug, Default)]
pub struct InterruptHandle(Arc<AtomicBool>);

impl InterruptHandle {
    pub fn interrupt(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Consume a pending interrupt.
    fn take(&self) -> bool {
        self.0.swap(false, Ordering::Relaxed)
    }
}

/// Messages of the errors currently being recovered from by `TrapError`,
/// innermost last.
#[derive(Debug, Default)]
struct TrapChannel {
    captured: Vec<String>,
}

/// Evaluator state: scopes, rules, operators, stack, output and strategy.
pub struct Evaluator {
    pub env: Environment,
    pub rules: RuleDb,
    pub operators: OperatorRegistries,
    pub(crate) stack: EvalStack,
    pub(crate) numbers: Arc<dyn NumericEngine>,
    pub(crate) output: OutputStack,
    pub(crate) config: EvalConfig,
    strategy: Box<dyn EvalStrategy>,
    debug: Vec<DebugSession>,
    trap: TrapChannel,
    depth: usize,
    interrupt: InterruptHandle,
}

impl Evaluator {
    /// Evaluator with default configuration writing to stdout.
    pub fn new() -> Self {
        EvaluatorBuilder::new().build()
    }

    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::new()
    }

    #[inline]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    #[inline]
    pub fn config_mut(&mut self) -> &mut EvalConfig {
        &mut self.config
    }

    #[inline]
    pub fn numbers(&self) -> &dyn NumericEngine {
        &*self.numbers
    }

    #[inline]
    pub fn stack(&self) -> &EvalStack {
        &self.stack
    }

    /// Handle that interrupts this evaluator from another thread.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    /// Current nesting depth of `eval`.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Evaluate `expr`.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(expr))
    }

    /// Evaluate each expression in turn, returning the last result.
    pub fn eval_all(&mut self, exprs: &[Expr]) -> EvalResult {
        let mut last = Expr::boolean(true);
        for expr in exprs {
            last = self.eval(expr)?;
        }
        Ok(last)
    }

    fn eval_inner(&mut self, expr: &Expr) -> EvalResult {
        if self.interrupt.take() {
            tracing::debug!("evaluation interrupted");
            return Err(interrupted());
        }
        if self.depth >= self.config.max_eval_depth {
            let limit = self.config.max_eval_depth;
            return Err(self.strategy.on_depth_exceeded(expr, limit));
        }
        self.depth += 1;
        let result = if self.strategy.observes() {
            self.observed_dispatch(expr)
        } else {
            self.dispatch(expr)
        };
        self.depth -= 1;
        result
    }

    fn observed_dispatch(&mut self, expr: &Expr) -> EvalResult {
        let depth = self.depth;
        self.run_hook(DispatchEvent::Enter { expr, depth })?;
        let result = self.dispatch(expr);
        match &result {
            Ok(value) => self.run_hook(DispatchEvent::Leave {
                expr,
                result: value,
                depth,
            })?,
            Err(error) => self.run_hook(DispatchEvent::Error { expr, error, depth })?,
        }
        result
    }

    /// Run a strategy hook with the plain strategy installed.
    fn run_hook(&mut self, event: DispatchEvent<'_>) -> Result<(), EvalError> {
        let mut strategy = std::mem::replace(&mut self.strategy, Box::new(PlainStrategy));
        let result = strategy.dispatch_hook(self, event);
        self.strategy = strategy;
        result
    }

    fn dispatch(&mut self, expr: &Expr) -> EvalResult {
        match expr {
            Expr::Atom(atom) => Ok(self.eval_atom(atom, expr)),
            Expr::Opaque(_) => Ok(expr.clone()),
            Expr::Form(form) => self.eval_form(form, expr),
        }
    }

    fn eval_atom(&self, atom: &Atom, expr: &Expr) -> Expr {
        if atom.is_string() || self.numbers.is_number(atom.text(), true) {
            return expr.clone();
        }
        self.env
            .get_variable(atom.text())
            .unwrap_or_else(|| expr.clone())
    }

    fn eval_form(&mut self, form: &Form, call: &Expr) -> EvalResult {
        let Some(head) = form.head_atom() else {
            return Ok(call.clone());
        };
        let arity = form.arity();
        let declared = self.rules.lookup(head.text(), arity).is_some();
        if let Some(builtin) = Builtin::from_name(head.text()) {
            let accepted = builtin.arity();
            if accepted.accepts(arity) {
                return self.call_builtin(builtin, form, call);
            }
            if !declared {
                return Err(tern_patterns::arity_error(
                    builtin.name(),
                    accepted.describe(),
                    arity,
                ));
            }
        }
        if declared {
            return self.apply_entry(head, form, call);
        }
        self.rebuild(form)
    }

    /// Evaluate the operands of an undeclared call and rebuild it.
    fn rebuild(&mut self, form: &Form) -> EvalResult {
        let mut rebuilt = UniqueForm::new(Vec::with_capacity(form.len()));
        for (i, element) in form.elements().iter().enumerate() {
            if i == 0 {
                rebuilt.push(element.clone());
            } else {
                rebuilt.push(self.eval(element)?);
            }
        }
        Ok(rebuilt.into_expr())
    }

    fn call_builtin(&mut self, builtin: Builtin, form: &Form, call: &Expr) -> EvalResult {
        tracing::trace!(builtin = builtin.name(), arity = form.arity(), "call builtin");
        let held = builtin.operands() == Operands::Held;
        let frame = self.stack.push_frame(call.clone(), form.arity());
        let result = match self.fill_operands(frame, form, |_| held) {
            Ok(()) => builtin.invoke(self, Call::new(frame, builtin)),
            Err(error) => Err(error),
        };
        self.close_frame(frame, result)
    }

    #[tracing::instrument(level = "trace", skip_all, fields(symbol = %head))]
    fn apply_entry(&mut self, head: &Atom, form: &Form, call: &Expr) -> EvalResult {
        let arity = form.arity();
        let Some(entry) = self.rules.lookup(head.text(), arity) else {
            return Ok(call.clone());
        };
        let rules = entry.snapshot();
        let inherit = entry.inherits_locals();
        let held: SmallVec<[bool; 8]> = (0..arity).map(|i| entry.is_held(i)).collect();

        let frame = self.stack.push_frame(call.clone(), arity);
        let result = match self.fill_operands(frame, form, |i| held[i]) {
            Ok(()) => self.try_rules(frame, &rules, inherit),
            Err(error) => Err(error),
        };
        self.close_frame(frame, result)
    }

    fn try_rules(&mut self, frame: CallFrame, rules: &[Arc<Rule>], inherit: bool) -> EvalResult {
        let candidate = self.stack.candidate(frame);
        for rule in rules {
            let Some(bindings) = rule.pattern.matches(&candidate, self)? else {
                continue;
            };
            tracing::trace!(precedence = rule.precedence, id = ?rule.id(), "rule matched");
            return self.with_bindings(inherit, &bindings, |scoped| scoped.eval(&rule.body));
        }
        Ok(self.stack.call(frame).clone())
    }

    fn fill_operands(
        &mut self,
        frame: CallFrame,
        form: &Form,
        held: impl Fn(usize) -> bool,
    ) -> Result<(), EvalError> {
        for (i, operand) in form.operands().iter().enumerate() {
            let value = if held(i) {
                operand.clone()
            } else {
                self.eval(operand)?
            };
            self.stack.push_operand(frame, value);
        }
        self.stack.seal(frame);
        Ok(())
    }

    /// Store the outcome in RESULT and pop the frame on every path.
    fn close_frame(&mut self, frame: CallFrame, result: EvalResult) -> EvalResult {
        let outcome = match result {
            Ok(value) => {
                self.stack.set_result(frame, value);
                Ok(())
            }
            Err(error) if error.backtrace.is_none() => {
                Err(error.with_backtrace(self.stack.backtrace()))
            }
            Err(error) => Err(error),
        };
        let value = self.stack.pop_frame(frame);
        outcome.map(|()| value)
    }

    // Output

    /// Write `text` to the innermost output sink.
    pub fn write_output(&mut self, text: &str) -> Result<(), EvalError> {
        self.output
            .write(text)
            .map_err(|e| EvalError::new(format!("output error: {e}")))
    }

    #[inline]
    pub fn output_handler(&self) -> &OutputHandler {
        self.output.base()
    }

    // Security

    /// Fail with `SecurityBreach` when running sandboxed.
    pub fn require_host_access(&self, operation: &str) -> Result<(), EvalError> {
        if self.config.allows_host_access() {
            Ok(())
        } else {
            tracing::warn!(operation, "host access refused in secure mode");
            Err(security_breach(operation))
        }
    }

    /// Evaluate `body` with the sandbox flag set, restoring it afterwards.
    pub fn eval_secure(&mut self, body: &Expr) -> EvalResult {
        let previous = std::mem::replace(&mut self.config.secure, true);
        let result = self.eval(body);
        self.config.secure = previous;
        result
    }

    // Error recovery

    /// Evaluate `body`; on a trappable error evaluate `recovery` instead,
    /// with the error's message readable through `last_error`.
    pub fn trap(&mut self, body: &Expr, recovery: &Expr) -> EvalResult {
        match self.eval(body) {
            Ok(value) => Ok(value),
            Err(error) if error.is_trappable() => {
                tracing::debug!(%error, "trapped error");
                self.trap.captured.push(error.message);
                let result = self.eval(recovery);
                self.trap.captured.pop();
                result
            }
            Err(error) => Err(error),
        }
    }

    /// Message of the innermost error being recovered from.
    pub fn last_error(&self) -> Option<&str> {
        self.trap.captured.last().map(String::as_str)
    }

    // Strategy

    /// Install `strategy`, returning the one it replaces.
    pub fn set_strategy(&mut self, strategy: Box<dyn EvalStrategy>) -> Box<dyn EvalStrategy> {
        tracing::debug!(strategy = strategy.name(), "install evaluation strategy");
        std::mem::replace(&mut self.strategy, strategy)
    }

    /// Name of the active strategy.
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    // Debugging

    /// Start a debug session driven by `controller`.
    pub fn start_debugging(&mut self, controller: Box<dyn DebugController>) {
        let previous = self.set_strategy(Box::new(DebugStrategy::new(controller)));
        self.debug.push(DebugSession::new(previous));
    }

    /// End the innermost debug session, restoring the previous strategy.
    /// Returns the last result the session observed.
    pub fn finish_debugging(&mut self) -> Option<Expr> {
        let session = self.debug.pop()?;
        let (result, previous) = session.into_parts();
        self.set_strategy(previous);
        result
    }

    pub fn debug_session(&self) -> Option<&DebugSession> {
        self.debug.last()
    }

    pub(crate) fn debug_session_mut(&mut self) -> Option<&mut DebugSession> {
        self.debug.last_mut()
    }

    pub fn current_expression(&self) -> Result<Expr, EvalError> {
        self.debug_session()
            .and_then(DebugSession::expression)
            .cloned()
            .ok_or_else(not_in_debug_session)
    }

    pub fn current_result(&self) -> Result<Expr, EvalError> {
        self.debug_session()
            .and_then(DebugSession::result)
            .cloned()
            .ok_or_else(not_in_debug_session)
    }

    /// Locals visible at the debugged dispatch, as a list of names.
    pub fn current_locals(&self) -> Result<Expr, EvalError> {
        if self.debug.is_empty() {
            return Err(not_in_debug_session());
        }
        Ok(locals_list(self.env.visible_locals()))
    }

    /// Ask the innermost debug session to stop at the next hook.
    pub fn request_stop(&mut self) -> Result<(), EvalError> {
        let session = self.debug_session_mut().ok_or_else(not_in_debug_session)?;
        session.request_stop();
        Ok(())
    }

    /// Evaluate `expr` under a debug session driven by `controller`.
    ///
    /// A stop request ends the run early; the result is then the last
    /// completed result, or `expr` itself if nothing completed.
    pub fn custom_eval(&mut self, expr: &Expr, controller: Box<dyn DebugController>) -> EvalResult {
        self.start_debugging(controller);
        let result = self.eval(expr);
        let last = self.finish_debugging();
        match result {
            Err(error) if matches!(error.kind, EvalErrorKind::DebugStopped) => {
                Ok(last.unwrap_or_else(|| expr.clone()))
            }
            other => other,
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardExecutor for Evaluator {
    /// Guards run in an isolated frame holding the pattern bindings.
    fn eval_guard(&mut self, guard: &Expr, bindings: &Bindings) -> Result<bool, EvalError> {
        self.with_bindings(false, bindings, |scoped| scoped.eval(guard))
            .map(|value| value.is_true())
    }
}
