//! RAII-style guards for evaluator state that must be restored.
//!
//! [`ScopedEvaluator`] pops a scope frame when dropped, so a rule body or
//! guard that fails (or panics) never leaks its frame. [`StrategyGuard`]
//! does the same for a temporarily installed evaluation strategy.
//!
//! Both guards hold `&mut Evaluator` and implement `Deref`/`DerefMut`, so
//! evaluation continues through the guard:
//!
//! ```text
//! evaluator.with_bindings(false, &bindings, |scoped| scoped.eval(&body))
//! ```

use std::ops::{Deref, DerefMut};

use tern_patterns::Bindings;

use super::Evaluator;
use crate::strategy::EvalStrategy;

/// Guard that pops the evaluator's current scope frame on drop.
pub struct ScopedEvaluator<'guard> {
    evaluator: &'guard mut Evaluator,
}

impl Drop for ScopedEvaluator<'_> {
    fn drop(&mut self) {
        self.evaluator.env.pop_frame();
    }
}

impl Deref for ScopedEvaluator<'_> {
    type Target = Evaluator;

    fn deref(&self) -> &Self::Target {
        self.evaluator
    }
}

impl DerefMut for ScopedEvaluator<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.evaluator
    }
}

/// Guard that reinstates the previous strategy on drop.
pub struct StrategyGuard<'guard> {
    evaluator: &'guard mut Evaluator,
    previous: Option<Box<dyn EvalStrategy>>,
}

impl Drop for StrategyGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.evaluator.set_strategy(previous);
        }
    }
}

impl Deref for StrategyGuard<'_> {
    type Target = Evaluator;

    fn deref(&self) -> &Self::Target {
        self.evaluator
    }
}

impl DerefMut for StrategyGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.evaluator
    }
}

impl Evaluator {
    /// Push a scope frame that is popped when the guard drops.
    ///
    /// With `inherit_previous` the frame sees the caller's locals.
    pub fn scoped(&mut self, inherit_previous: bool) -> ScopedEvaluator<'_> {
        self.env.push_frame(inherit_previous);
        ScopedEvaluator { evaluator: self }
    }

    /// Run `f` inside a fresh scope frame.
    pub fn with_frame<T, F>(&mut self, inherit_previous: bool, f: F) -> T
    where
        F: FnOnce(&mut ScopedEvaluator<'_>) -> T,
    {
        let mut scoped = self.scoped(inherit_previous);
        f(&mut scoped)
    }

    /// Run `f` inside a fresh frame holding `bindings` as locals.
    pub fn with_bindings<T, F>(&mut self, inherit_previous: bool, bindings: &Bindings, f: F) -> T
    where
        F: FnOnce(&mut ScopedEvaluator<'_>) -> T,
    {
        self.with_frame(inherit_previous, |scoped| {
            for (name, value) in bindings.iter() {
                scoped.env.define_local(name.clone(), value.clone());
            }
            f(scoped)
        })
    }

    /// Install `strategy` until the guard drops.
    pub fn strategy_scope(&mut self, strategy: Box<dyn EvalStrategy>) -> StrategyGuard<'_> {
        let previous = self.set_strategy(strategy);
        StrategyGuard {
            evaluator: self,
            previous: Some(previous),
        }
    }

    /// Run `f` with `strategy` installed.
    pub fn with_strategy<T, F>(&mut self, strategy: Box<dyn EvalStrategy>, f: F) -> T
    where
        F: FnOnce(&mut StrategyGuard<'_>) -> T,
    {
        let mut guard = self.strategy_scope(strategy);
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests;
