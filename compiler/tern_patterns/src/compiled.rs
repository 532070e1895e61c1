//! Compiled patterns as opaque values.
//!
//! `PatternCreate` wraps a pattern and its guard in a `CompiledPattern` so
//! user code can hold it, test it with `PatternMatches`, or hand it to
//! `RulePattern` as the rule's pattern.

use std::any::Any;

use tern_ir::{Expr, OpaqueValue};

use crate::errors::EvalError;
use crate::pattern::{Bindings, GuardExecutor, Pattern};

#[derive(Clone, Debug)]
pub struct CompiledPattern {
    pattern: Pattern,
}

impl CompiledPattern {
    pub fn new(pattern: Pattern) -> Self {
        CompiledPattern { pattern }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Match `candidate`, consulting the guard through `exec`.
    pub fn matches<E>(&self, candidate: &Expr, exec: &mut E) -> Result<Option<Bindings>, EvalError>
    where
        E: GuardExecutor + ?Sized,
    {
        self.pattern.matches(candidate, exec)
    }
}

impl OpaqueValue for CompiledPattern {
    fn type_name(&self) -> &str {
        "Pattern"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
