#![allow(
    clippy::result_large_err,
    reason = "EvalError is fundamental; boxing would add complexity across the crate"
)]
//! Tern Patterns - matching and rule storage for the rewriting core.
//!
//! This crate provides:
//! - Evaluation error types (`EvalError`, `EvalErrorKind`, `EvalResult`)
//! - The pattern matcher (`Pattern`, `Bindings`, `GuardExecutor`)
//! - Compiled patterns as opaque values (`CompiledPattern`)
//! - The rule database keyed by `(symbol, arity)` (`RuleDb`, `RuleEntry`, `Rule`)
//!
//! # Architecture
//!
//! Matching is purely structural until a guard has to be checked. Guards are
//! ordinary expressions, so the matcher calls back into the evaluator through
//! `GuardExecutor` rather than depending on it.

mod compiled;
mod errors;
mod pattern;
mod rules;

#[cfg(test)]
mod test_helpers;

pub use compiled::CompiledPattern;
pub use errors::{
    arg_range_error, arg_type_error, arity_error, debug_stopped, entry_fenced,
    eval_depth_exceeded, file_not_found, interrupted, not_an_operator, not_in_debug_session,
    security_breach, unknown_entry, user_raised, BacktraceFrame, EvalBacktrace, EvalError,
    EvalErrorKind, EvalResult,
};
pub use pattern::{classify, match_pattern, Bindings, GuardExecutor, Pattern, PatternAtom, VARIABLE_SUFFIX};
pub use rules::{EntryFlags, Rule, RuleDb, RuleEntry, RuleId};
