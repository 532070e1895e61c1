#![allow(
    clippy::result_large_err,
    reason = "EvalError is fundamental; boxing would add complexity across the crate"
)]
//! Tern Eval - Rewriting evaluator for the tern symbolic-computation core.
//!
//! # Architecture
//!
//! The evaluator uses:
//! - `Environment`: local frames with optional inheritance, plus globals
//! - `EvalStack`: one slot stack carrying every call's operands and result
//! - `Builtin`: the closed set of compiled-in operations, consulted first
//! - `RuleDb` (from `tern_patterns`): user rules keyed by `(symbol, arity)`
//! - `EvalStrategy`: plain, traced or debugger-driven observation of dispatch
//! - `OutputStack`: the base output sink and scoped redirections
//!
//! # Re-exports
//!
//! Error and rule types are re-exported from `tern_patterns` so embedders
//! only need this crate and `tern_ir`.

mod builtins;
pub mod config;
pub mod debugger;
mod environment;
mod evaluator;
pub mod output;
pub mod stack;
pub mod strategy;

#[cfg(test)]
mod tests;

use std::sync::Once;

pub use builtins::{Arity, Builtin, Operands};
pub use config::{EvalConfig, DEFAULT_MAX_EVAL_DEPTH};
pub use debugger::{DebugCommand, DebugController, DebugSession, DebugStrategy, ExprHooks};
pub use environment::{AssignError, Environment, LocalScope, Scope};
pub use evaluator::{Evaluator, EvaluatorBuilder, InterruptHandle, ScopedEvaluator, StrategyGuard};
pub use output::{OutputHandler, OutputStack, SharedBuffer};
pub use stack::{ensure_sufficient_stack, CallFrame, EvalStack};
pub use strategy::{DispatchEvent, EvalStrategy, PlainStrategy, TracedStrategy};
pub use tern_patterns::{
    EntryFlags, EvalBacktrace, EvalError, EvalErrorKind, EvalResult, Pattern, Rule, RuleDb,
    RuleEntry, RuleId,
};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=tern_eval=debug` or `RUST_LOG=tern_eval::trace=debug`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
