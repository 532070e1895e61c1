//! `EvaluatorBuilder` for creating Evaluator instances with various configurations.

use std::path::PathBuf;
use std::sync::Arc;

use tern_ir::{MachineNumbers, NumericEngine, OperatorRegistries};
use tern_patterns::RuleDb;

use super::{Evaluator, InterruptHandle, TrapChannel};
use crate::config::EvalConfig;
use crate::environment::Environment;
use crate::output::{OutputHandler, OutputStack};
use crate::stack::EvalStack;
use crate::strategy::{EvalStrategy, PlainStrategy};

/// Builder for creating Evaluator instances with various configurations.
///
/// Defaults: depth limit 1000, not sandboxed, machine numbers, output to
/// stdout, plain strategy.
pub struct EvaluatorBuilder {
    config: EvalConfig,
    env: Option<Environment>,
    numbers: Option<Arc<dyn NumericEngine>>,
    output: Option<OutputHandler>,
    strategy: Option<Box<dyn EvalStrategy>>,
    interrupt: Option<InterruptHandle>,
}

impl EvaluatorBuilder {
    pub fn new() -> Self {
        Self {
            config: EvalConfig::default(),
            env: None,
            numbers: None,
            output: None,
            strategy: None,
            interrupt: None,
        }
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn max_eval_depth(mut self, depth: usize) -> Self {
        self.config.max_eval_depth = depth;
        self
    }

    /// Start sandboxed.
    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.config.secure = secure;
        self
    }

    /// Append a directory searched by `FindFile`.
    #[must_use]
    pub fn input_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_directories.push(dir.into());
        self
    }

    /// Start from an existing scope manager.
    #[must_use]
    pub fn env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    #[must_use]
    pub fn numeric_engine(mut self, engine: Arc<dyn NumericEngine>) -> Self {
        self.numbers = Some(engine);
        self
    }

    #[must_use]
    pub fn output(mut self, handler: OutputHandler) -> Self {
        self.output = Some(handler);
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: Box<dyn EvalStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Share an interrupt handle created elsewhere.
    #[must_use]
    pub fn interrupt(mut self, handle: InterruptHandle) -> Self {
        self.interrupt = Some(handle);
        self
    }

    pub fn build(self) -> Evaluator {
        let strategy = self.strategy.unwrap_or_else(|| Box::new(PlainStrategy));
        tracing::debug!(
            max_eval_depth = self.config.max_eval_depth,
            secure = self.config.secure,
            strategy = strategy.name(),
            "build evaluator"
        );
        Evaluator {
            env: self.env.unwrap_or_default(),
            rules: RuleDb::new(),
            operators: OperatorRegistries::new(),
            stack: EvalStack::new(),
            numbers: self.numbers.unwrap_or_else(|| Arc::new(MachineNumbers)),
            output: OutputStack::new(self.output.unwrap_or_default()),
            config: self.config,
            strategy,
            debug: Vec::new(),
            trap: TrapChannel::default(),
            depth: 0,
            interrupt: self.interrupt.unwrap_or_default(),
        }
    }
}

impl Default for EvaluatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
