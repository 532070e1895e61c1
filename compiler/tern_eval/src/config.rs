//! Evaluator configuration.

use std::path::PathBuf;

/// Default bound on nested evaluation depth.
pub const DEFAULT_MAX_EVAL_DEPTH: usize = 1000;

/// Tunable policy for one evaluator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Nested evaluations allowed before `EvalDepthExceeded`.
    pub max_eval_depth: usize,
    /// Sandbox flag: host access (files, processes) is refused while set.
    pub secure: bool,
    /// Directories searched by `FindFile`, in order.
    pub input_directories: Vec<PathBuf>,
}

impl EvalConfig {
    /// Whether built-ins may touch the file system or spawn processes.
    #[inline]
    pub fn allows_host_access(&self) -> bool {
        !self.secure
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_eval_depth: DEFAULT_MAX_EVAL_DEPTH,
            secure: false,
            input_directories: Vec::new(),
        }
    }
}
