//! Evaluation stack and native stack safety.
//!
//! Every call, built-in or user-defined, owns a contiguous frame of slots:
//!
//! ```text
//! base          base+1 .. base+n      base+n+1
//! [ call form ] [ operand 1 .. n ]    [ RESULT ]
//! ```
//!
//! Operands are pushed one at a time while they are evaluated, so nested
//! calls stack their frames above a partially filled one and truncate back
//! to their own base when they finish. The RESULT slot is sealed in once all
//! operands are present.

use tern_ir::{Expr, Form, UniqueForm};
use tern_patterns::{BacktraceFrame, EvalBacktrace};

/// Ensure sufficient stack space is available before executing `f`.
///
/// On native targets, uses `stacker` to grow the stack if needed.
/// On WASM targets, just calls the closure directly.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    /// Minimum stack space to keep available (100KB red zone).
    const RED_ZONE: usize = 100 * 1024;

    /// Stack space to allocate when growing (1MB).
    const STACK_PER_RECURSION: usize = 1024 * 1024;

    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Position of one call's slots on the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallFrame {
    base: usize,
    arity: usize,
}

impl CallFrame {
    /// Number of operands of the call.
    #[inline]
    pub fn arity(self) -> usize {
        self.arity
    }

    #[inline]
    fn operand_slot(self, index: usize) -> usize {
        debug_assert!(index >= 1 && index <= self.arity, "operand {index} out of frame");
        self.base + index
    }

    #[inline]
    fn result_slot(self) -> usize {
        self.base + self.arity + 1
    }
}

/// Slot stack shared by every active call.
#[derive(Debug)]
pub struct EvalStack {
    slots: Vec<Expr>,
    frames: Vec<CallFrame>,
    /// Filler for taken operands and unsealed results.
    vacant: Expr,
}

impl EvalStack {
    pub fn new() -> Self {
        EvalStack {
            slots: Vec::new(),
            frames: Vec::new(),
            vacant: Expr::atom("Nothing"),
        }
    }

    /// Open a frame for `call` with room for `arity` operands.
    pub fn push_frame(&mut self, call: Expr, arity: usize) -> CallFrame {
        let frame = CallFrame {
            base: self.slots.len(),
            arity,
        };
        self.slots.push(call);
        self.frames.push(frame);
        frame
    }

    /// Push the next operand of `frame`.
    pub fn push_operand(&mut self, frame: CallFrame, value: Expr) {
        debug_assert!(self.slots.len() < frame.result_slot(), "frame already full");
        self.slots.push(value);
    }

    /// Reserve the RESULT slot once all operands are in place.
    pub fn seal(&mut self, frame: CallFrame) {
        debug_assert_eq!(self.slots.len(), frame.result_slot(), "operands missing");
        self.slots.push(self.vacant.clone());
    }

    /// The call form that opened `frame`.
    #[inline]
    pub fn call(&self, frame: CallFrame) -> &Expr {
        &self.slots[frame.base]
    }

    /// Operand `index` (1-based) of `frame`.
    #[inline]
    pub fn operand(&self, frame: CallFrame, index: usize) -> &Expr {
        &self.slots[frame.operand_slot(index)]
    }

    /// Move operand `index` out of its slot, leaving a placeholder.
    ///
    /// Destructive built-ins use this so the stack does not keep a second
    /// handle on the value they are about to edit in place.
    pub fn take_operand(&mut self, frame: CallFrame, index: usize) -> Expr {
        let vacant = self.vacant.clone();
        std::mem::replace(&mut self.slots[frame.operand_slot(index)], vacant)
    }

    /// Rebuild the call with its head and the operands now on the stack.
    pub fn candidate(&self, frame: CallFrame) -> Expr {
        let mut elements = UniqueForm::new(Vec::with_capacity(frame.arity + 1));
        let head = match self.call(frame).as_form().and_then(Form::head) {
            Some(head) => head.clone(),
            None => self.call(frame).clone(),
        };
        elements.push(head);
        for index in 1..=frame.arity {
            elements.push(self.operand(frame, index).clone());
        }
        elements.into_expr()
    }

    pub fn set_result(&mut self, frame: CallFrame, value: Expr) {
        self.slots[frame.result_slot()] = value;
    }

    /// Close `frame`, dropping every slot from its base up, and hand back
    /// its RESULT (or a placeholder if it was never sealed).
    pub fn pop_frame(&mut self, frame: CallFrame) -> Expr {
        let result = if self.slots.len() > frame.result_slot() {
            let vacant = self.vacant.clone();
            std::mem::replace(&mut self.slots[frame.result_slot()], vacant)
        } else {
            self.vacant.clone()
        };
        self.slots.truncate(frame.base);
        if let Some(at) = self.frames.iter().rposition(|f| *f == frame) {
            self.frames.truncate(at);
        }
        result
    }

    /// Number of open frames.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Total slots in use.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Open frames, innermost first.
    pub fn backtrace(&self) -> EvalBacktrace {
        let frames = self
            .frames
            .iter()
            .rev()
            .map(|frame| {
                let call = self.call(*frame);
                BacktraceFrame {
                    name: call.head_name().map_or_else(|| call.to_string(), str::to_string),
                    arity: frame.arity,
                }
            })
            .collect();
        EvalBacktrace::new(frames)
    }
}

impl Default for EvalStack {
    fn default() -> Self {
        Self::new()
    }
}
