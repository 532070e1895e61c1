//! Scope manager: local frames and the global variable table.
//!
//! Frames form a stack. A frame created with `inherit_previous` resolves
//! names through the frame below it; an isolated frame only sees itself and
//! the globals. A name introduced with `bind_local` but never assigned is
//! unbound and shadows any global of the same name.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tern_ir::{Atom, Expr};

/// Single-threaded shared handle to a frame.
///
/// Frames are only shared along the "previous locals" chain of one
/// evaluator, so `Rc` is enough.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Error returned by `Scope::assign`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignError {
    /// The name is not local to any frame in the chain.
    NotLocal,
}

/// One frame of local variables.
#[derive(Debug, Default)]
pub struct Scope {
    /// `None` marks a declared but unbound local.
    bindings: FxHashMap<Atom, Option<Expr>>,
    parent: Option<LocalScope<Scope>>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: LocalScope<Scope>) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Introduce `name` in this frame, optionally with a value.
    #[inline]
    pub fn define(&mut self, name: Atom, value: Option<Expr>) {
        self.bindings.insert(name, value);
    }

    /// Resolve `name` through the chain.
    ///
    /// The outer `Option` says whether any frame declares the name; the
    /// inner one whether it currently has a value.
    pub fn lookup(&self, name: &str) -> Option<Option<Expr>> {
        if let Some(binding) = self.bindings.get(name) {
            return Some(binding.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().lookup(name))
    }

    /// Assign in the nearest frame declaring `name`.
    pub fn assign(&mut self, name: &str, value: Expr) -> Result<(), AssignError> {
        if let Some(binding) = self.bindings.get_mut(name) {
            *binding = Some(value);
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => Err(AssignError::NotLocal),
        }
    }

    fn collect_names(&self, out: &mut Vec<Atom>) {
        let mut own: Vec<&Atom> = self.bindings.keys().collect();
        own.sort_unstable();
        for name in own {
            if !out.contains(name) {
                out.push(name.clone());
            }
        }
        if let Some(parent) = &self.parent {
            parent.borrow().collect_names(out);
        }
    }
}

/// Frame stack plus the global table.
pub struct Environment {
    /// Active frames; the bottom one holds top-level locals.
    frames: Vec<LocalScope<Scope>>,
    globals: FxHashMap<Atom, Expr>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            frames: vec![LocalScope::new(Scope::new())],
            globals: FxHashMap::default(),
        }
    }

    /// Number of active frames, including the top-level one.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Push a frame. With `inherit_previous` the new frame resolves names
    /// through the current one.
    #[inline]
    pub fn push_frame(&mut self, inherit_previous: bool) {
        let scope = if inherit_previous {
            Scope::with_parent(self.current())
        } else {
            Scope::new()
        };
        self.frames.push(LocalScope::new(scope));
    }

    /// Pop the current frame. The top-level frame is never popped.
    #[inline]
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    #[inline]
    fn current(&self) -> LocalScope<Scope> {
        match self.frames.last() {
            Some(scope) => scope.clone(),
            None => LocalScope::new(Scope::new()),
        }
    }

    /// Introduce an unbound local in the current frame.
    pub fn bind_local(&mut self, name: Atom) {
        self.current().borrow_mut().define(name, None);
    }

    /// Introduce a local with a value in the current frame.
    pub fn define_local(&mut self, name: Atom, value: Expr) {
        self.current().borrow_mut().define(name, Some(value));
    }

    /// Assign in the nearest frame where `name` is local, else globally.
    pub fn set_variable(&mut self, name: &Atom, value: Expr) {
        let local = self.current().borrow_mut().assign(name.text(), value.clone());
        if local.is_err() {
            self.globals.insert(name.clone(), value);
        }
    }

    /// Remove a global binding. Returns whether one existed.
    pub fn unset_variable(&mut self, name: &str) -> bool {
        self.globals.remove(name).is_some()
    }

    /// Value of `name`: frame chain first, then globals.
    pub fn get_variable(&self, name: &str) -> Option<Expr> {
        match self.current().borrow().lookup(name) {
            Some(local) => local,
            None => self.globals.get(name).cloned(),
        }
    }

    #[inline]
    pub fn is_bound(&self, name: &str) -> bool {
        self.get_variable(name).is_some()
    }

    /// Global value, ignoring locals.
    pub fn global(&self, name: &str) -> Option<&Expr> {
        self.globals.get(name)
    }

    /// Names visible from the current frame, innermost first.
    pub fn visible_locals(&self) -> Vec<Atom> {
        let mut names = Vec::new();
        self.current().borrow().collect_names(&mut names);
        names
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
